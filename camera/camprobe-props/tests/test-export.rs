use test_log::test;

use camprobe_iface::{Camera, CameraModule, PropertyDescriptor};
use camprobe_props::{
    ExportError, ExportOptions, LEADING_FIELDS, NOT_ACCESSIBLE, reflect_properties,
};
use camprobe_sim::{SimConfig, SimModule};

fn read_csv(path: &std::path::Path) -> (Vec<String>, Vec<csv::StringRecord>) {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    let header = rdr.headers().unwrap().iter().map(String::from).collect();
    let rows = rdr.records().collect::<Result<Vec<_>, _>>().unwrap();
    (header, rows)
}

fn cell<'a>(header: &[String], row: &'a csv::StringRecord, column: &str) -> &'a str {
    let idx = header.iter().position(|h| h == column).unwrap();
    row.get(idx).unwrap()
}

#[test]
fn export_from_simulated_camera() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("props.csv");
    let mut module = SimModule::new(SimConfig::default());

    let expected_rows = {
        let unique_name = module.device_infos().unwrap()[0].unique_name().to_string();
        let cam = module.open(&unique_name).unwrap();
        cam.properties().unwrap().len()
    };

    let opts = ExportOptions {
        output: output.clone(),
        ..Default::default()
    };
    let summary = camprobe_props::run_export(&mut module, &opts).unwrap();
    assert_eq!(summary.serial, "40910001");
    assert_eq!(summary.rows, expected_rows);

    let (header, rows) = read_csv(&output);
    assert_eq!(header.len(), summary.columns);
    assert_eq!(&header[..LEADING_FIELDS.len()], LEADING_FIELDS);
    assert!(!header.iter().any(|h| h.starts_with('_')));
    assert_eq!(rows.len(), expected_rows);

    let width = rows
        .iter()
        .find(|r| cell(&header, r, "name") == "Width")
        .unwrap();
    assert_eq!(cell(&header, width, "value"), "5472");
    assert_eq!(cell(&header, width, "maximum"), "5472");
    assert_eq!(cell(&header, width, "valid_value_set"), NOT_ACCESSIBLE);
    // float-only column
    assert_eq!(cell(&header, width, "display_precision"), "");

    let exposure = rows
        .iter()
        .find(|r| cell(&header, r, "name") == "ExposureTime")
        .unwrap();
    assert_eq!(cell(&header, exposure, "unit"), "us");
    assert_eq!(cell(&header, exposure, "is_locked"), "True");

    let temperature = rows
        .iter()
        .find(|r| cell(&header, r, "name") == "DeviceTemperature")
        .unwrap();
    assert!(cell(&header, temperature, "value").starts_with("Error: "));
}

#[test]
fn every_value_recoverable() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("props.csv");
    let mut module = SimModule::new(SimConfig::default());

    let opts = ExportOptions {
        output: output.clone(),
        ..Default::default()
    };
    camprobe_props::run_export(&mut module, &opts).unwrap();
    let (header, rows) = read_csv(&output);

    let unique_name = module.device_infos().unwrap()[0].unique_name().to_string();
    let mut cam = module.open(&unique_name).unwrap();
    let (width, height) = opts.resolution.unwrap();
    cam.set_resolution(width, height).unwrap();
    let descriptors = cam.properties().unwrap();
    assert_eq!(rows.len(), descriptors.len());

    let mut checked = 0;
    let mut quoted = 0;
    for descriptor in descriptors.iter() {
        let name = descriptor.name();
        let row = rows
            .iter()
            .find(|r| cell(&header, r, "name") == name)
            .unwrap();
        let record = reflect_properties(descriptor);
        for column in header.iter() {
            let expected = match record.get(column) {
                Some(Some(value)) => value.to_string(),
                Some(None) | None => String::new(),
            };
            assert_eq!(cell(&header, row, column), expected, "{name}.{column}");
            if !expected.is_empty() {
                checked += 1;
            }
            if expected.contains(',') || expected.contains('"') {
                quoted += 1;
            }
        }
    }
    assert!(checked > descriptors.len() * 6);
    assert!(quoted > 0);

    let raw = std::fs::read_to_string(&output).unwrap();
    assert!(raw.contains(r#"(""mirror"")"#));
}

#[test]
fn keep_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("props.csv");
    let mut module = SimModule::new(SimConfig::default());
    let opts = ExportOptions {
        resolution: None,
        output: output.clone(),
        ..Default::default()
    };
    camprobe_props::run_export(&mut module, &opts).unwrap();

    let (header, rows) = read_csv(&output);
    let height = rows
        .iter()
        .find(|r| cell(&header, r, "name") == "Height")
        .unwrap();
    assert_ne!(cell(&header, height, "value"), "3648");
}

#[test]
fn no_devices_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("props.csv");
    let mut module = SimModule::new(SimConfig {
        num_devices: 0,
        ..Default::default()
    });
    let opts = ExportOptions {
        output: output.clone(),
        ..Default::default()
    };
    let err = camprobe_props::run_export(&mut module, &opts).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Camera {
            source: camprobe_iface::Error::NoDevices
        }
    ));
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unknown_device() {
    let dir = tempfile::tempdir().unwrap();
    let mut module = SimModule::new(SimConfig::default());
    let opts = ExportOptions {
        device: Some("12345678".into()),
        output: dir.path().join("props.csv"),
        ..Default::default()
    };
    let err = camprobe_props::run_export(&mut module, &opts).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Camera {
            source: camprobe_iface::Error::DeviceNotFound(_)
        }
    ));
}

#[test]
fn failed_export_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing_dir_output = dir.path().join("no-such-dir").join("props.csv");
    let mut module = SimModule::new(SimConfig::default());
    let opts = ExportOptions {
        output: missing_dir_output.clone(),
        ..Default::default()
    };
    assert!(camprobe_props::run_export(&mut module, &opts).is_err());
    assert!(!missing_dir_output.exists());

    // A successful export replaces the previous contents completely.
    let output = dir.path().join("props.csv");
    std::fs::write(&output, "stale\n").unwrap();
    let opts = ExportOptions {
        output: output.clone(),
        ..Default::default()
    };
    camprobe_props::run_export(&mut module, &opts).unwrap();
    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.starts_with("name,display_name,description,value,maximum,minimum"));
    assert!(!contents.contains("stale"));
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
