use std::{io::Write, ops::Deref, path::Path};

use camprobe_iface::PropertyDescriptor;
use indexmap::IndexSet;
use tracing::debug;

use crate::{
    ExportError, PropertyRecord, Result, reflect::reflect_properties, reorder::LEADING_FIELDS,
    reorder::reorder_fields,
};

/// Rows of reflected property records, ready for tabular export.
#[derive(Debug, Default, Clone)]
pub struct PropertyTable {
    rows: Vec<PropertyRecord>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reflect and reorder each descriptor into one row.
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator,
        I::Item: Deref,
        <I::Item as Deref>::Target: PropertyDescriptor,
    {
        let mut table = Self::new();
        for descriptor in descriptors {
            table.push(reorder_fields(reflect_properties(&*descriptor)));
        }
        table
    }

    pub fn push(&mut self, record: PropertyRecord) {
        self.rows.push(record);
    }

    pub fn rows(&self) -> &[PropertyRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The leading fields, then every other key in first-seen order.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: IndexSet<String> = LEADING_FIELDS.iter().map(|s| s.to_string()).collect();
        for row in self.rows.iter() {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.insert(key.clone());
                }
            }
        }
        columns.into_iter().collect()
    }

    /// Write a header row and one row per record.
    pub fn write_csv<W: Write>(&self, wtr: W) -> Result<()> {
        let columns = self.columns();
        let mut wtr = csv::Writer::from_writer(wtr);
        wtr.write_record(&columns)?;
        for row in self.rows.iter() {
            let cells = columns.iter().map(|col| match row.get(col) {
                Some(Some(value)) => value.to_string(),
                Some(None) | None => String::new(),
            });
            wtr.write_record(cells)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table to `path`, replacing any existing file.
    ///
    /// The data goes to a temporary file in the same directory which is then
    /// renamed over `path`, so `path` is either fully written or untouched.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let existing_permissions = writable_destination(path)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(".camprobe-").suffix(".csv.tmp");
        if existing_permissions.is_none() {
            if let Some(permissions) = new_file_permissions() {
                builder.permissions(permissions);
            }
        }
        let mut tmp = builder.tempfile_in(dir)?;
        self.write_csv(tmp.as_file_mut())?;
        if let Some(permissions) = existing_permissions {
            tmp.as_file().set_permissions(permissions)?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        debug!("wrote {} rows to \"{}\"", self.rows.len(), path.display());
        Ok(())
    }
}

/// Fail unless an existing `path` may be written. Returns its permissions.
///
/// Renaming over `path` needs only write access to the directory, so the
/// file itself is checked here.
fn writable_destination(path: &Path) -> std::io::Result<Option<std::fs::Permissions>> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    if metadata.permissions().readonly() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("\"{}\" is read-only", path.display()),
        ));
    }
    // Also catches files made unwritable by ownership or ACLs.
    std::fs::OpenOptions::new().write(true).open(path)?;
    Ok(Some(metadata.permissions()))
}

/// Mode of a newly created output file, before the umask.
#[cfg(unix)]
fn new_file_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<std::fs::Permissions> {
    None
}

/// Reflect all descriptors and write them to a CSV file at `path`.
///
/// Returns the number of rows written, which equals the number of
/// descriptors.
pub fn export_properties_to_csv<P: AsRef<Path>>(
    descriptors: &[Box<dyn PropertyDescriptor>],
    path: P,
) -> Result<usize> {
    let table = PropertyTable::from_descriptors(descriptors);
    table.export_csv(path)?;
    Ok(table.len())
}

impl From<tempfile::PersistError> for ExportError {
    fn from(orig: tempfile::PersistError) -> Self {
        ExportError::Persist {
            source: orig.error,
        }
    }
}
