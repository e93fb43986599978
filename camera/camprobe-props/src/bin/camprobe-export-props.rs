#[cfg(feature = "backend_sim")]
extern crate camprobe_sim as backend;

use std::path::PathBuf;

use clap::Parser;

use camprobe_props::{DEFAULT_OUTPUT, ExportError, ExportOptions};

/// Write all property descriptors of a camera to a CSV file.
#[derive(Debug, Parser)]
#[command(name = "camprobe-export-props", author, version)]
struct Cli {
    /// Output CSV file. An existing file is replaced.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Unique name or serial number of the camera. Defaults to the first one.
    #[arg(short, long, env = "CAMPROBE_DEVICE")]
    device: Option<String>,

    /// Image width to set before reading the properties.
    #[arg(long, default_value_t = 5472)]
    width: i64,

    /// Image height to set before reading the properties.
    #[arg(long, default_value_t = 3648)]
    height: i64,

    /// Do not change the resolution before reading the properties.
    #[arg(long)]
    keep_resolution: bool,
}

fn main() -> anyhow::Result<()> {
    let _tracing_guard = env_tracing_logger::init_with_default("camprobe_props=info,warn");
    let cli = Cli::parse();

    let opts = ExportOptions {
        device: cli.device,
        resolution: if cli.keep_resolution {
            None
        } else {
            Some((cli.width, cli.height))
        },
        output: cli.output,
    };

    let mut module = backend::new_module()?;
    match camprobe_props::run_export(&mut module, &opts) {
        Ok(summary) => {
            println!(
                "Wrote {} properties of camera {} to {}",
                summary.rows,
                summary.serial,
                summary.output.display()
            );
            Ok(())
        }
        Err(ExportError::Camera {
            source: camprobe_iface::Error::NoDevices,
        }) => {
            anyhow::bail!("no cameras detected");
        }
        Err(e) => Err(e.into()),
    }
}
