#[cfg(feature = "backend_sim")]
extern crate camprobe_sim as backend;

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use eframe::egui;

use camprobe_preview::{
    APP_NAME, AcquisitionProfile, CaptureWorker, FrameSlot, PreviewApp, window_title,
};

/// Show a live image stream of a camera with its frame rate.
#[derive(Debug, Parser)]
#[command(name = APP_NAME, author, version)]
struct Cli {
    /// TOML file with acquisition settings. Built-in defaults if not given.
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Unique name or serial number of the camera. Defaults to the first one.
    #[arg(short, long, env = "CAMPROBE_DEVICE")]
    device: Option<String>,

    /// How long to wait for each frame, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    snap_timeout_ms: u64,

    /// Repaint period when no frames arrive, in milliseconds.
    #[arg(long, default_value_t = 50)]
    repaint_interval_ms: u64,
}

type DynError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> anyhow::Result<()> {
    let _tracing_guard = env_tracing_logger::init_with_default("camprobe_preview=info,warn");
    let cli = Cli::parse();

    let profile = match &cli.profile {
        Some(path) => camprobe_preview::parse_profile_file(path)?,
        None => AcquisitionProfile::default(),
    };

    let mut module = backend::new_module()?;
    let (cam, _frame_rate) =
        match camprobe_preview::open_preview_camera(&mut module, cli.device.as_deref(), &profile) {
            Ok(opened) => opened,
            Err(camprobe_preview::Error::Camera {
                source: camprobe_iface::Error::NoDevices,
            }) => {
                anyhow::bail!("no cameras detected");
            }
            Err(e) => return Err(e.into()),
        };

    let slot = FrameSlot::new();
    let snap_timeout = Duration::from_millis(cli.snap_timeout_ms);
    let repaint_interval = Duration::from_millis(cli.repaint_interval_ms);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 640.0])
            .with_resizable(true)
            .with_title(window_title(0.0)),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(
            move |cc: &eframe::CreationContext<'_>| -> Result<Box<dyn eframe::App>, DynError> {
                let ctx = cc.egui_ctx.clone();
                let worker = CaptureWorker::spawn(
                    cam,
                    slot.clone(),
                    snap_timeout,
                    Box::new(move || ctx.request_repaint()),
                )?;
                Ok(Box::new(PreviewApp::new(worker, slot, repaint_interval)))
            },
        ),
    )
    .map_err(|e| anyhow::anyhow!("running failed with error {e}"))?;
    Ok(())
}
