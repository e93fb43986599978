use std::time::Duration;

use eframe::egui;
use tracing::{error, info};

use camprobe_iface::FrameBuffer;

use crate::{CaptureWorker, FpsCounter, FrameSlot, fit_size, to_color_image, window_title};

pub struct PreviewApp {
    worker: CaptureWorker,
    slot: FrameSlot<FrameBuffer>,
    texture: Option<egui::TextureHandle>,
    fps: FpsCounter,
    repaint_interval: Duration,
    last_error: Option<String>,
}

impl PreviewApp {
    pub fn new(
        worker: CaptureWorker,
        slot: FrameSlot<FrameBuffer>,
        repaint_interval: Duration,
    ) -> Self {
        Self {
            worker,
            slot,
            texture: None,
            fps: FpsCounter::default(),
            repaint_interval,
            last_error: None,
        }
    }

    /// Upload the latest frame, if there is a new one.
    fn show_latest_frame(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.slot.take() else {
            return;
        };
        let image = match to_color_image(&frame) {
            Ok(image) => image,
            Err(e) => {
                error!("cannot display frame {}: {e}", frame.host_timing.fno);
                self.last_error = Some(e.to_string());
                return;
            }
        };
        match &mut self.texture {
            Some(tex) => tex.set(image, egui::TextureOptions::default()),
            None => {
                self.texture =
                    Some(ctx.load_texture("camera_frame", image, egui::TextureOptions::default()));
            }
        }
        self.last_error = None;

        if let Some(fps) = self.fps.tick() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(window_title(fps)));
        }
    }
}

impl eframe::App for PreviewApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("stopping capture");
        self.worker.stop();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show_latest_frame(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            match (&self.texture, &self.last_error) {
                (_, Some(msg)) => {
                    ui.label(msg.as_str());
                }
                (Some(tex), None) => {
                    let size = fit_size(tex.size_vec2(), ui.available_size());
                    ui.centered_and_justified(|ui| {
                        ui.add(egui::Image::new(egui::load::SizedTexture::new(
                            tex.id(),
                            size,
                        )));
                    });
                }
                (None, None) => {
                    if self.worker.is_running() {
                        ui.label("waiting for first frame");
                    } else {
                        ui.label("capture stopped");
                    }
                }
            }
        });

        ctx.request_repaint_after(self.repaint_interval);
    }
}
