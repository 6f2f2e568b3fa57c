//! Off-screen UI capture.
//!
//! Renders a UI-emitting callback into a pixel buffer of a requested size
//! without disturbing the caller's live frame: a fresh `egui::Context` (the
//! surrogate UI context) runs exactly one frame inside a borderless
//! full-extent panel, the output is tessellated, and the meshes are
//! software-rasterized. Captures mutate no shared UI state, but they must
//! still run outside an in-flight frame; callers route them through the
//! deferred-operation queue.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use crate::error::{RouenError, RouenResult};
use crate::raster::{self, TextureStore};

/// Callback that emits the UI to capture.
pub type RenderCb<'a> = &'a mut dyn FnMut(&mut egui::Ui);

/// A captured frame: premultiplied RGBA8, row-major.
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl CapturedFrame {
    fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Copy for texture upload into a live context.
    pub fn to_color_image(&self) -> egui::ColorImage {
        let pixels = self
            .pixels
            .chunks_exact(4)
            .map(|p| egui::Color32::from_rgba_premultiplied(p[0], p[1], p[2], p[3]))
            .collect();
        egui::ColorImage {
            size: [self.width as usize, self.height as usize],
            pixels,
        }
    }

    /// Write the frame as a 32-bit RGBA PNG.
    pub fn save_png(&self, path: &Path) -> RouenResult<()> {
        let mut out = Vec::with_capacity(self.pixels.len());
        for p in self.pixels.chunks_exact(4) {
            let a = p[3];
            if a == 0 || a == 255 {
                out.extend_from_slice(&[p[0], p[1], p[2], a]);
            } else {
                // Unpremultiply for the file format.
                let un = |c: u8| ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)) as u8;
                out.extend_from_slice(&[un(p[0]), un(p[1]), un(p[2]), a]);
            }
        }
        let img = image::RgbaImage::from_raw(self.width, self.height, out)
            .ok_or_else(|| RouenError::capture("pixel buffer does not match dimensions"))?;
        img.save(path)
            .map_err(|e| RouenError::capture(format!("write png '{}': {e}", path.display())))
    }
}

/// The capture service, registered on the service registry so cards and the
/// deck reach it without owning it.
#[derive(Default)]
pub struct Capture;

impl Capture {
    pub fn new() -> Self {
        Self
    }

    /// Render `cb` into a frame of exactly `(width, height)`.
    ///
    /// A panic inside `cb` is caught and logged; the frame (possibly blank)
    /// is still returned, mirroring the "texture is returned even when the
    /// callback faults" contract.
    pub fn capture(&self, width: u32, height: u32, cb: RenderCb<'_>) -> RouenResult<CapturedFrame> {
        if width == 0 || height == 0 {
            return Err(RouenError::capture(format!(
                "requested size {width}x{height} is empty"
            )));
        }

        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(width as f32, height as f32),
            )),
            ..Default::default()
        };

        let output = catch_unwind(AssertUnwindSafe(|| {
            ctx.run(input, |ctx| {
                egui::CentralPanel::default()
                    .frame(egui::Frame::none())
                    .show(ctx, |ui| cb(ui));
            })
        }));

        let mut frame = CapturedFrame::transparent(width, height);
        match output {
            Ok(full) => {
                let mut store = TextureStore::default();
                store.apply(&full.textures_delta);
                let primitives = ctx.tessellate(full.shapes, full.pixels_per_point);
                raster::paint_primitives(
                    &mut frame.pixels,
                    width as usize,
                    height as usize,
                    &primitives,
                    &store,
                    full.pixels_per_point,
                );
            }
            Err(_) => {
                tracing::error!(component = "capture", "render callback panicked; frame kept");
            }
        }
        Ok(frame)
    }
}
