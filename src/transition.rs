//! Slide transition between two captured UI states.
//!
//! Construction enqueues one deferred operation that captures the "from"
//! frame, applies the state change, captures the "to" frame, and uploads both
//! to the live context. Rendering composites the pair along one axis with
//! smoothstep easing until the duration elapses.

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::{
    bus,
    capture::Capture,
    deferred::DeferredQueue,
    ease::Ease,
    error::RouenResult,
    services::Services,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Offsets of the "from" and "to" frames along the slide axis at progress
/// `p`.
pub fn slide_offsets(p: f64, extent: f32, ease: Ease) -> (f32, f32) {
    let e = ease.apply(p) as f32;
    (-e * extent, extent * (1.0 - e))
}

#[derive(Default)]
struct Textures {
    from: Option<egui::TextureHandle>,
    to: Option<egui::TextureHandle>,
}

pub struct SlideTransition {
    size: egui::Vec2,
    axis: Axis,
    duration: Duration,
    ease: Ease,
    started: Instant,
    textures: Arc<Mutex<Textures>>,
}

impl SlideTransition {
    /// Schedule the double capture and start the clock. `frame_cb` must draw
    /// the current UI state; `transition_cb` mutates external state so that
    /// `frame_cb` draws the new state afterwards.
    pub fn new(
        services: &Arc<Services>,
        size: egui::Vec2,
        axis: Axis,
        duration: Duration,
        mut frame_cb: impl FnMut(&mut egui::Ui) + Send + 'static,
        transition_cb: impl FnOnce() + Send + 'static,
    ) -> RouenResult<Self> {
        let queue = services.get::<DeferredQueue>(bus::DEFERRED)?;
        let capture = services.get::<Capture>(bus::CAPTURE)?;
        let renderer = services.get::<egui::Context>(bus::RENDERER)?;

        let textures = Arc::new(Mutex::new(Textures::default()));
        let slots = textures.clone();
        let (w, h) = (size.x.round() as u32, size.y.round() as u32);

        queue.enqueue(move || {
            let from = match capture.capture(w, h, &mut frame_cb) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!(component = "transition", error = %e, "from capture failed");
                    return;
                }
            };
            transition_cb();
            let to = match capture.capture(w, h, &mut frame_cb) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!(component = "transition", error = %e, "to capture failed");
                    return;
                }
            };

            let options = egui::TextureOptions::LINEAR;
            let mut slots = slots.lock().unwrap();
            slots.from =
                Some(renderer.load_texture("transition-from", from.to_color_image(), options));
            slots.to = Some(renderer.load_texture("transition-to", to.to_color_image(), options));
        });

        Ok(Self {
            size,
            axis,
            duration,
            ease: Ease::SmoothStep,
            started: Instant::now(),
            textures,
        })
    }

    /// Swap the default smoothstep for another curve.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.started.elapsed().as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Composite the pair. Returns `false` once the animation has run its
    /// course; callers drop the transition (and with it both textures) then.
    pub fn render(&mut self, ui: &mut egui::Ui) -> bool {
        let p = self.progress();
        if p >= 1.0 {
            return false;
        }

        let (rect, _) = ui.allocate_exact_size(self.size, egui::Sense::hover());
        let textures = self.textures.lock().unwrap();
        let (Some(from), Some(to)) = (&textures.from, &textures.to) else {
            // Captures have not drained yet; keep the animation alive.
            return true;
        };

        let extent = match self.axis {
            Axis::Horizontal => self.size.x,
            Axis::Vertical => self.size.y,
        };
        let (from_off, to_off) = slide_offsets(p, extent, self.ease);
        let shift = |offset: f32| match self.axis {
            Axis::Horizontal => egui::vec2(offset, 0.0),
            Axis::Vertical => egui::vec2(0.0, offset),
        };

        let painter = ui.painter_at(rect);
        let uv = egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0));
        painter.image(
            from.id(),
            egui::Rect::from_min_size(rect.min + shift(from_off), self.size),
            uv,
            egui::Color32::WHITE,
        );
        painter.image(
            to.id(),
            egui::Rect::from_min_size(rect.min + shift(to_off), self.size),
            uv,
            egui::Color32::WHITE,
        );
        true
    }
}
