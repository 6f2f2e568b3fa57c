//! The dark theme: exact palette and metric overrides.

use egui::{Color32, Margin, Rounding, Stroke};

fn col(r: f32, g: f32, b: f32, a: f32) -> Color32 {
    let ch = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(ch(r), ch(g), ch(b), ch(a))
}

pub const WINDOW_BG: Color32 = Color32::from_rgb(26, 26, 31); // 0.10, 0.10, 0.12

/// Install the palette on a live context.
pub fn install(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    let visuals = &mut style.visuals;

    visuals.dark_mode = true;
    visuals.window_fill = col(0.10, 0.10, 0.12, 1.0);
    visuals.panel_fill = col(0.10, 0.10, 0.12, 1.0);
    visuals.window_stroke = Stroke::new(1.0, col(0.26, 0.26, 0.29, 0.50));
    visuals.override_text_color = Some(col(0.90, 0.90, 0.92, 1.0));
    visuals.faint_bg_color = col(0.13, 0.14, 0.18, 1.0); // title band
    visuals.widgets.open.weak_bg_fill = col(0.16, 0.18, 0.28, 1.0); // active title

    visuals.widgets.inactive.bg_fill = col(0.17, 0.18, 0.22, 1.0); // frame bg
    visuals.widgets.inactive.weak_bg_fill = col(0.23, 0.35, 0.45, 1.0); // button
    visuals.widgets.hovered.weak_bg_fill = col(0.28, 0.45, 0.60, 1.0);
    visuals.widgets.active.weak_bg_fill = col(0.33, 0.55, 0.70, 1.0);

    // Checkmarks, slider grabs, and selected text share the accent.
    visuals.selection.bg_fill = col(0.37, 0.53, 0.71, 0.50);
    visuals.selection.stroke = Stroke::new(1.0, col(0.37, 0.53, 0.71, 1.0));

    visuals.window_rounding = Rounding::same(5.0);
    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
        &mut visuals.widgets.open,
    ] {
        widget.rounding = Rounding::same(3.0);
    }

    style.spacing.window_margin = Margin::same(10.0);
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);

    ctx.set_style(style);
}
