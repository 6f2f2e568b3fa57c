use rouen::Capture;

#[test]
fn capture_renders_without_a_live_window() {
    let capture = Capture::new();
    let frame = capture
        .capture(300, 450, &mut |ui| {
            ui.label("off-screen card body");
            ui.painter().rect_filled(
                egui::Rect::from_min_size(egui::pos2(10.0, 10.0), egui::vec2(100.0, 60.0)),
                4.0,
                egui::Color32::from_rgb(59, 89, 115),
            );
        })
        .unwrap();

    assert_eq!((frame.width, frame.height), (300, 450));
    assert_eq!(frame.pixels.len(), 300 * 450 * 4);
    // The filled rect must land somewhere in the buffer.
    assert!(frame.pixels.chunks_exact(4).any(|p| p[3] > 0));
}

#[test]
fn capture_output_converts_to_a_color_image() {
    let capture = Capture::new();
    let frame = capture
        .capture(40, 20, &mut |ui| {
            ui.painter().rect_filled(
                egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(40.0, 20.0)),
                0.0,
                egui::Color32::WHITE,
            );
        })
        .unwrap();

    let img = frame.to_color_image();
    assert_eq!(img.size, [40, 20]);
    assert_eq!(img.pixels.len(), 40 * 20);
}

#[test]
fn back_to_back_captures_are_independent() {
    let capture = Capture::new();
    let blank = capture.capture(16, 16, &mut |_| {}).unwrap();
    let painted = capture
        .capture(16, 16, &mut |ui| {
            ui.painter().rect_filled(
                egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(16.0, 16.0)),
                0.0,
                egui::Color32::WHITE,
            );
        })
        .unwrap();

    assert!(blank.pixels.iter().all(|&b| b == 0));
    assert!(painted.pixels.chunks_exact(4).any(|p| p[3] == 255));
}
