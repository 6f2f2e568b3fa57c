use rouen::app::RouenApp;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(egui::vec2(1280.0, 800.0))
            .with_min_inner_size(egui::vec2(640.0, 480.0))
            .with_resizable(true),
        vsync: true,
        ..Default::default()
    };

    eframe::run_native(
        "Rouen",
        options,
        Box::new(|cc| {
            let app = RouenApp::new(cc)
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window bring-up failed: {e}"))
}
