use fieldscope::app::FieldscopeApp;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    log::info!("starting fieldscope");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_title("Fieldscope - Electromagnetic Field Visualizer"),
        ..Default::default()
    };

    eframe::run_native(
        "Fieldscope - Electromagnetic Field Visualizer",
        options,
        Box::new(|_cc| Ok(Box::new(FieldscopeApp::new()))),
    )
}
