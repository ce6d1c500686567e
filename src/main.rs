mod app;
mod chart;
mod color;
mod config;
mod data;
mod error;
mod export;
mod i18n;
mod state;
mod ui;

use app::RustyTernaryApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = config::load_settings();
    let title = settings.locale.strings().window_title;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([700.0, 500.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |cc| {
            let fontdb = export::raster::build_fontdb(&settings.export.font_dirs);
            ui::fonts::install_cjk_fallback(&cc.egui_ctx, &fontdb);
            Ok(Box::new(RustyTernaryApp::new(settings)))
        }),
    )
}
