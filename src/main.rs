use eframe::egui;
use std::sync::mpsc;

use veye::gui::DashboardApp;
use veye::settings::Settings;
use veye::supabase::{self, SupabaseClient};

fn main() -> anyhow::Result<()> {
    let settings = Settings::load("settings.json")?;
    veye::logging::init(settings.debug_logging);

    let (url, key) = settings.backend()?;
    let client = SupabaseClient::new(&url, &key)?;

    let (w, h) = settings.window_size.unwrap_or((1100, 760));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([w as f32, h as f32])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "veye",
        native_options,
        Box::new(move |cc| {
            let (tx, rx) = mpsc::channel();

            let ctx = cc.egui_ctx.clone();
            supabase::spawn_snapshot_fetch(client.clone(), tx.clone(), move || {
                ctx.request_repaint()
            });

            let ctx = cc.egui_ctx.clone();
            let realtime = supabase::realtime::subscribe_inserts(
                client.base_url(),
                client.anon_key(),
                tx,
                move || ctx.request_repaint(),
            );

            Box::new(AppWithWorkers {
                app: DashboardApp::new(rx),
                _realtime: realtime,
            })
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;
    Ok(())
}

/// Keeps the realtime handle alive for the lifetime of the window so the
/// subscription is torn down exactly when the view goes away.
struct AppWithWorkers {
    app: DashboardApp,
    _realtime: supabase::realtime::RealtimeHandle,
}

impl eframe::App for AppWithWorkers {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.app.update(ctx, frame);
    }
}
