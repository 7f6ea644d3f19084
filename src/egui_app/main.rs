/**
 * Studio Admin - Main Entry Point
 *
 * Loads configuration, restores the stored session and runs the egui shell.
 */
use std::sync::Arc;

use eframe::egui;
use studio_admin::api::ApiClient;
use studio_admin::egui_app::theme::styles;
use studio_admin::egui_app::{views, AppState};
use studio_admin::session::{FileTokenStorage, MemoryTokenStorage, SessionStore, TokenStorage};
use studio_admin::shared::AppConfig;
use tokio::runtime::Runtime;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), eframe::Error> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("studio_admin=info")),
        )
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };
    info!(api = %config.api_base_url, "starting studio admin");

    let runtime = Runtime::new().expect("failed to start tokio runtime");
    let client = ApiClient::new(&config).expect("failed to build HTTP client");

    let storage: Arc<dyn TokenStorage> = match FileTokenStorage::from_config(&config) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            warn!(error = %e, "token will not survive restarts");
            Arc::new(MemoryTokenStorage::new())
        }
    };

    let session = Arc::new(SessionStore::new(client, storage));
    {
        let session = Arc::clone(&session);
        runtime.spawn(async move { session.initialize().await });
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Studio Admin",
        options,
        Box::new(move |cc| {
            styles::apply_global_theme(&cc.egui_ctx);
            let state = AppState::new(runtime.handle().clone(), session);
            Ok(Box::new(StudioAdminApp {
                state,
                _runtime: runtime,
            }))
        }),
    )
}

struct StudioAdminApp {
    state: AppState,
    // Keeps the runtime alive for the lifetime of the window.
    _runtime: Runtime,
}

impl eframe::App for StudioAdminApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll();

        views::render_top_bar(ctx, &mut self.state);

        views::render_main_panel(ctx, &mut self.state);

        ctx.request_repaint();
    }
}

impl Drop for StudioAdminApp {
    fn drop(&mut self) {
        self.state.session.shutdown();
        info!("shutting down");
    }
}
