use eframe::egui;

use crate::egui_app::state::AppState;
use crate::egui_app::theme::{colors, styles};
use crate::session::SessionPhase;

pub mod login_view;
pub mod shell_view;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_panel")
        .frame(styles::top_bar_frame())
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(
                    colors::TEXT_LIGHT,
                    egui::RichText::new("Studio Admin").size(18.0).strong(),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(16.0);

                    let email = state.snapshot.user.as_ref().map(|user| user.email.clone());
                    if let Some(email) = email {
                        if ui.button("Logout").clicked() {
                            state.logout();
                        }
                        ui.colored_label(colors::TEXT_LIGHT, email);
                    }
                });
            });
        });
}

pub fn render_main_panel(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default()
        .frame(styles::content_frame())
        .show(ctx, |ui| {
            let phase = state.snapshot.phase;
            match phase {
                SessionPhase::Initializing => render_initializing(ui),
                SessionPhase::Unauthenticated => login_view::render(ui, state),
                SessionPhase::Authenticated => shell_view::render(ui, state),
            }
        });
}

fn render_initializing(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space((ui.available_height() / 2.0 - 24.0).max(0.0));
        ui.spinner();
        ui.add_space(8.0);
        ui.label(egui::RichText::new("Restoring session...").color(colors::TEXT_SECONDARY));
    });
}
