use eframe::egui;

use crate::egui_app::state::AppState;
use crate::egui_app::theme::{colors, styles};

const FORM_HEIGHT: f32 = 260.0;
const INPUT_WIDTH: f32 = 280.0;
const LABEL_WIDTH: f32 = 80.0;

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let available_rect = ui.available_rect_before_wrap();

    ui.scope_builder(egui::UiBuilder::new().max_rect(available_rect), |ui| {
        ui.vertical_centered(|ui| {
            let top_space = (available_rect.height() - FORM_HEIGHT).max(0.0) / 2.0;
            ui.add_space(top_space);

            ui.label(
                egui::RichText::new("Sign in")
                    .size(24.0)
                    .color(colors::TEXT_LIGHT),
            );
            ui.add_space(20.0);

            if let Some(error) = &state.snapshot.error {
                styles::error_banner_frame().show(ui, |ui| {
                    ui.label(egui::RichText::new(error).color(colors::ERROR));
                });
                ui.add_space(10.0);
            }

            let indent = (available_rect.width() - INPUT_WIDTH - LABEL_WIDTH - 20.0) / 2.0;
            let mut edited = false;
            let mut submit = false;

            ui.horizontal(|ui| {
                ui.add_space(indent);
                ui.add_sized(
                    [LABEL_WIDTH, 24.0],
                    egui::Label::new(egui::RichText::new("Login:").color(colors::TEXT_SECONDARY)),
                );
                let response = ui.add_sized(
                    [INPUT_WIDTH, 28.0],
                    egui::TextEdit::singleline(&mut state.identifier_input)
                        .hint_text("email")
                        .text_color(colors::TEXT_LIGHT),
                );
                edited |= response.changed();
            });
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.add_space(indent);
                ui.add_sized(
                    [LABEL_WIDTH, 24.0],
                    egui::Label::new(
                        egui::RichText::new("Password:").color(colors::TEXT_SECONDARY),
                    ),
                );
                let response = ui.add_sized(
                    [INPUT_WIDTH, 28.0],
                    egui::TextEdit::singleline(&mut state.password_input)
                        .password(true)
                        .text_color(colors::TEXT_LIGHT),
                );
                edited |= response.changed();
                submit |= response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            });
            ui.add_space(20.0);

            if edited {
                state.on_login_input_changed();
            }

            let button = egui::Button::new(
                egui::RichText::new("Login").color(colors::TEXT_LIGHT),
            )
            .fill(colors::ACCENT);
            let can_submit = state.can_submit_login();
            submit |= ui
                .add_enabled_ui(can_submit, |ui| ui.add_sized([120.0, 32.0], button))
                .inner
                .clicked();

            if submit && can_submit {
                state.handle_login();
            }

            if state.is_login_pending() {
                ui.add_space(15.0);
                ui.horizontal(|ui| {
                    ui.add_space((available_rect.width() - 100.0) / 2.0);
                    ui.label(egui::RichText::new("Signing in...").color(colors::TEXT_LIGHT));
                    ui.spinner();
                });
            }
        });
    });
}
