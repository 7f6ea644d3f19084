use eframe::egui;

use crate::egui_app::state::{AppState, TabState};
use crate::egui_app::theme::{colors, styles};
use crate::egui_app::types::{AppTab, TabData};

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        for tab in AppTab::ALL {
            ui.selectable_value(&mut state.current_tab, tab, tab.label());
        }
    });
    ui.separator();

    let tab = state.current_tab;
    state.ensure_loaded(tab);

    let mut refresh = false;
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(tab.label())
                .size(20.0)
                .strong()
                .color(colors::TEXT_LIGHT),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let loading = matches!(state.tab(tab), Some(TabState::Loading(_)));
            refresh = ui.add_enabled(!loading, egui::Button::new("Refresh")).clicked();
        });
    });
    ui.add_space(8.0);

    match state.tab(tab) {
        Some(TabState::Loading(_)) | None => {
            ui.spinner();
        }
        Some(TabState::Failed(message)) => {
            styles::error_banner_frame().show(ui, |ui| {
                ui.label(egui::RichText::new(message).color(colors::ERROR));
            });
        }
        Some(TabState::Ready(data)) => render_table(ui, tab, data),
    }

    if refresh {
        state.refresh(tab);
    }
}

fn render_table(ui: &mut egui::Ui, tab: AppTab, data: &TabData) {
    if data.is_empty() {
        ui.label(egui::RichText::new("Nothing here yet.").color(colors::TEXT_SECONDARY));
        return;
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new(("tab_grid", tab))
                .striped(true)
                .spacing([16.0, 6.0])
                .show(ui, |ui| {
                    for column in &data.columns {
                        ui.label(
                            egui::RichText::new(column)
                                .strong()
                                .color(colors::TEXT_LIGHT),
                        );
                    }
                    ui.end_row();

                    for row in &data.rows {
                        for value in row {
                            ui.label(egui::RichText::new(value).color(colors::TEXT_LIGHT));
                        }
                        ui.end_row();
                    }
                });
        });
}
