use bevy::prelude::*;
use bevy_egui::{
    EguiContexts, EguiPreUpdateSet,
    egui::{self, Color32, RichText},
};

use crate::boundary::BoundaryStore;
use crate::drill::{
    BackRequested, DrillController, DrillLevel, ItemSelected, StateBadgeClicked, WentBack,
};
use crate::types::StateAggregate;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DetailPanel>().add_systems(
            Update,
            (
                open_detail_panel,
                close_detail_panel_on_back,
                ui_overlay.after(EguiPreUpdateSet::InitContexts),
            ),
        );
    }
}

/// Detail surface for one state's items, opened by a badge click.
#[derive(Resource, Default)]
pub struct DetailPanel {
    pub state: Option<StateAggregate>,
}

fn open_detail_panel(
    mut clicks: EventReader<StateBadgeClicked>,
    controller: Res<DrillController>,
    mut panel: ResMut<DetailPanel>,
) {
    for click in clicks.read() {
        panel.state = controller
            .state_aggregates()
            .iter()
            .find(|s| s.state_name == click.state_name)
            .cloned();
    }
}

fn close_detail_panel_on_back(mut backs: EventReader<WentBack>, mut panel: ResMut<DetailPanel>) {
    if !backs.is_empty() {
        backs.clear();
        panel.state = None;
    }
}

fn ui_overlay(
    mut contexts: EguiContexts,
    controller: Res<DrillController>,
    store: Res<BoundaryStore>,
    mut panel: ResMut<DetailPanel>,
    mut back: EventWriter<BackRequested>,
    mut item_selected: EventWriter<ItemSelected>,
) {
    let ctx = contexts.ctx_mut();

    egui::Area::new("breadcrumb".into())
        .fixed_pos(egui::pos2(10.0, 10.0))
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(Color32::from_rgba_premultiplied(30, 30, 30, 220))
                .corner_radius(8)
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if controller.level() != DrillLevel::Globe
                            && ui.button(RichText::new("< Back").strong()).clicked()
                        {
                            back.write(BackRequested);
                        }
                        let crumb = match (
                            controller.selected_region(),
                            controller.selected_country(),
                        ) {
                            (Some(region), Some(country)) => {
                                format!("{region} / {}", country.name)
                            }
                            (Some(region), None) => region.to_string(),
                            _ => "World".to_string(),
                        };
                        ui.label(RichText::new(crumb).color(Color32::from_rgb(221, 221, 221)));
                    });
                });
        });

    if store.is_degraded() {
        egui::Area::new("degraded".into())
            .fixed_pos(egui::pos2(10.0, 54.0))
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(Color32::from_rgba_premultiplied(90, 30, 30, 230))
                    .corner_radius(8)
                    .inner_margin(egui::Margin::same(8))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new("Boundary data unavailable - regions are disabled")
                                .color(Color32::from_rgb(240, 200, 200)),
                        );
                    });
            });
    }

    let mut close = false;
    if let Some(state) = &panel.state {
        egui::Window::new(format!("{} ({})", state.state_name, state.count))
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                if state.items.is_empty() {
                    ui.label("Nothing here yet.");
                }
                for item in &state.items {
                    if ui.button(&item.title).clicked() {
                        item_selected.write(ItemSelected { item: item.clone() });
                    }
                }
                ui.separator();
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
    }
    if close {
        panel.state = None;
    }
}
