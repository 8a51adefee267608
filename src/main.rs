use bevy::{
    prelude::*,
    winit::{UpdateMode, WinitSettings},
};

use bevy_egui::EguiPlugin;
use bevy_pancam::PanCamPlugin;
use bevy_prototype_lyon::plugin::ShapePlugin;

use aggregates::AggregateWorkerPlugin;
use boundary::BoundaryStorePlugin;
use debug::DebugPlugin;
use drill::DrillDownPlugin;
use globe::GlobePlugin;
use map2d::MapPlugin;
use ui::UiPlugin;

pub mod aggregates;
pub mod boundary;
pub mod debug;
pub mod drill;
pub mod globe;
pub mod map2d;
pub mod region;
pub mod types;
pub mod ui;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Drillmap".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .add_plugins(DebugPlugin)
        .add_plugins(EguiPlugin {
            enable_multipass_for_primary_context: false,
        })
        .add_plugins((PanCamPlugin, ShapePlugin))
        .insert_resource(EguiBlockInputState::default())
        .insert_resource(WinitSettings {
            unfocused_mode: UpdateMode::Reactive {
                wait: std::time::Duration::from_secs(1),
                react_to_device_events: true,
                react_to_user_events: true,
                react_to_window_events: true,
            },
            ..Default::default()
        })
        .insert_resource(ClearColor(Color::from(Srgba {
            red: 0.03,
            green: 0.04,
            blue: 0.08,
            alpha: 1.0,
        })))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 300.0,
            ..Default::default()
        })
        .add_plugins(BoundaryStorePlugin)
        .add_plugins(AggregateWorkerPlugin)
        .add_plugins(DrillDownPlugin)
        .add_plugins(GlobePlugin)
        .add_plugins(MapPlugin)
        .add_plugins(UiPlugin)
        .add_systems(Update, absorb_egui_inputs)
        .run();
}

#[derive(Resource, Default)]
pub struct EguiBlockInputState {
    pub block_input: bool,
}

fn absorb_egui_inputs(
    mut contexts: bevy_egui::EguiContexts,
    mut state: ResMut<EguiBlockInputState>,
) {
    let ctx = contexts.ctx_mut();
    state.block_input = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
}
