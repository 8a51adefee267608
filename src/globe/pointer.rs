use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::EguiBlockInputState;
use crate::boundary::BoundaryStore;
use crate::drill::{DrillConfig, DrillController, DrillLevel, RegionPicked};
use crate::region::region_for_coord;

use super::{GlobeCamera, GlobeRoot, GlobeRotation, cursor_to_geo};

/// Explicit pointer state machine. Pure transitions, testable without a
/// window.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub enum GlobePointer {
    #[default]
    Idle,
    Dragging {
        total_px: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    Click,
    DragRelease,
}

impl GlobePointer {
    pub fn press(&mut self) {
        *self = GlobePointer::Dragging { total_px: 0.0 };
    }

    /// Accumulates movement while dragging. Returns the delta to feed the
    /// rotation target, or `None` when not dragging.
    pub fn movement(&mut self, delta: Vec2) -> Option<Vec2> {
        match self {
            GlobePointer::Dragging { total_px } => {
                *total_px += delta.length();
                Some(delta)
            }
            GlobePointer::Idle => None,
        }
    }

    /// A release below the threshold was a click, above it a drag-release.
    /// Never both.
    pub fn release(&mut self, threshold_px: f32) -> Option<ReleaseKind> {
        let kind = match *self {
            GlobePointer::Dragging { total_px } if total_px <= threshold_px => {
                Some(ReleaseKind::Click)
            }
            GlobePointer::Dragging { .. } => Some(ReleaseKind::DragRelease),
            GlobePointer::Idle => None,
        };
        *self = GlobePointer::Idle;
        kind
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, GlobePointer::Dragging { .. })
    }
}

/// Hover tracking, independent of the drag state machine.
#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub enum HoverState {
    #[default]
    None,
    Region(String),
}

const DRAG_DEGREES_PER_PX: f32 = 0.25;

/// Single pointer system for the globe: drag to rotate, hover to highlight,
/// click to pick a region.
pub fn handle_globe_pointer(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<bevy::input::mouse::MouseMotion>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<GlobeCamera>>,
    globes: Query<&Transform, With<GlobeRoot>>,
    controller: Res<DrillController>,
    config: Res<DrillConfig>,
    store: Res<BoundaryStore>,
    egui_state: Res<EguiBlockInputState>,
    mut pointer: ResMut<GlobePointer>,
    mut hover: ResMut<HoverState>,
    mut rotation: ResMut<GlobeRotation>,
    mut picked: EventWriter<RegionPicked>,
) {
    if controller.displayed_level() != DrillLevel::Globe || egui_state.block_input {
        motion.clear();
        if pointer.is_dragging() {
            *pointer = GlobePointer::Idle;
        }
        if *hover != HoverState::None {
            *hover = HoverState::None;
        }
        return;
    }

    let delta: Vec2 = motion.read().map(|m| m.delta).sum();

    if buttons.just_pressed(MouseButton::Left) {
        pointer.press();
    }

    if let Some(drag) = pointer.movement(delta) {
        rotation.target_yaw += drag.x.to_radians() * DRAG_DEGREES_PER_PX;
        rotation.target_pitch += drag.y.to_radians() * DRAG_DEGREES_PER_PX;
        rotation.clamp_pitch();
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let cursor = window.cursor_position();

    // Hover updates on every move while not dragging.
    if !pointer.is_dragging() {
        let next = cursor
            .and_then(|pos| geo_at_cursor(&cameras, &globes, pos))
            .and_then(|point| {
                let collection = store.collection()?;
                region_for_coord(&collection, point)
            });
        let next = match next {
            Some(region) => HoverState::Region(region),
            None => HoverState::None,
        };
        if *hover != next {
            *hover = next;
        }
    }

    if buttons.just_released(MouseButton::Left) {
        if pointer.release(config.click_threshold_px) == Some(ReleaseKind::Click) {
            // Clicks missing the sphere or landing on open ocean are no-ops.
            if let Some(region) = cursor
                .and_then(|pos| geo_at_cursor(&cameras, &globes, pos))
                .and_then(|point| {
                    let collection = store.collection()?;
                    region_for_coord(&collection, point)
                })
            {
                picked.write(RegionPicked { region });
            }
        }
    }
}

fn geo_at_cursor(
    cameras: &Query<(&Camera, &GlobalTransform), With<GlobeCamera>>,
    globes: &Query<&Transform, With<GlobeRoot>>,
    cursor: Vec2,
) -> Option<crate::types::GeoPoint> {
    let (camera, camera_transform) = cameras.single().ok()?;
    let globe_transform = globes.single().ok()?;
    cursor_to_geo(camera, camera_transform, globe_transform, cursor)
}
