mod camera;
mod markers;
mod polygons;

pub use camera::*;
pub use markers::*;
pub use polygons::*;

use bevy::prelude::*;

use crate::drill::DrillLevel;
use crate::types::GeoPoint;

/// Shared projection context for the 2D map. All shapes and markers project
/// through the same reference point so they line up.
#[derive(Resource)]
pub struct MapScene {
    pub reference: GeoPoint,
    pub meters_per_unit: f64,
    pub respawn_shapes: bool,
    pub respawn_markers: bool,
    pub last_camera_scale: f32,
    pub last_displayed: DrillLevel,
}

impl Default for MapScene {
    fn default() -> Self {
        Self {
            reference: GeoPoint::new(0.0, 0.0),
            meters_per_unit: 50_000.0,
            respawn_shapes: false,
            respawn_markers: false,
            last_camera_scale: 1.0,
            last_displayed: DrillLevel::Globe,
        }
    }
}

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MapScene>()
            .add_systems(Startup, setup_map_camera)
            .add_systems(
                Update,
                (
                    sync_map_camera,
                    toggle_map_pan,
                    flag_marker_respawns,
                    respawn_map_shapes,
                    respawn_markers,
                    hover_map_polygons,
                    handle_marker_clicks,
                ),
            );
    }
}
