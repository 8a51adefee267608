use bevy::prelude::*;
use bevy::render::camera::ClearColorConfig;
use bevy::window::PrimaryWindow;
use bevy_pancam::{DirectionKeys, PanCam};

use crate::EguiBlockInputState;
use crate::boundary::BoundaryStore;
use crate::drill::{CountryEntered, DrillController, DrillLevel, RegionEntered, WentBack};
use crate::types::{LatLngBounds, world_to_geo};

use super::MapScene;

#[derive(Component)]
pub struct MapCamera;

/// The 2D camera stays alive across levels; it just stops rendering anything
/// while the globe is up and its pan controls are disabled. It also carries
/// the UI, so it never clears the globe's output underneath.
pub fn setup_map_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Camera {
            order: 1,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        MapCamera,
        PanCam {
            grab_buttons: vec![MouseButton::Middle, MouseButton::Right],
            move_keys: DirectionKeys {
                up: vec![KeyCode::ArrowUp],
                down: vec![KeyCode::ArrowDown],
                left: vec![KeyCode::ArrowLeft],
                right: vec![KeyCode::ArrowRight],
            },
            speed: 400.,
            enabled: false,
            zoom_to_cursor: true,
            min_scale: 0.01,
            max_scale: f32::INFINITY,
            min_x: f32::NEG_INFINITY,
            max_x: f32::INFINITY,
            min_y: f32::NEG_INFINITY,
            max_y: f32::INFINITY,
        },
    ));
}

pub fn toggle_map_pan(
    controller: Res<DrillController>,
    egui_state: Res<EguiBlockInputState>,
    mut query: Query<&mut PanCam, With<MapCamera>>,
) {
    for mut pancam in &mut query {
        pancam.enabled =
            controller.displayed_level() != DrillLevel::Globe && !egui_state.block_input;
    }
}

/// Reacts to drill transitions: picks the projection reference, fits the
/// viewport, and caches the continent viewport before descending so `back`
/// can restore it verbatim.
pub fn sync_map_camera(
    mut region_entered: EventReader<RegionEntered>,
    mut country_entered: EventReader<CountryEntered>,
    mut went_back: EventReader<WentBack>,
    mut controller: ResMut<DrillController>,
    store: Res<BoundaryStore>,
    mut scene: ResMut<MapScene>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<MapCamera>>,
) {
    let window_size = windows
        .single()
        .map(|w| Vec2::new(w.width(), w.height()))
        .unwrap_or(Vec2::new(1280.0, 720.0));
    let Ok((mut transform, mut projection)) = cameras.single_mut() else {
        return;
    };

    for entered in region_entered.read() {
        let Some(bounds) = controller.cached_continent_bounds() else {
            warn!("no bounds for region {}, keeping viewport", entered.region);
            continue;
        };
        scene.reference = bounds.center();
        fit_viewport(&mut transform, &mut projection, &scene, bounds, window_size);
        scene.respawn_shapes = true;
        scene.respawn_markers = true;
    }

    for entered in country_entered.read() {
        // Record what the user was looking at before we replace it.
        let current = visible_bounds(&transform, &projection, &scene, window_size);
        controller.set_continent_bounds(current);

        let country_bounds = country_bounds(&store, &entered.code, &entered.name);
        if let Some(bounds) = country_bounds {
            fit_viewport(&mut transform, &mut projection, &scene, bounds.padded(1.0), window_size);
        }
        scene.respawn_shapes = true;
        scene.respawn_markers = true;
    }

    for _ in went_back.read() {
        if controller.level() == DrillLevel::ContinentMap {
            // Restore, not recompute.
            if let Some(bounds) = controller.cached_continent_bounds() {
                fit_viewport(&mut transform, &mut projection, &scene, bounds, window_size);
            }
        }
        scene.respawn_shapes = true;
        scene.respawn_markers = true;
    }
}

fn fit_viewport(
    transform: &mut Transform,
    projection: &mut Projection,
    scene: &MapScene,
    bounds: LatLngBounds,
    window_size: Vec2,
) {
    let min = crate::types::GeoPoint::new(bounds.south, bounds.west)
        .to_world(scene.reference, scene.meters_per_unit);
    let max = crate::types::GeoPoint::new(bounds.north, bounds.east)
        .to_world(scene.reference, scene.meters_per_unit);
    let center = (min + max) / 2.0;
    transform.translation.x = center.x;
    transform.translation.y = center.y;

    if let Projection::Orthographic(ortho) = projection {
        let extent = (max - min).abs();
        let scale_x = extent.x / window_size.x.max(1.0);
        let scale_y = extent.y / window_size.y.max(1.0);
        ortho.scale = (scale_x.max(scale_y) * 1.1).max(0.0001);
    }
}

fn visible_bounds(
    transform: &Transform,
    projection: &Projection,
    scene: &MapScene,
    window_size: Vec2,
) -> LatLngBounds {
    let scale = match projection {
        Projection::Orthographic(ortho) => ortho.scale,
        _ => 1.0,
    };
    let half = window_size * scale / 2.0;
    let center = Vec2::new(transform.translation.x, transform.translation.y);
    let min = world_to_geo(center - half, scene.reference, scene.meters_per_unit);
    let max = world_to_geo(center + half, scene.reference, scene.meters_per_unit);
    LatLngBounds::new(min.lat, min.lng, max.lat, max.lng)
}

fn country_bounds(store: &BoundaryStore, code: &str, name: &str) -> Option<LatLngBounds> {
    let collection = store.collection()?;
    collection
        .features
        .iter()
        .find(|f| f.iso_a2.eq_ignore_ascii_case(code) || f.country.eq_ignore_ascii_case(name))
        .map(|f| f.bounds())
}
