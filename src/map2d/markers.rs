use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_prototype_lyon::prelude::{Fill, ShapeBuilder, ShapeBuilderBase, Stroke, shapes};

use crate::EguiBlockInputState;
use crate::drill::{CountryMarkerClicked, DrillController, DrillLevel, StateBadgeClicked};
use crate::region::theme_for;
use crate::types::GeoPoint;

use super::{MapCamera, MapScene};

/// Continent-level cluster marker, one per country aggregate.
#[derive(Component)]
pub struct CountryMarker {
    pub code: String,
    pub name: String,
    pub center: Vec2,
    pub radius: f32,
}

/// Country-level badge, one per state aggregate.
#[derive(Component)]
pub struct StateBadge {
    pub state_name: String,
    pub center: Vec2,
    pub half_extents: Vec2,
}

/// Marker glyph size in screen pixels, a monotonic function of the count.
pub fn marker_radius_px(count: u32) -> f32 {
    (24.0 + 2.0 * count as f32).clamp(32.0, 50.0)
}

const BADGE_HEIGHT_PX: f32 = 26.0;
const BADGE_CHAR_PX: f32 = 8.5;

/// Requests a marker respawn when the controller got fresh aggregate data or
/// the zoom changed enough that pixel-sized glyphs need rebuilding.
pub fn flag_marker_respawns(
    mut controller: ResMut<DrillController>,
    mut scene: ResMut<MapScene>,
    cameras: Query<&Projection, With<MapCamera>>,
) {
    if controller.markers_dirty {
        controller.markers_dirty = false;
        scene.respawn_shapes = true;
        scene.respawn_markers = true;
    }
    // The visible renderer swaps at the fade midpoint; rebuild the layers the
    // moment that happens.
    if scene.last_displayed != controller.displayed_level() {
        scene.last_displayed = controller.displayed_level();
        scene.respawn_shapes = true;
        scene.respawn_markers = true;
    }
    if let Ok(Projection::Orthographic(ortho)) = cameras.single() {
        let last = scene.last_camera_scale;
        if last > 0.0 && (ortho.scale / last - 1.0).abs() > 0.2 {
            scene.last_camera_scale = ortho.scale;
            scene.respawn_markers = true;
        } else if last <= 0.0 {
            scene.last_camera_scale = ortho.scale;
        }
    }
}

pub fn respawn_markers(
    mut commands: Commands,
    markers: Query<Entity, Or<(With<CountryMarker>, With<StateBadge>)>>,
    mut scene: ResMut<MapScene>,
    controller: Res<DrillController>,
    cameras: Query<&Projection, With<MapCamera>>,
) {
    if !scene.respawn_markers {
        return;
    }
    scene.respawn_markers = false;

    for entity in markers.iter() {
        commands.entity(entity).despawn();
    }

    let world_per_px = match cameras.single() {
        Ok(Projection::Orthographic(ortho)) => ortho.scale,
        _ => 1.0,
    };
    scene.last_camera_scale = world_per_px;

    let region = controller.selected_region().unwrap_or_default().to_string();
    let theme = theme_for(&region);

    match controller.displayed_level() {
        DrillLevel::Globe => {}
        DrillLevel::ContinentMap => {
            for aggregate in controller.country_aggregates() {
                let center = GeoPoint::new(aggregate.lat, aggregate.lng)
                    .to_world(scene.reference, scene.meters_per_unit);
                let radius = marker_radius_px(aggregate.count) * world_per_px;
                let circle = shapes::Circle {
                    radius,
                    center: Vec2::ZERO,
                };
                commands
                    .spawn((
                        ShapeBuilder::with(&circle)
                            .fill(Fill::color(theme.primary.with_alpha(0.85)))
                            .stroke(Stroke::new(Color::WHITE, world_per_px))
                            .build(),
                        Transform::from_xyz(center.x, center.y, 2.0),
                        CountryMarker {
                            code: aggregate.country_code.clone(),
                            name: aggregate.country_name.clone(),
                            center,
                            radius,
                        },
                    ))
                    .with_child((
                        Text2d::new(aggregate.count.to_string()),
                        TextFont {
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        Transform::from_xyz(0.0, 0.0, 0.1).with_scale(Vec3::splat(world_per_px)),
                    ));
            }
        }
        DrillLevel::CountryMap => {
            for aggregate in controller.state_aggregates() {
                let center = GeoPoint::new(aggregate.lat, aggregate.lng)
                    .to_world(scene.reference, scene.meters_per_unit);
                let label = format!("{} {}", aggregate.state_name, aggregate.count);
                let half_extents = Vec2::new(
                    (label.len() as f32 * BADGE_CHAR_PX / 2.0 + 8.0) * world_per_px,
                    BADGE_HEIGHT_PX / 2.0 * world_per_px,
                );
                let rect = shapes::Rectangle {
                    extents: half_extents * 2.0,
                    origin: shapes::RectangleOrigin::Center,
                    ..default()
                };
                commands
                    .spawn((
                        ShapeBuilder::with(&rect)
                            .fill(Fill::color(theme.primary.with_alpha(0.9)))
                            .stroke(Stroke::new(Color::WHITE, world_per_px))
                            .build(),
                        Transform::from_xyz(center.x, center.y, 2.0),
                        StateBadge {
                            state_name: aggregate.state_name.clone(),
                            center,
                            half_extents,
                        },
                    ))
                    .with_child((
                        Text2d::new(label),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        Transform::from_xyz(0.0, 0.0, 0.1).with_scale(Vec3::splat(world_per_px)),
                    ));
            }
        }
    }
}

/// Left-click hit testing against markers. Pan uses the other buttons, so a
/// press here is always a click.
pub fn handle_marker_clicks(
    buttons: Res<ButtonInput<MouseButton>>,
    egui_state: Res<EguiBlockInputState>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    controller: Res<DrillController>,
    country_markers: Query<&CountryMarker>,
    state_badges: Query<&StateBadge>,
    mut country_clicks: EventWriter<CountryMarkerClicked>,
    mut badge_clicks: EventWriter<StateBadgeClicked>,
) {
    if !buttons.just_pressed(MouseButton::Left) || egui_state.block_input {
        return;
    }
    if controller.displayed_level() == DrillLevel::Globe {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Some(world) = window
        .cursor_position()
        .and_then(|pos| camera.viewport_to_world_2d(camera_transform, pos).ok())
    else {
        return;
    };

    match controller.displayed_level() {
        DrillLevel::ContinentMap => {
            for marker in country_markers.iter() {
                if world.distance(marker.center) <= marker.radius {
                    country_clicks.write(CountryMarkerClicked {
                        code: marker.code.clone(),
                        name: marker.name.clone(),
                    });
                    return;
                }
            }
        }
        DrillLevel::CountryMap => {
            for badge in state_badges.iter() {
                let offset = (world - badge.center).abs();
                if offset.x <= badge.half_extents.x && offset.y <= badge.half_extents.y {
                    badge_clicks.write(StateBadgeClicked {
                        state_name: badge.state_name.clone(),
                    });
                    return;
                }
            }
        }
        DrillLevel::Globe => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_radius_is_clamped() {
        assert_eq!(marker_radius_px(0), 32.0);
        assert_eq!(marker_radius_px(1), 32.0);
        assert_eq!(marker_radius_px(100), 50.0);
    }

    #[test]
    fn marker_radius_is_monotonic() {
        let mut last = 0.0;
        for count in 0..60 {
            let radius = marker_radius_px(count);
            assert!(radius >= last, "radius shrank at count {count}");
            last = radius;
        }
    }

    #[test]
    fn mid_range_counts_scale_linearly() {
        assert_eq!(marker_radius_px(5), 34.0);
        assert_eq!(marker_radius_px(10), 44.0);
    }
}
