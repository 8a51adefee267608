use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_prototype_lyon::prelude::tess::{FillOptions, FillRule};
use bevy_prototype_lyon::prelude::{Fill, Shape, ShapeBuilder, ShapeBuilderBase, Stroke, shapes};

use crate::boundary::BoundaryStore;
use crate::drill::{DrillController, DrillLevel};
use crate::region::{multipolygon_contains, region_for_feature, theme_for};
use crate::types::{GeoPoint, world_to_geo};

use super::{MapCamera, MapScene};

#[derive(Component)]
pub struct MapShape {
    pub country: String,
    pub iso_a2: String,
}

const SHAPE_STROKE_WIDTH: f32 = 0.6;

/// Exterior and hole rings of one polygon projected into map world space.
/// The exterior comes first; rings that collapse below a triangle are dropped.
fn polygon_rings(polygon: &geo::Polygon, scene: &MapScene) -> Vec<shapes::Polygon> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .filter_map(|ring| {
            let points: Vec<Vec2> = ring
                .0
                .iter()
                .map(|coord| {
                    GeoPoint::new(coord.y, coord.x)
                        .to_world(scene.reference, scene.meters_per_unit)
                })
                .collect();
            (points.len() >= 3).then(|| shapes::Polygon {
                points,
                closed: true,
            })
        })
        .collect()
}

/// Rebuilds the boundary layer. Only features classified into the active
/// region are spawned at all; everything else is absent from the scene.
pub fn respawn_map_shapes(
    mut commands: Commands,
    shapes_query: Query<Entity, With<MapShape>>,
    mut scene: ResMut<MapScene>,
    controller: Res<DrillController>,
    store: Res<BoundaryStore>,
) {
    if !scene.respawn_shapes {
        return;
    }
    scene.respawn_shapes = false;

    for entity in shapes_query.iter() {
        commands.entity(entity).despawn();
    }

    if controller.displayed_level() == DrillLevel::Globe {
        return;
    }
    let Some(active_region) = controller.selected_region() else {
        return;
    };
    let Some(collection) = store.collection() else {
        return;
    };

    let selected_code = controller.selected_country().map(|c| c.code.clone());
    let mut batch: Vec<(Shape, Transform, MapShape)> = Vec::new();

    for feature in &collection.features {
        let region = region_for_feature(feature);
        if region != active_region {
            continue;
        }
        let theme = theme_for(&region);
        let is_selected = selected_code
            .as_deref()
            .is_some_and(|code| feature.iso_a2.eq_ignore_ascii_case(code));
        let fill_color = if is_selected {
            theme.highlight
        } else {
            theme.secondary
        };

        for polygon in &feature.geometry {
            let rings = polygon_rings(polygon, &scene);
            let Some((exterior, holes)) = rings.split_first() else {
                continue;
            };
            let mut builder = ShapeBuilder::with(exterior);
            for hole in holes {
                builder = builder.add(hole);
            }
            // Even-odd so hole rings cut out of the exterior regardless of
            // the winding the dataset ships.
            let shape = builder
                .fill(Fill {
                    color: fill_color.into(),
                    options: FillOptions::default().with_fill_rule(FillRule::EvenOdd),
                })
                .stroke(Stroke::new(theme.primary, SHAPE_STROKE_WIDTH))
                .build();
            batch.push((
                shape,
                Transform::from_xyz(0.0, 0.0, 1.0),
                MapShape {
                    country: feature.country.clone(),
                    iso_a2: feature.iso_a2.clone(),
                },
            ));
        }
    }

    debug!("map layer rebuilt: {} shapes for {active_region}", batch.len());
    commands.spawn_batch(batch);
}

/// Restyles only the polygon(s) under the cursor. The rest of the layer keeps
/// the colors it was spawned with.
pub fn hover_map_polygons(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    controller: Res<DrillController>,
    store: Res<BoundaryStore>,
    scene: Res<MapScene>,
    mut shapes_query: Query<(&MapShape, &mut Shape)>,
) {
    if controller.displayed_level() == DrillLevel::Globe {
        return;
    }
    let Some(active_region) = controller.selected_region() else {
        return;
    };
    let Some(collection) = store.collection() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };

    let hovered_country = window
        .cursor_position()
        .and_then(|pos| camera.viewport_to_world_2d(camera_transform, pos).ok())
        .map(|world| world_to_geo(world, scene.reference, scene.meters_per_unit))
        .and_then(|point| {
            collection.candidates_at(point).find(|feature| {
                region_for_feature(feature) == active_region
                    && multipolygon_contains(&feature.geometry, point)
            })
        })
        .map(|feature| feature.country.clone());

    let theme = theme_for(active_region);
    let selected_code = controller.selected_country().map(|c| c.code.clone());
    for (map_shape, mut shape) in &mut shapes_query {
        let is_selected = selected_code
            .as_deref()
            .is_some_and(|code| map_shape.iso_a2.eq_ignore_ascii_case(code));
        let is_hovered = hovered_country
            .as_deref()
            .is_some_and(|country| map_shape.country == country);
        let target: Color = if is_selected || is_hovered {
            theme.highlight.into()
        } else {
            theme.secondary.into()
        };
        // Writing through the Mut retessellates the shape, so only touch the
        // ones whose color actually changes.
        if shape.fill.as_ref().map(|f| f.color) != Some(target) {
            if let Some(fill) = shape.fill.as_mut() {
                fill.color = target;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hole_rings_survive_projection() {
        let outer = geo::LineString::from(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        let hole = geo::LineString::from(vec![
            (4.0, 4.0),
            (6.0, 4.0),
            (6.0, 6.0),
            (4.0, 6.0),
            (4.0, 4.0),
        ]);
        let polygon = geo::Polygon::new(outer, vec![hole]);
        let rings = polygon_rings(&polygon, &MapScene::default());
        assert_eq!(rings.len(), 2);
        assert!(rings.iter().all(|ring| ring.closed));
    }

    #[test]
    fn degenerate_rings_are_dropped() {
        let outer = geo::LineString::from(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 0.0),
        ]);
        let empty = geo::LineString::new(vec![]);
        let polygon = geo::Polygon::new(outer, vec![empty]);
        let rings = polygon_rings(&polygon, &MapScene::default());
        assert_eq!(rings.len(), 1);
    }
}
