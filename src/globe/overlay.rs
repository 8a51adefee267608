use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;

use crate::boundary::BoundaryStore;
use crate::region::{region_for_feature, theme_for};
use crate::types::GeoPoint;

use super::{GLOBE_RADIUS, GlobeScene, HoverState, RegionOverlay, geo_to_local};

/// Overlay rings float just off the surface so they never z-fight the sphere.
const OVERLAY_LIFT: f32 = 1.004;

/// Drapes the boundary dataset over the mounted globe as per-feature line
/// rings sharing one material per region. Fills stay transparent; hover only
/// recolors the hovered region's shared material.
pub fn build_region_overlay(
    mut commands: Commands,
    store: Res<BoundaryStore>,
    mut scene: ResMut<GlobeScene>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if scene.overlay_built || !scene.is_mounted() {
        return;
    }
    let Some(root) = scene.root() else {
        return;
    };
    let Some(collection) = store.collection() else {
        // Still loading, or failed: the globe runs without classification.
        return;
    };

    let mut spawned = 0usize;
    for feature in &collection.features {
        let region = region_for_feature(feature);
        let material = scene
            .region_materials
            .entry(region.clone())
            .or_insert_with(|| {
                let theme = theme_for(&region);
                materials.add(StandardMaterial {
                    base_color: theme.secondary.into(),
                    unlit: true,
                    alpha_mode: AlphaMode::Blend,
                    ..default()
                })
            })
            .clone();

        for polygon in &feature.geometry {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                let Some(mesh) = ring_mesh(ring) else {
                    continue;
                };
                let handle = meshes.add(mesh);
                scene.track_mesh(handle.clone());
                commands.spawn((
                    Mesh3d(handle),
                    MeshMaterial3d(material.clone()),
                    Transform::default(),
                    RegionOverlay {
                        region: region.clone(),
                    },
                    ChildOf(root),
                ));
                spawned += 1;
            }
        }
    }

    scene.overlay_built = true;
    info!("region overlay built: {spawned} rings");
}

fn ring_mesh(ring: &geo::LineString) -> Option<Mesh> {
    if ring.0.len() < 2 {
        return None;
    }
    let positions: Vec<[f32; 3]> = ring
        .0
        .iter()
        .map(|coord| {
            let local = geo_to_local(
                GeoPoint::new(coord.y, coord.x),
                GLOBE_RADIUS * OVERLAY_LIFT,
            );
            [local.x, local.y, local.z]
        })
        .collect();
    let mut mesh = Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    Some(mesh)
}

/// Restyles exactly one shared material on hover change, never the whole
/// feature set.
pub fn update_hover_highlight(
    hover: Res<HoverState>,
    scene: Res<GlobeScene>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !hover.is_changed() {
        return;
    }
    for (region, handle) in scene.region_materials.iter() {
        let Some(material) = materials.get_mut(handle) else {
            continue;
        };
        let theme = theme_for(region);
        let hovered = matches!(&*hover, HoverState::Region(name) if name == region);
        material.base_color = if hovered {
            theme.highlight.into()
        } else {
            theme.secondary.into()
        };
    }
}
