use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::drill::{DrillController, DrillLevel};

use super::{CAMERA_DISTANCE, GLOBE_RADIUS};

#[derive(Component)]
pub struct GlobeCamera;

#[derive(Component)]
pub struct GlobeRoot;

#[derive(Component)]
pub struct RegionOverlay {
    pub region: String,
}

/// Owns every entity and asset handle the globe spawns, so teardown is one
/// dispose call instead of scattered despawns. Leaving anything behind here
/// leaks GPU memory across drill transitions.
#[derive(Resource, Default)]
pub struct GlobeScene {
    root: Option<Entity>,
    camera: Option<Entity>,
    light: Option<Entity>,
    meshes: Vec<Handle<Mesh>>,
    materials: Vec<Handle<StandardMaterial>>,
    /// One shared material per region; hover recolors exactly one of these
    /// instead of touching every feature.
    pub region_materials: HashMap<String, Handle<StandardMaterial>>,
    pub overlay_built: bool,
}

impl GlobeScene {
    pub fn is_mounted(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<Entity> {
        self.root
    }

    pub fn track_mesh(&mut self, handle: Handle<Mesh>) {
        self.meshes.push(handle);
    }

    pub fn track_material(&mut self, handle: Handle<StandardMaterial>) {
        self.materials.push(handle);
    }

    fn dispose(
        &mut self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
    ) {
        for entity in [self.root.take(), self.camera.take(), self.light.take()]
            .into_iter()
            .flatten()
        {
            commands.entity(entity).despawn();
        }
        for handle in self.meshes.drain(..) {
            meshes.remove(&handle);
        }
        for handle in self.materials.drain(..) {
            materials.remove(&handle);
        }
        for (_, handle) in self.region_materials.drain() {
            materials.remove(&handle);
        }
        self.overlay_built = false;
    }
}

/// Mounts the globe while the drill displays it and disposes it afterwards.
pub fn sync_globe_mount(
    mut commands: Commands,
    controller: Res<DrillController>,
    mut scene: ResMut<GlobeScene>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
) {
    let want = controller.displayed_level() == DrillLevel::Globe;
    if want == scene.is_mounted() {
        return;
    }

    if !want {
        scene.dispose(&mut commands, &mut meshes, &mut materials);
        return;
    }

    let sphere_mesh = meshes.add(Sphere::new(GLOBE_RADIUS).mesh().uv(96, 48));
    let sphere_material = materials.add(StandardMaterial {
        base_color_texture: Some(asset_server.load("textures/earth_daymap.png")),
        perceptual_roughness: 0.9,
        ..default()
    });
    scene.track_mesh(sphere_mesh.clone());
    scene.track_material(sphere_material.clone());

    scene.root = Some(
        commands
            .spawn((
                Mesh3d(sphere_mesh),
                MeshMaterial3d(sphere_material),
                Transform::default(),
                GlobeRoot,
            ))
            .id(),
    );
    scene.camera = Some(
        commands
            .spawn((
                Camera3d::default(),
                Camera {
                    order: 0,
                    ..default()
                },
                Transform::from_xyz(0.0, 0.0, CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
                GlobeCamera,
            ))
            .id(),
    );
    scene.light = Some(
        commands
            .spawn((
                DirectionalLight {
                    illuminance: 9000.0,
                    ..default()
                },
                Transform::from_xyz(3.0, 2.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
            ))
            .id(),
    );
    info!("globe mounted");
}
