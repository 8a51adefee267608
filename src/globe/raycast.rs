use bevy::prelude::*;

use crate::types::GeoPoint;

pub const GLOBE_RADIUS: f32 = 2.0;
pub const CAMERA_DISTANCE: f32 = 6.0;

/// Sphere-local position for a coordinate. The inverse of `local_to_geo`; the
/// overlay drape and the raycast both go through this pair so classification
/// stays consistent with what is drawn.
pub fn geo_to_local(point: GeoPoint, radius: f32) -> Vec3 {
    let lat = point.lat.to_radians() as f32;
    let lng = point.lng.to_radians() as f32;
    Vec3::new(
        radius * lat.cos() * lng.sin(),
        radius * lat.sin(),
        radius * lat.cos() * lng.cos(),
    )
}

pub fn local_to_geo(local: Vec3, radius: f32) -> GeoPoint {
    let lat = (local.y / radius).clamp(-1.0, 1.0).asin().to_degrees();
    let lng = local.x.atan2(local.z).to_degrees();
    GeoPoint::new(lat as f64, lng as f64)
}

/// Analytic ray/sphere intersection for a sphere centered at the origin.
/// Returns the nearest positive hit distance.
pub fn ray_sphere_intersect(origin: Vec3, dir: Vec3, radius: f32) -> Option<f32> {
    let b = origin.dot(dir);
    let c = origin.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let mut t = -b - sqrt_disc;
    if t <= 0.0 {
        t = -b + sqrt_disc;
    }
    (t > 0.0).then_some(t)
}

/// Cursor position → globe-surface coordinate, or `None` on a miss. A miss is
/// "no region", never an error.
pub fn cursor_to_geo(
    camera: &Camera,
    camera_transform: &GlobalTransform,
    globe_transform: &Transform,
    cursor: Vec2,
) -> Option<GeoPoint> {
    let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
    let origin = ray.origin - globe_transform.translation;
    let radius = GLOBE_RADIUS * globe_transform.scale.x;
    let t = ray_sphere_intersect(origin, *ray.direction, radius)?;
    let hit = origin + *ray.direction * t;
    // Undo the globe's rotation so the hit lands in texture space.
    let local = globe_transform.rotation.inverse() * hit;
    Some(local_to_geo(local / globe_transform.scale.x, GLOBE_RADIUS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_round_trips_through_local_space() {
        for (lat, lng) in [(0.0, 0.0), (41.9, 12.5), (-33.9, 151.2), (64.1, -21.9)] {
            let local = geo_to_local(GeoPoint::new(lat, lng), GLOBE_RADIUS);
            let back = local_to_geo(local, GLOBE_RADIUS);
            assert!((back.lat - lat).abs() < 1e-3, "lat {lat} -> {}", back.lat);
            assert!((back.lng - lng).abs() < 1e-3, "lng {lng} -> {}", back.lng);
        }
    }

    #[test]
    fn ray_through_center_hits_the_near_side() {
        let origin = Vec3::new(0.0, 0.0, CAMERA_DISTANCE);
        let dir = Vec3::NEG_Z;
        let t = ray_sphere_intersect(origin, dir, GLOBE_RADIUS).unwrap();
        assert!((t - (CAMERA_DISTANCE - GLOBE_RADIUS)).abs() < 1e-5);
    }

    #[test]
    fn grazing_ray_misses() {
        let origin = Vec3::new(GLOBE_RADIUS * 2.0, 0.0, CAMERA_DISTANCE);
        assert_eq!(ray_sphere_intersect(origin, Vec3::NEG_Z, GLOBE_RADIUS), None);
    }

    #[test]
    fn ray_from_inside_exits_forward() {
        let t = ray_sphere_intersect(Vec3::ZERO, Vec3::X, GLOBE_RADIUS).unwrap();
        assert!((t - GLOBE_RADIUS).abs() < 1e-5);
    }
}
