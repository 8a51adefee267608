use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Half the circumference of the web-mercator world in meters.
const MERCATOR_HALF_WORLD: f64 = 20037508.34;

/// A geographic coordinate in degrees. Latitude first, like every API we talk to.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    #[serde(rename = "lng")]
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn to_mercator(&self) -> Vec2 {
        let x = self.lng * MERCATOR_HALF_WORLD / 180.0;
        let y = (self.lat.to_radians().tan() + 1.0 / self.lat.to_radians().cos()).ln()
            * MERCATOR_HALF_WORLD
            / std::f64::consts::PI;
        Vec2::new(x as f32, y as f32)
    }

    /// Projects into the 2D map's world space: mercator meters relative to a
    /// reference point, scaled down so a continent fits comfortably on screen.
    pub fn to_world(&self, reference: GeoPoint, meters_per_unit: f64) -> Vec2 {
        let refr = reference.to_mercator();
        let here = self.to_mercator();
        Vec2::new(
            ((here.x - refr.x) as f64 / meters_per_unit) as f32,
            ((here.y - refr.y) as f64 / meters_per_unit) as f32,
        )
    }

    pub fn normalized(&self) -> Self {
        Self::new(self.lat.clamp(-89.9, 89.9), normalize_longitude(self.lng))
    }
}

impl Add for GeoPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        GeoPoint::new(self.lat + rhs.lat, self.lng + rhs.lng)
    }
}

impl Sub for GeoPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        GeoPoint::new(self.lat - rhs.lat, self.lng - rhs.lng)
    }
}

/// Inverse of `GeoPoint::to_world`, for reading the current viewport back
/// into geographic bounds.
pub fn world_to_geo(world: Vec2, reference: GeoPoint, meters_per_unit: f64) -> GeoPoint {
    let refr = reference.to_mercator();
    let x = refr.x as f64 + world.x as f64 * meters_per_unit;
    let y = refr.y as f64 + world.y as f64 * meters_per_unit;
    let lng = x / MERCATOR_HALF_WORLD * 180.0;
    let lat = (y / MERCATOR_HALF_WORLD * 180.0).to_radians();
    let lat = (2.0 * lat.exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    GeoPoint::new(lat, normalize_longitude(lng))
}

pub fn normalize_longitude(lng: f64) -> f64 {
    let mut lng = lng;
    while lng > 180.0 {
        lng -= 360.0;
    }
    while lng < -180.0 {
        lng += 360.0;
    }
    lng
}

/// An axis-aligned lat/lng rectangle, used for viewport fitting and the
/// classifier's sub-region fallback boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// An empty bounds that any union call will replace.
    pub fn empty() -> Self {
        Self::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY)
    }

    pub fn is_empty(&self) -> bool {
        self.south > self.north || self.west > self.east
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
        self.west = self.west.min(point.lng);
        self.east = self.east.max(point.lng);
    }

    pub fn union(&mut self, other: &LatLngBounds) {
        if other.is_empty() {
            return;
        }
        self.south = self.south.min(other.south);
        self.north = self.north.max(other.north);
        self.west = self.west.min(other.west);
        self.east = self.east.max(other.east);
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn padded(&self, degrees: f64) -> Self {
        Self::new(
            (self.south - degrees).max(-90.0),
            self.west - degrees,
            (self.north + degrees).min(90.0),
            self.east + degrees,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_projection_round_trips() {
        let reference = GeoPoint::new(48.0, 11.0);
        for point in [GeoPoint::new(41.9, 12.5), GeoPoint::new(52.2, 0.1)] {
            let world = point.to_world(reference, 50_000.0);
            let back = world_to_geo(world, reference, 50_000.0);
            assert!((back.lat - point.lat).abs() < 0.01, "{back:?}");
            assert!((back.lng - point.lng).abs() < 0.01, "{back:?}");
        }
    }

    #[test]
    fn longitude_wraps_into_range() {
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-200.0), 160.0);
        assert_eq!(normalize_longitude(45.0), 45.0);
    }

    #[test]
    fn bounds_extend_and_center() {
        let mut bounds = LatLngBounds::empty();
        assert!(bounds.is_empty());
        bounds.extend(GeoPoint::new(10.0, 20.0));
        bounds.extend(GeoPoint::new(-10.0, 40.0));
        assert!(!bounds.is_empty());
        assert_eq!(bounds.center(), GeoPoint::new(0.0, 30.0));
        assert!(bounds.contains(GeoPoint::new(5.0, 30.0)));
        assert!(!bounds.contains(GeoPoint::new(15.0, 30.0)));
    }

    #[test]
    fn padding_clamps_latitude() {
        let bounds = LatLngBounds::new(-89.0, -10.0, 89.0, 10.0).padded(5.0);
        assert_eq!(bounds.south, -90.0);
        assert_eq!(bounds.north, 90.0);
        assert_eq!(bounds.west, -15.0);
    }
}
