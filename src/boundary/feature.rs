use geo::BoundingRect;
use rstar::{AABB, RTree, RTreeObject};

use crate::types::{GeoPoint, LatLngBounds};

/// One administrative boundary from the world dataset. Loaded once, never
/// mutated; everything downstream borrows or clones.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryFeature {
    /// Raw continent tag as the dataset ships it, e.g. "Asia".
    pub continent: String,
    pub country: String,
    /// Admin name; usually equal to country for admin-0 datasets.
    pub admin: String,
    pub iso_a2: String,
    pub geometry: geo::MultiPolygon,
}

impl BoundaryFeature {
    /// Lat/lng bounds of the whole multipolygon, for viewport fitting.
    pub fn bounds(&self) -> LatLngBounds {
        let mut bounds = LatLngBounds::empty();
        for polygon in &self.geometry {
            for coord in polygon.exterior() {
                // Geometry is stored x=lng, y=lat.
                bounds.extend(GeoPoint::new(coord.y, coord.x));
            }
        }
        bounds
    }
}

/// Arena-style handle into `BoundaryCollection::features`, so the R-tree never
/// holds a second copy of the geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureHandle {
    pub index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for FeatureHandle {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// The parsed dataset plus its spatial index. Shared read-only behind an `Arc`
/// by both renderers and the classifier.
#[derive(Debug, Default)]
pub struct BoundaryCollection {
    pub features: Vec<BoundaryFeature>,
    index: RTree<FeatureHandle>,
}

impl BoundaryCollection {
    pub fn new(features: Vec<BoundaryFeature>) -> Self {
        let handles = features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let bbox = feature.geometry.bounding_rect()?;
                Some(FeatureHandle {
                    index,
                    envelope: AABB::from_corners(
                        [bbox.min().x, bbox.min().y],
                        [bbox.max().x, bbox.max().y],
                    ),
                })
            })
            .collect::<Vec<_>>();
        Self {
            features,
            index: RTree::bulk_load(handles),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features whose bounding box contains the point, in index order. The
    /// caller still has to run the exact point-in-polygon test.
    pub fn candidates_at(&self, point: GeoPoint) -> impl Iterator<Item = &BoundaryFeature> {
        self.index
            .locate_in_envelope_intersecting(&AABB::from_point([point.lng, point.lat]))
            .map(|handle| &self.features[handle.index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, MultiPolygon, Polygon};

    fn square(country: &str, west: f64, south: f64, size: f64) -> BoundaryFeature {
        let ring = LineString::from(vec![
            (west, south),
            (west + size, south),
            (west + size, south + size),
            (west, south + size),
            (west, south),
        ]);
        BoundaryFeature {
            continent: "Testland".into(),
            country: country.into(),
            admin: country.into(),
            iso_a2: "XX".into(),
            geometry: MultiPolygon::new(vec![Polygon::new(ring, vec![])]),
        }
    }

    #[test]
    fn candidates_are_filtered_by_envelope() {
        let collection = BoundaryCollection::new(vec![
            square("A", 0.0, 0.0, 10.0),
            square("B", 100.0, 0.0, 10.0),
        ]);
        let hits: Vec<_> = collection
            .candidates_at(GeoPoint::new(5.0, 5.0))
            .map(|f| f.country.as_str())
            .collect();
        assert_eq!(hits, vec!["A"]);
    }

    #[test]
    fn feature_bounds_cover_all_polygons() {
        let mut feature = square("A", 0.0, 0.0, 10.0);
        feature
            .geometry
            .0
            .push(square("A", 20.0, 20.0, 5.0).geometry.0[0].clone());
        let bounds = feature.bounds();
        assert_eq!(bounds.west, 0.0);
        assert_eq!(bounds.east, 25.0);
        assert_eq!(bounds.north, 25.0);
    }
}
