use crate::boundary::{BoundaryCollection, BoundaryFeature};
use crate::types::GeoPoint;

use super::{
    COUNTRY_OVERRIDES, FALLBACK_SUB_REGION, SUB_REGION_BOXES, SUB_REGION_COUNTRIES, is_sub_divided,
};

/// Maps a boundary feature to its display region. Total and deterministic:
/// every feature resolves to exactly one region.
pub fn region_for_feature(feature: &BoundaryFeature) -> String {
    // 1. Country overrides always win, whatever the continent tag says.
    if let Some(region) = override_for(&feature.country).or_else(|| override_for(&feature.admin)) {
        return region.to_string();
    }

    // 2. Carved-up continents resolve to a sub-region.
    if is_sub_divided(&feature.continent) {
        if let Some(region) = sub_region_by_country(&feature.country)
            .or_else(|| sub_region_by_country(&feature.admin))
        {
            return region.to_string();
        }
        let representative = feature.bounds().center();
        return sub_region_by_coordinate(representative).to_string();
    }

    // 3. Everything else keeps its raw continent tag.
    feature.continent.clone()
}

/// Maps a coordinate to a display region by point-in-polygon against the
/// dataset. `None` means open ocean or unloaded data, never an error.
pub fn region_for_coord(collection: &BoundaryCollection, point: GeoPoint) -> Option<String> {
    for feature in collection.candidates_at(point) {
        if multipolygon_contains(&feature.geometry, point) {
            return Some(region_for_feature(feature));
        }
    }
    None
}

fn override_for(country: &str) -> Option<&'static str> {
    COUNTRY_OVERRIDES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(country))
        .map(|(_, region)| *region)
}

fn sub_region_by_country(country: &str) -> Option<&'static str> {
    SUB_REGION_COUNTRIES.iter().find_map(|(region, countries)| {
        countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country))
            .then_some(*region)
    })
}

/// Rectangle fallback, first match wins.
pub fn sub_region_by_coordinate(point: GeoPoint) -> &'static str {
    SUB_REGION_BOXES
        .iter()
        .find(|(_, bounds)| bounds.contains(point))
        .map(|(region, _)| *region)
        .unwrap_or(FALLBACK_SUB_REGION)
}

/// Even-odd ray-casting test against one ring. Horizontal ray towards +x.
fn ring_contains(ring: &geo::LineString, point: GeoPoint) -> bool {
    let (px, py) = (point.lng, point.lat);
    let coords = &ring.0;
    if coords.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = coords.len() - 1;
    for i in 0..coords.len() {
        let (xi, yi) = (coords[i].x, coords[i].y);
        let (xj, yj) = (coords[j].x, coords[j].y);
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Inside the exterior ring and outside every hole.
pub fn polygon_contains(polygon: &geo::Polygon, point: GeoPoint) -> bool {
    if !ring_contains(polygon.exterior(), point) {
        return false;
    }
    !polygon.interiors().iter().any(|hole| ring_contains(hole, point))
}

/// Any constituent polygon counts.
pub fn multipolygon_contains(multi: &geo::MultiPolygon, point: GeoPoint) -> bool {
    multi.iter().any(|polygon| polygon_contains(polygon, point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryCollection;
    use geo::{LineString, MultiPolygon, Polygon};

    fn feature(continent: &str, country: &str, ring: Vec<(f64, f64)>) -> BoundaryFeature {
        BoundaryFeature {
            continent: continent.into(),
            country: country.into(),
            admin: country.into(),
            iso_a2: String::new(),
            geometry: MultiPolygon::new(vec![Polygon::new(LineString::from(ring), vec![])]),
        }
    }

    fn world() -> BoundaryCollection {
        BoundaryCollection::new(vec![
            // Italy, roughly.
            feature(
                "Europe",
                "Italy",
                vec![(6.0, 36.0), (19.0, 36.0), (19.0, 47.5), (6.0, 47.5), (6.0, 36.0)],
            ),
            // India, roughly.
            feature(
                "Asia",
                "India",
                vec![(68.0, 6.0), (90.0, 6.0), (90.0, 36.0), (68.0, 36.0), (68.0, 6.0)],
            ),
            // Iran, roughly.
            feature(
                "Asia",
                "Iran",
                vec![(44.0, 25.0), (63.0, 25.0), (63.0, 40.0), (44.0, 40.0), (44.0, 25.0)],
            ),
            // A transcontinental country carrying the Europe tag.
            feature(
                "Europe",
                "Russia",
                vec![(30.0, 50.0), (180.0, 50.0), (180.0, 78.0), (30.0, 78.0), (30.0, 50.0)],
            ),
        ])
    }

    #[test]
    fn rome_is_europe() {
        let region = region_for_coord(&world(), GeoPoint::new(41.9, 12.5));
        assert_eq!(region.as_deref(), Some("Europe"));
    }

    #[test]
    fn delhi_is_south_asia() {
        let region = region_for_coord(&world(), GeoPoint::new(28.6, 77.2));
        assert_eq!(region.as_deref(), Some("South Asia"));
    }

    #[test]
    fn tehran_is_middle_east() {
        let region = region_for_coord(&world(), GeoPoint::new(35.7, 51.4));
        assert_eq!(region.as_deref(), Some("Middle East"));
    }

    #[test]
    fn overrides_beat_the_continent_tag() {
        let russia = feature("Europe", "Russia", vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(region_for_feature(&russia), "Russia");
    }

    #[test]
    fn unknown_asian_country_falls_back_to_boxes() {
        let mystery = feature(
            "Asia",
            "Uncharted",
            vec![(100.0, 10.0), (105.0, 10.0), (105.0, 15.0), (100.0, 15.0), (100.0, 10.0)],
        );
        assert_eq!(region_for_feature(&mystery), "Southeast Asia");
    }

    #[test]
    fn classification_is_deterministic_and_total() {
        let world = world();
        for feature in &world.features {
            let first = region_for_feature(feature);
            assert!(!first.is_empty());
            assert_eq!(first, region_for_feature(feature));
        }
        let rome = GeoPoint::new(41.9, 12.5);
        assert_eq!(region_for_coord(&world, rome), region_for_coord(&world, rome));
    }

    #[test]
    fn open_ocean_classifies_to_nothing() {
        assert_eq!(region_for_coord(&world(), GeoPoint::new(-40.0, -30.0)), None);
    }

    #[test]
    fn holes_are_subtracted() {
        let outer = LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let hole = LineString::from(vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)]);
        let polygon = Polygon::new(outer, vec![hole]);
        assert!(polygon_contains(&polygon, GeoPoint::new(2.0, 2.0)));
        assert!(!polygon_contains(&polygon, GeoPoint::new(5.0, 5.0)));
        assert!(!polygon_contains(&polygon, GeoPoint::new(20.0, 20.0)));
    }

    #[test]
    fn every_multipolygon_part_is_tested() {
        let multi = MultiPolygon::new(vec![
            Polygon::new(
                LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]),
                vec![],
            ),
            Polygon::new(
                LineString::from(vec![(10.0, 0.0), (12.0, 0.0), (12.0, 2.0), (10.0, 2.0), (10.0, 0.0)]),
                vec![],
            ),
        ]);
        assert!(multipolygon_contains(&multi, GeoPoint::new(1.0, 11.0)));
        assert!(multipolygon_contains(&multi, GeoPoint::new(1.0, 1.0)));
        assert!(!multipolygon_contains(&multi, GeoPoint::new(1.0, 5.0)));
    }

    #[test]
    fn sub_region_boxes_cover_the_reference_cities() {
        assert_eq!(sub_region_by_coordinate(GeoPoint::new(28.6, 77.2)), "South Asia");
        assert_eq!(sub_region_by_coordinate(GeoPoint::new(35.7, 51.4)), "Middle East");
        assert_eq!(sub_region_by_coordinate(GeoPoint::new(39.9, 116.4)), "East Asia");
        assert_eq!(sub_region_by_coordinate(GeoPoint::new(13.7, 100.5)), "Southeast Asia");
        assert_eq!(sub_region_by_coordinate(GeoPoint::new(43.2, 76.9)), "Central Asia");
    }
}
