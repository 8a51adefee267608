use std::{fs::File, io::BufReader, path::Path};

use geojson::GeoJson;

use super::{BoundaryCollection, BoundaryFeature};

/// Reads the world boundary dataset from disk and builds the indexed
/// collection. Called once, off the main thread.
pub fn load_boundaries(path: &Path) -> Result<BoundaryCollection, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let geojson = GeoJson::from_reader(reader)?;
    parse_boundaries(geojson)
}

pub fn parse_boundaries(
    geojson: GeoJson,
) -> Result<BoundaryCollection, Box<dyn std::error::Error>> {
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err("boundary dataset is not a FeatureCollection".into());
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            continue;
        };
        let multi = match geometry.value {
            geojson::Value::Polygon(rings) => geo::MultiPolygon::new(vec![polygon_from_rings(rings)]),
            geojson::Value::MultiPolygon(polygons) => geo::MultiPolygon::new(
                polygons.into_iter().map(polygon_from_rings).collect(),
            ),
            // Lines and points carry no area, nothing to classify against.
            _ => continue,
        };

        let properties = feature.properties.unwrap_or_default();
        features.push(BoundaryFeature {
            continent: property(&properties, &["continent", "CONTINENT"]),
            country: property(&properties, &["country", "SOVEREIGNT", "ADMIN"]),
            admin: property(&properties, &["admin", "ADMIN", "name", "NAME"]),
            iso_a2: property(&properties, &["iso_a2", "ISO_A2"]),
            geometry: multi,
        });
    }

    Ok(BoundaryCollection::new(features))
}

fn polygon_from_rings(rings: Vec<Vec<Vec<f64>>>) -> geo::Polygon {
    let mut rings = rings.into_iter().map(|ring| {
        geo::LineString(
            ring.into_iter()
                .map(|p| geo::Coord { x: p[0], y: p[1] })
                .collect(),
        )
    });
    let exterior = rings.next().unwrap_or_else(|| geo::LineString(vec![]));
    geo::Polygon::new(exterior, rings.collect())
}

/// Datasets disagree on property casing, so try a few known spellings.
fn property(properties: &geojson::JsonObject, keys: &[&str]) -> String {
    for key in keys {
        if let Some(value) = properties.get(*key).and_then(|v| v.as_str()) {
            if !value.is_empty() && value != "-99" {
                return value.to_string();
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"CONTINENT": "Europe", "ADMIN": "Italy", "ISO_A2": "IT"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[6.0, 36.0], [19.0, 36.0], [19.0, 47.5], [6.0, 47.5], [6.0, 36.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"CONTINENT": "Oceania", "ADMIN": "Fiji", "ISO_A2": "FJ"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[177.0, -19.0], [179.0, -19.0], [179.0, -16.0], [177.0, -16.0], [177.0, -19.0]]],
                        [[[-180.0, -19.0], [-179.0, -19.0], [-179.0, -16.0], [-180.0, -16.0], [-180.0, -19.0]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {"CONTINENT": "Nowhere"},
                "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}
            }
        ]
    }"#;

    #[test]
    fn parses_polygons_and_multipolygons_only() {
        let geojson: GeoJson = SAMPLE.parse().unwrap();
        let collection = parse_boundaries(geojson).unwrap();
        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.features[0].country, "Italy");
        assert_eq!(collection.features[0].iso_a2, "IT");
        assert_eq!(collection.features[1].geometry.0.len(), 2);
    }

    #[test]
    fn missing_properties_become_empty_strings() {
        let geojson: GeoJson = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"ISO_A2": "-99"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                }
            }]
        }"#
        .parse()
        .unwrap();
        let collection = parse_boundaries(geojson).unwrap();
        assert_eq!(collection.features[0].iso_a2, "");
        assert_eq!(collection.features[0].continent, "");
    }

    #[test]
    fn rejects_bare_geometry_documents() {
        let geojson: GeoJson = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#.parse().unwrap();
        assert!(parse_boundaries(geojson).is_err());
    }
}
