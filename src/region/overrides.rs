use crate::types::LatLngBounds;

/// Display regions we can drill into. Continents as the dataset tags them,
/// minus Asia/Oceania which are carved into the sub-regions below, plus the
/// country overrides.
pub const FALLBACK_SUB_REGION: &str = "East Asia";

/// Countries that must not follow their raw continent tag. One authoritative
/// table; every renderer resolves through the classifier, nobody keeps a copy.
/// Overrides always win.
pub const COUNTRY_OVERRIDES: &[(&str, &str)] = &[
    // Transcontinental, rendered as its own clickable unit.
    ("Russia", "Russia"),
    // Geographically split across Europe/Asia, grouped with their cultural
    // neighbourhood for display.
    ("Turkey", "Middle East"),
    ("Cyprus", "Middle East"),
    ("Georgia", "Middle East"),
    ("Armenia", "Middle East"),
    ("Azerbaijan", "Middle East"),
    ("Egypt", "Middle East"),
    // Pacific island groups the dataset files under "Seven seas".
    ("Fiji", "Oceania"),
    ("Papua New Guinea", "Southeast Asia"),
];

/// Country-name lookup for the carved-up continents. Checked before the
/// bounding-box fallback.
pub const SUB_REGION_COUNTRIES: &[(&str, &[&str])] = &[
    (
        "Middle East",
        &[
            "Saudi Arabia",
            "Iran",
            "Iraq",
            "Israel",
            "Jordan",
            "Lebanon",
            "Syria",
            "Yemen",
            "Oman",
            "United Arab Emirates",
            "Qatar",
            "Kuwait",
            "Bahrain",
            "Palestine",
        ],
    ),
    (
        "South Asia",
        &[
            "India",
            "Pakistan",
            "Bangladesh",
            "Sri Lanka",
            "Nepal",
            "Bhutan",
            "Maldives",
            "Afghanistan",
        ],
    ),
    (
        "East Asia",
        &["China", "Japan", "South Korea", "North Korea", "Mongolia", "Taiwan"],
    ),
    (
        "Southeast Asia",
        &[
            "Indonesia",
            "Thailand",
            "Vietnam",
            "Philippines",
            "Malaysia",
            "Singapore",
            "Myanmar",
            "Cambodia",
            "Laos",
            "Brunei",
            "Timor-Leste",
        ],
    ),
    (
        "Central Asia",
        &[
            "Kazakhstan",
            "Uzbekistan",
            "Turkmenistan",
            "Kyrgyzstan",
            "Tajikistan",
        ],
    ),
];

/// Coordinate fallback for Asian features whose country name is missing from
/// the table above. Disjoint rectangles, first match wins.
pub const SUB_REGION_BOXES: &[(&str, LatLngBounds)] = &[
    ("Middle East", LatLngBounds::new(12.0, 25.0, 42.0, 63.0)),
    ("South Asia", LatLngBounds::new(5.0, 63.0, 37.0, 92.0)),
    ("Southeast Asia", LatLngBounds::new(-11.0, 92.0, 24.0, 141.0)),
    ("East Asia", LatLngBounds::new(24.0, 92.0, 54.0, 150.0)),
    ("Central Asia", LatLngBounds::new(37.0, 46.0, 56.0, 92.0)),
];

/// Continents the classifier splits into sub-regions.
pub fn is_sub_divided(continent: &str) -> bool {
    continent.eq_ignore_ascii_case("asia") || continent.eq_ignore_ascii_case("seven seas (open ocean)")
}
