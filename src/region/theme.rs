use bevy::color::Srgba;

/// Fill/stroke/highlight colors for one display region. Static configuration;
/// renderers look colors up here instead of keeping their own tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionTheme {
    pub primary: Srgba,
    pub secondary: Srgba,
    pub highlight: Srgba,
}

const fn theme(primary: Srgba) -> RegionTheme {
    RegionTheme {
        primary,
        secondary: Srgba::new(primary.red, primary.green, primary.blue, 0.35),
        highlight: Srgba::new(
            primary.red * 0.6 + 0.4,
            primary.green * 0.6 + 0.4,
            primary.blue * 0.6 + 0.4,
            0.85,
        ),
    }
}

const DEFAULT_THEME: RegionTheme = theme(Srgba::new(0.55, 0.55, 0.55, 1.0));

const THEMES: &[(&str, RegionTheme)] = &[
    ("Europe", theme(Srgba::new(0.26, 0.47, 0.74, 1.0))),
    ("Africa", theme(Srgba::new(0.85, 0.56, 0.19, 1.0))),
    ("North America", theme(Srgba::new(0.33, 0.62, 0.36, 1.0))),
    ("South America", theme(Srgba::new(0.76, 0.33, 0.33, 1.0))),
    ("Oceania", theme(Srgba::new(0.24, 0.63, 0.67, 1.0))),
    ("Antarctica", theme(Srgba::new(0.72, 0.76, 0.82, 1.0))),
    ("Russia", theme(Srgba::new(0.52, 0.39, 0.64, 1.0))),
    ("Middle East", theme(Srgba::new(0.78, 0.66, 0.25, 1.0))),
    ("South Asia", theme(Srgba::new(0.82, 0.45, 0.22, 1.0))),
    ("East Asia", theme(Srgba::new(0.69, 0.29, 0.42, 1.0))),
    ("Southeast Asia", theme(Srgba::new(0.29, 0.58, 0.48, 1.0))),
    ("Central Asia", theme(Srgba::new(0.47, 0.53, 0.29, 1.0))),
];

pub fn theme_for(region: &str) -> RegionTheme {
    THEMES
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, theme)| *theme)
        .unwrap_or(DEFAULT_THEME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_regions_have_distinct_primaries() {
        let europe = theme_for("Europe");
        let africa = theme_for("Africa");
        assert_ne!(europe.primary, africa.primary);
    }

    #[test]
    fn unknown_regions_get_the_default() {
        assert_eq!(theme_for("Atlantis"), DEFAULT_THEME);
        assert_eq!(theme_for(""), DEFAULT_THEME);
    }

    #[test]
    fn highlight_is_brighter_than_primary() {
        let t = theme_for("Europe");
        assert!(t.highlight.red >= t.primary.red);
        assert!(t.highlight.green >= t.primary.green);
        assert!(t.highlight.blue >= t.primary.blue);
    }
}
