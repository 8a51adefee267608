use bevy::prelude::*;

use crate::aggregates::{AggregatePayload, AggregateResult};
use crate::types::{CountryAggregate, LatLngBounds, StateAggregate};

/// Navigation depth. Transitions move one level at a time, in both directions;
/// nothing is skippable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrillLevel {
    #[default]
    Globe,
    ContinentMap,
    CountryMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRef {
    pub code: String,
    pub name: String,
}

/// Interaction tunables. The fade and cooldown numbers are empirically
/// chosen, so they live in configuration, not contracts.
#[derive(Resource, Clone, Copy)]
pub struct DrillConfig {
    pub fade_seconds: f32,
    pub cooldown_seconds: f32,
    pub click_threshold_px: f32,
    pub rotation_smoothing: f32,
    pub viewport_padding_deg: f64,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            fade_seconds: 0.3,
            cooldown_seconds: 0.25,
            click_threshold_px: 4.0,
            rotation_smoothing: 8.0,
            viewport_padding_deg: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrillCommand {
    EnterRegion { region: String },
    EnterCountry { code: String, name: String },
    Back,
}

/// What a granted transition asks the caller to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    EnteredRegion { region: String, generation: u64 },
    EnteredCountry { code: String, name: String, generation: u64 },
    /// `refetch` is set when the retained continent aggregates were evicted
    /// and the caller has to re-issue the by-region fetch.
    BackToContinent { refetch: bool, generation: u64 },
    BackToGlobe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    /// A cross-fade or cooldown is running; the request is dropped, not queued.
    Busy,
    /// The requested level is not adjacent to the current one.
    NotAdjacent,
}

struct Fade {
    elapsed: f32,
    duration: f32,
}

/// Owns the drill state. Renderers never mutate it; they raise events and this
/// controller applies them through `request`.
#[derive(Resource, Default)]
pub struct DrillController {
    level: DrillLevel,
    /// Which renderer the user currently sees. Trails `level` by half a fade.
    displayed_level: DrillLevel,
    selected_region: Option<String>,
    selected_country: Option<CountryRef>,
    generation: u64,
    /// Continent viewport bounds cached on descent, restored verbatim on back.
    cached_continent_bounds: Option<LatLngBounds>,
    country_aggregates: Vec<CountryAggregate>,
    state_aggregates: Vec<StateAggregate>,
    fade: Option<Fade>,
    cooldown_remaining: f32,
    pub markers_dirty: bool,
}

impl DrillController {
    pub fn level(&self) -> DrillLevel {
        self.level
    }

    pub fn displayed_level(&self) -> DrillLevel {
        self.displayed_level
    }

    pub fn selected_region(&self) -> Option<&str> {
        self.selected_region.as_deref()
    }

    pub fn selected_country(&self) -> Option<&CountryRef> {
        self.selected_country.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn country_aggregates(&self) -> &[CountryAggregate] {
        &self.country_aggregates
    }

    pub fn state_aggregates(&self) -> &[StateAggregate] {
        &self.state_aggregates
    }

    pub fn cached_continent_bounds(&self) -> Option<LatLngBounds> {
        self.cached_continent_bounds
    }

    pub fn set_continent_bounds(&mut self, bounds: LatLngBounds) {
        self.cached_continent_bounds = Some(bounds);
    }

    /// One transition in flight at a time. Requests landing during a fade or
    /// the post-transition cooldown are ignored.
    pub fn is_busy(&self) -> bool {
        self.fade.is_some() || self.cooldown_remaining > 0.0
    }

    /// Cross-fade curtain opacity, 0 → 1 → 0 over the fade duration.
    pub fn fade_alpha(&self) -> f32 {
        match &self.fade {
            Some(fade) if fade.duration > 0.0 => {
                let progress = (fade.elapsed / fade.duration).clamp(0.0, 1.0);
                (progress * std::f32::consts::PI).sin()
            }
            _ => 0.0,
        }
    }

    pub fn request(&mut self, command: DrillCommand, config: &DrillConfig) -> Result<Applied, Denied> {
        if self.is_busy() {
            return Err(Denied::Busy);
        }

        let applied = match (self.level, command) {
            (DrillLevel::Globe, DrillCommand::EnterRegion { region }) => {
                self.level = DrillLevel::ContinentMap;
                self.selected_region = Some(region.clone());
                self.generation += 1;
                self.country_aggregates.clear();
                self.markers_dirty = true;
                Applied::EnteredRegion {
                    region,
                    generation: self.generation,
                }
            }
            (DrillLevel::ContinentMap, DrillCommand::EnterCountry { code, name }) => {
                self.level = DrillLevel::CountryMap;
                self.selected_country = Some(CountryRef {
                    code: code.clone(),
                    name: name.clone(),
                });
                self.generation += 1;
                self.state_aggregates.clear();
                self.markers_dirty = true;
                Applied::EnteredCountry {
                    code,
                    name,
                    generation: self.generation,
                }
            }
            (DrillLevel::CountryMap, DrillCommand::Back) => {
                self.level = DrillLevel::ContinentMap;
                self.selected_country = None;
                self.state_aggregates.clear();
                self.generation += 1;
                self.markers_dirty = true;
                Applied::BackToContinent {
                    refetch: self.country_aggregates.is_empty(),
                    generation: self.generation,
                }
            }
            (DrillLevel::ContinentMap, DrillCommand::Back) => {
                self.reset_to_globe();
                Applied::BackToGlobe
            }
            _ => return Err(Denied::NotAdjacent),
        };

        self.fade = Some(Fade {
            elapsed: 0.0,
            duration: config.fade_seconds.max(0.0),
        });
        Ok(applied)
    }

    /// Applies a fetched payload iff its generation still matches. Returns
    /// whether the payload was accepted.
    pub fn apply_result(&mut self, result: AggregateResult) -> bool {
        if result.generation != self.generation {
            debug!(
                "dropping stale aggregate result (generation {} != {})",
                result.generation, self.generation
            );
            return false;
        }
        match result.payload {
            AggregatePayload::Countries(countries) => {
                if self.level == DrillLevel::Globe {
                    return false;
                }
                self.country_aggregates = countries;
            }
            AggregatePayload::States(states) => {
                if self.level != DrillLevel::CountryMap {
                    return false;
                }
                self.warn_on_count_mismatch(&states);
                self.state_aggregates = states;
            }
        }
        self.markers_dirty = true;
        true
    }

    /// Advances fade and cooldown. The displayed renderer switches at the fade
    /// midpoint, behind the opaque part of the curtain.
    pub fn tick(&mut self, dt: f32, config: &DrillConfig) {
        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
        }
        let Some(fade) = &mut self.fade else {
            return;
        };
        fade.elapsed += dt;
        let (elapsed, duration) = (fade.elapsed, fade.duration);
        if elapsed >= duration / 2.0 {
            self.displayed_level = self.level;
        }
        if elapsed >= duration {
            self.fade = None;
            self.cooldown_remaining = config.cooldown_seconds.max(0.0);
        }
    }

    fn reset_to_globe(&mut self) {
        self.level = DrillLevel::Globe;
        self.selected_region = None;
        self.selected_country = None;
        self.cached_continent_bounds = None;
        self.country_aggregates.clear();
        self.state_aggregates.clear();
        self.generation += 1;
        self.markers_dirty = false;
    }

    /// Backing data should conserve counts across levels; a mismatch means the
    /// collaborator served inconsistent aggregates.
    fn warn_on_count_mismatch(&self, states: &[StateAggregate]) {
        let Some(country) = &self.selected_country else {
            return;
        };
        let Some(aggregate) = self
            .country_aggregates
            .iter()
            .find(|c| c.country_code == country.code)
        else {
            return;
        };
        let total: u32 = states.iter().map(|s| s.count).sum();
        if !states.is_empty() && total != aggregate.count {
            warn!(
                "count mismatch for {}: continent level says {}, states sum to {}",
                country.code, aggregate.count, total
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DrillConfig {
        DrillConfig::default()
    }

    fn settle(controller: &mut DrillController, config: &DrillConfig) {
        // Run out the fade and the cooldown.
        for _ in 0..120 {
            controller.tick(0.016, config);
        }
    }

    fn enter_italy_region(controller: &mut DrillController, config: &DrillConfig) {
        controller
            .request(
                DrillCommand::EnterRegion {
                    region: "Europe".into(),
                },
                config,
            )
            .unwrap();
        settle(controller, config);
        let generation = controller.generation();
        assert!(controller.apply_result(AggregateResult {
            generation,
            payload: AggregatePayload::Countries(vec![CountryAggregate {
                country_code: "IT".into(),
                country_name: "Italy".into(),
                lat: 41.9,
                lng: 12.5,
                count: 7,
            }]),
        }));
    }

    #[test]
    fn direct_jump_to_country_map_is_rejected() {
        let mut controller = DrillController::default();
        let denied = controller.request(
            DrillCommand::EnterCountry {
                code: "IT".into(),
                name: "Italy".into(),
            },
            &config(),
        );
        assert_eq!(denied, Err(Denied::NotAdjacent));
        assert_eq!(controller.level(), DrillLevel::Globe);
    }

    #[test]
    fn back_from_globe_is_rejected() {
        let mut controller = DrillController::default();
        assert_eq!(
            controller.request(DrillCommand::Back, &config()),
            Err(Denied::NotAdjacent)
        );
    }

    #[test]
    fn selected_country_is_set_iff_country_map() {
        let config = config();
        let mut controller = DrillController::default();
        assert!(controller.selected_country().is_none());

        enter_italy_region(&mut controller, &config);
        assert!(controller.selected_country().is_none());

        controller
            .request(
                DrillCommand::EnterCountry {
                    code: "IT".into(),
                    name: "Italy".into(),
                },
                &config,
            )
            .unwrap();
        settle(&mut controller, &config);
        assert_eq!(controller.level(), DrillLevel::CountryMap);
        assert_eq!(controller.selected_country().unwrap().code, "IT");

        controller.request(DrillCommand::Back, &config).unwrap();
        settle(&mut controller, &config);
        assert!(controller.selected_country().is_none());
    }

    #[test]
    fn rapid_double_click_yields_one_transition() {
        let config = config();
        let mut controller = DrillController::default();
        enter_italy_region(&mut controller, &config);

        let first = controller.request(
            DrillCommand::EnterCountry {
                code: "IT".into(),
                name: "Italy".into(),
            },
            &config,
        );
        assert!(first.is_ok());
        // Second click lands while the cross-fade is still running.
        let second = controller.request(
            DrillCommand::EnterCountry {
                code: "IT".into(),
                name: "Italy".into(),
            },
            &config,
        );
        assert_eq!(second, Err(Denied::Busy));
    }

    #[test]
    fn cooldown_blocks_requests_after_the_fade() {
        let config = config();
        let mut controller = DrillController::default();
        controller
            .request(
                DrillCommand::EnterRegion {
                    region: "Europe".into(),
                },
                &config,
            )
            .unwrap();
        // Tick just past the fade, into the cooldown window.
        let mut elapsed = 0.0;
        while elapsed < config.fade_seconds + 0.05 {
            controller.tick(0.016, &config);
            elapsed += 0.016;
        }
        assert!(controller.is_busy());
        assert_eq!(
            controller.request(DrillCommand::Back, &config),
            Err(Denied::Busy)
        );
        settle(&mut controller, &config);
        assert!(!controller.is_busy());
    }

    #[test]
    fn back_restores_markers_without_refetch() {
        let config = config();
        let mut controller = DrillController::default();
        enter_italy_region(&mut controller, &config);
        controller.set_continent_bounds(LatLngBounds::new(35.0, -10.0, 60.0, 30.0));

        controller
            .request(
                DrillCommand::EnterCountry {
                    code: "IT".into(),
                    name: "Italy".into(),
                },
                &config,
            )
            .unwrap();
        settle(&mut controller, &config);

        let applied = controller.request(DrillCommand::Back, &config).unwrap();
        match applied {
            Applied::BackToContinent { refetch, .. } => assert!(!refetch),
            other => panic!("unexpected transition: {other:?}"),
        }
        // Continent markers and viewport survive the round trip untouched.
        assert_eq!(controller.country_aggregates().len(), 1);
        assert_eq!(
            controller.cached_continent_bounds(),
            Some(LatLngBounds::new(35.0, -10.0, 60.0, 30.0))
        );
    }

    #[test]
    fn stale_results_are_dropped_after_back() {
        let config = config();
        let mut controller = DrillController::default();
        enter_italy_region(&mut controller, &config);
        controller
            .request(
                DrillCommand::EnterCountry {
                    code: "IT".into(),
                    name: "Italy".into(),
                },
                &config,
            )
            .unwrap();
        let country_generation = controller.generation();
        settle(&mut controller, &config);
        controller.request(DrillCommand::Back, &config).unwrap();
        settle(&mut controller, &config);

        // The by-country response arrives after the user already backed out.
        let accepted = controller.apply_result(AggregateResult {
            generation: country_generation,
            payload: AggregatePayload::States(vec![StateAggregate::default()]),
        });
        assert!(!accepted);
        assert!(controller.state_aggregates().is_empty());
    }

    #[test]
    fn inconsistent_state_counts_are_still_applied() {
        let config = config();
        let mut controller = DrillController::default();
        enter_italy_region(&mut controller, &config);
        controller
            .request(
                DrillCommand::EnterCountry {
                    code: "IT".into(),
                    name: "Italy".into(),
                },
                &config,
            )
            .unwrap();
        settle(&mut controller, &config);

        // Continent level said 7; the states only sum to 3. Logged as a data
        // problem, but the markers still render what the backend sent.
        let accepted = controller.apply_result(AggregateResult {
            generation: controller.generation(),
            payload: AggregatePayload::States(vec![StateAggregate {
                state_name: "Lazio".into(),
                lat: 41.9,
                lng: 12.5,
                count: 3,
                items: vec![],
            }]),
        });
        assert!(accepted);
        assert_eq!(controller.state_aggregates().len(), 1);
    }

    #[test]
    fn displayed_level_switches_at_fade_midpoint() {
        let config = config();
        let mut controller = DrillController::default();
        controller
            .request(
                DrillCommand::EnterRegion {
                    region: "Africa".into(),
                },
                &config,
            )
            .unwrap();
        assert_eq!(controller.displayed_level(), DrillLevel::Globe);
        let mut elapsed = 0.0;
        while elapsed < config.fade_seconds * 0.6 {
            controller.tick(0.016, &config);
            elapsed += 0.016;
        }
        assert_eq!(controller.displayed_level(), DrillLevel::ContinentMap);
    }

    #[test]
    fn back_to_globe_resets_everything() {
        let config = config();
        let mut controller = DrillController::default();
        enter_italy_region(&mut controller, &config);
        controller.set_continent_bounds(LatLngBounds::new(0.0, 0.0, 1.0, 1.0));
        controller.request(DrillCommand::Back, &config).unwrap();
        settle(&mut controller, &config);

        assert_eq!(controller.level(), DrillLevel::Globe);
        assert!(controller.selected_region().is_none());
        assert!(controller.country_aggregates().is_empty());
        assert!(controller.cached_continent_bounds().is_none());
    }

    #[test]
    fn fade_alpha_rises_then_falls() {
        let config = config();
        let mut controller = DrillController::default();
        controller
            .request(
                DrillCommand::EnterRegion {
                    region: "Europe".into(),
                },
                &config,
            )
            .unwrap();
        controller.tick(config.fade_seconds / 2.0, &config);
        let mid = controller.fade_alpha();
        assert!(mid > 0.9);
        controller.tick(config.fade_seconds / 2.0 + 0.01, &config);
        assert_eq!(controller.fade_alpha(), 0.0);
    }
}
