use bevy::prelude::*;

use crate::aggregates::{AggregateReceiver, AggregateRequest, AggregateWorker};
use crate::boundary::BoundaryStore;
use crate::region::region_for_feature;
use crate::types::{AggregateItem, LatLngBounds};

use super::{
    Applied, Denied, DrillCommand, DrillConfig, DrillController, spawn_fade_curtain,
    update_fade_curtain,
};

/// A true click on the globe landed on a classified region.
#[derive(Event, Debug, Clone)]
pub struct RegionPicked {
    pub region: String,
}

/// A continent-level cluster marker was clicked.
#[derive(Event, Debug, Clone)]
pub struct CountryMarkerClicked {
    pub code: String,
    pub name: String,
}

/// A country-level state badge was clicked; opens the item detail surface.
#[derive(Event, Debug, Clone)]
pub struct StateBadgeClicked {
    pub state_name: String,
}

/// The host UI (or Escape) asked to go up one level.
#[derive(Event, Debug, Clone, Default)]
pub struct BackRequested;

// Host-facing callbacks. The surrounding application wires these to its own
// navigation and detail views.

#[derive(Event, Debug, Clone)]
pub struct RegionEntered {
    pub region: String,
}

#[derive(Event, Debug, Clone)]
pub struct CountryEntered {
    pub code: String,
    pub name: String,
}

#[derive(Event, Debug, Clone, Default)]
pub struct WentBack;

#[derive(Event, Debug, Clone)]
pub struct ItemSelected {
    pub item: AggregateItem,
}

pub struct DrillDownPlugin;

impl Plugin for DrillDownPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DrillConfig>()
            .init_resource::<DrillController>()
            .add_event::<RegionPicked>()
            .add_event::<CountryMarkerClicked>()
            .add_event::<StateBadgeClicked>()
            .add_event::<BackRequested>()
            .add_event::<RegionEntered>()
            .add_event::<CountryEntered>()
            .add_event::<WentBack>()
            .add_event::<ItemSelected>()
            .add_systems(Startup, spawn_fade_curtain)
            .add_systems(
                Update,
                (
                    tick_drill,
                    handle_region_picked,
                    handle_country_clicked,
                    handle_back,
                    apply_aggregate_results,
                    update_fade_curtain,
                ),
            );
    }
}

fn tick_drill(time: Res<Time>, config: Res<DrillConfig>, mut controller: ResMut<DrillController>) {
    controller.tick(time.delta_secs(), &config);
}

fn handle_region_picked(
    mut picks: EventReader<RegionPicked>,
    config: Res<DrillConfig>,
    mut controller: ResMut<DrillController>,
    worker: Res<AggregateWorker>,
    store: Res<BoundaryStore>,
    mut entered: EventWriter<RegionEntered>,
) {
    for pick in picks.read() {
        match controller.request(
            DrillCommand::EnterRegion {
                region: pick.region.clone(),
            },
            &config,
        ) {
            Ok(Applied::EnteredRegion { region, generation }) => {
                // The fetch is issued before the level becomes interactive.
                worker.queue_request(
                    AggregateRequest::ByRegion {
                        region: region.clone(),
                    },
                    generation,
                );
                if let Some(bounds) = region_bounds(&store, &region, config.viewport_padding_deg) {
                    controller.set_continent_bounds(bounds);
                }
                info!("entering region {region}");
                entered.write(RegionEntered { region });
            }
            Ok(other) => warn!("unexpected transition from region pick: {other:?}"),
            Err(Denied::Busy) => {}
            Err(Denied::NotAdjacent) => {
                debug!("region pick ignored at level {:?}", controller.level());
            }
        }
    }
}

fn handle_country_clicked(
    mut clicks: EventReader<CountryMarkerClicked>,
    config: Res<DrillConfig>,
    mut controller: ResMut<DrillController>,
    worker: Res<AggregateWorker>,
    mut entered: EventWriter<CountryEntered>,
) {
    for click in clicks.read() {
        match controller.request(
            DrillCommand::EnterCountry {
                code: click.code.clone(),
                name: click.name.clone(),
            },
            &config,
        ) {
            Ok(Applied::EnteredCountry {
                code,
                name,
                generation,
            }) => {
                worker.queue_request(
                    AggregateRequest::ByCountry {
                        code: code.clone(),
                        name: name.clone(),
                    },
                    generation,
                );
                info!("entering country {code}");
                entered.write(CountryEntered { code, name });
            }
            Ok(other) => warn!("unexpected transition from marker click: {other:?}"),
            Err(Denied::Busy) => {}
            Err(Denied::NotAdjacent) => {
                debug!("marker click ignored at level {:?}", controller.level());
            }
        }
    }
}

fn handle_back(
    mut backs: EventReader<BackRequested>,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<DrillConfig>,
    mut controller: ResMut<DrillController>,
    worker: Res<AggregateWorker>,
    mut went_back: EventWriter<WentBack>,
) {
    let requested = !backs.is_empty() || keys.just_pressed(KeyCode::Escape);
    backs.clear();
    if !requested {
        return;
    }

    match controller.request(DrillCommand::Back, &config) {
        Ok(Applied::BackToContinent { refetch, generation }) => {
            if refetch {
                // Retained continent aggregates were evicted; fetch them again.
                if let Some(region) = controller.selected_region() {
                    worker.queue_request(
                        AggregateRequest::ByRegion {
                            region: region.to_string(),
                        },
                        generation,
                    );
                }
            }
            went_back.write(WentBack);
        }
        Ok(Applied::BackToGlobe) => {
            went_back.write(WentBack);
        }
        Ok(other) => warn!("unexpected transition from back: {other:?}"),
        Err(Denied::Busy) => {}
        Err(Denied::NotAdjacent) => {}
    }
}

fn apply_aggregate_results(
    receiver: Res<AggregateReceiver>,
    mut controller: ResMut<DrillController>,
) {
    for result in receiver.try_iter() {
        controller.apply_result(result);
    }
}

/// Union of the bounds of every feature classified into the region, padded for
/// the initial continent viewport.
fn region_bounds(store: &BoundaryStore, region: &str, padding: f64) -> Option<LatLngBounds> {
    let collection = store.collection()?;
    let mut bounds = LatLngBounds::empty();
    for feature in &collection.features {
        if region_for_feature(feature) == region {
            let feature_bounds = feature.bounds();
            bounds.union(&feature_bounds);
        }
    }
    (!bounds.is_empty()).then(|| bounds.padded(padding))
}
