use serde::{Deserialize, Serialize};

/// One clickable item behind a state badge. The backend owns the full record;
/// we only carry what the detail panel needs to render a list entry.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateItem {
    pub id: i64,
    pub title: String,
}

/// Per-country aggregate for the continent-level marker layer.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryAggregate {
    pub country_code: String,
    pub country_name: String,
    pub lat: f64,
    pub lng: f64,
    pub count: u32,
}

/// Per-state aggregate for the country-level badge layer.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateAggregate {
    pub state_name: String,
    pub lat: f64,
    pub lng: f64,
    pub count: u32,
    #[serde(default)]
    pub items: Vec<AggregateItem>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByRegionResponse {
    pub countries: Vec<CountryAggregate>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByCountryResponse {
    pub states: Vec<StateAggregate>,
}
