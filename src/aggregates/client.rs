use std::fmt;

use serde::de::DeserializeOwned;

use crate::types::{ByCountryResponse, ByRegionResponse};

/// What went wrong talking to the aggregate collaborator. Transport and
/// decode failures are distinct; both degrade to an empty marker set upstream.
#[derive(Debug)]
pub enum FetchError {
    Http(ureq::Error),
    Decode(serde_json::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(err) => write!(f, "request failed: {err}"),
            FetchError::Decode(err) => write!(f, "payload did not decode: {err}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(err) => Some(err),
            FetchError::Decode(err) => Some(err),
        }
    }
}

impl From<ureq::Error> for FetchError {
    fn from(err: ureq::Error) -> Self {
        FetchError::Http(err)
    }
}

/// Blocking HTTP client for the aggregate endpoints. Always called from the
/// async compute pool, never from the render loop.
#[derive(Clone)]
pub struct AggregateClient {
    agent: ureq::Agent,
    base_url: String,
}

impl AggregateClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /aggregates/by-region?region=<name>`
    pub fn fetch_by_region(&self, region: &str) -> Result<ByRegionResponse, FetchError> {
        let url = format!(
            "{}/aggregates/by-region?region={}",
            self.base_url,
            encode_query(region)
        );
        let mut response = self.agent.get(&url).call()?;
        let body = response.body_mut().read_to_string()?;
        decode(&body)
    }

    /// `GET /aggregates/by-country/{code}?name=<name>`
    pub fn fetch_by_country(
        &self,
        code: &str,
        name: &str,
    ) -> Result<ByCountryResponse, FetchError> {
        let url = format!(
            "{}/aggregates/by-country/{}?name={}",
            self.base_url,
            encode_query(code),
            encode_query(name)
        );
        let mut response = self.agent.get(&url).call()?;
        let body = response.body_mut().read_to_string()?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(FetchError::Decode)
}

/// Just enough escaping for region and country names.
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            ' ' => out.push_str("%20"),
            '&' => out.push_str("%26"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            '=' => out.push_str("%3D"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_encoding_covers_reserved_characters() {
        assert_eq!(encode_query("Middle East"), "Middle%20East");
        assert_eq!(encode_query("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_query("plain"), "plain");
    }

    #[test]
    fn malformed_payloads_surface_as_decode_errors() {
        let err = decode::<ByRegionResponse>("<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert!(err.to_string().contains("decode"));
    }

    #[test]
    fn well_formed_payloads_decode() {
        let ok: ByRegionResponse = decode(r#"{"countries": []}"#).unwrap();
        assert!(ok.countries.is_empty());
    }
}
