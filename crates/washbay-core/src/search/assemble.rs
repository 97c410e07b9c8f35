use serde::Serialize;

use super::Candidate;
use crate::geo::EtaModel;
use crate::stores::Store;

/// A ranked search hit: the store plus the per-request derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyStore {
    #[serde(flatten)]
    pub store: Store,
    /// Kilometres from the origin, rounded to two decimals.
    pub distance: f64,
    /// Minutes, from the unrounded distance.
    pub estimated_time: u32,
    pub available_bays: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEnvelope {
    pub success: bool,
    pub count: usize,
    pub data: Vec<NearbyStore>,
}

impl SearchEnvelope {
    #[must_use]
    pub fn ok(data: Vec<NearbyStore>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

#[must_use]
pub fn assemble(ranked: Vec<Candidate>, eta: &EtaModel) -> Vec<NearbyStore> {
    ranked
        .into_iter()
        .map(|Candidate { store, distance_km }| NearbyStore {
            distance: round_2dp(distance_km),
            estimated_time: eta.estimated_minutes(distance_km),
            available_bays: store.available_bays(),
            store,
        })
        .collect()
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
