//! Great-circle distance and the travel-time heuristic built on top of it.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const INVALID_COORDINATES: &str = "Invalid latitude or longitude";

/// A WGS84 point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a point, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] with the message `Invalid latitude or longitude`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(ValidationError::new(INVALID_COORDINATES))
        }
    }

    /// Parse raw query-string values. Missing or non-numeric input is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when either value is absent or not a valid coordinate.
    pub fn parse(latitude: Option<&str>, longitude: Option<&str>) -> Result<Self, ValidationError> {
        let parse = |raw: Option<&str>| {
            raw.map(str::trim)
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| ValidationError::new(INVALID_COORDINATES))
        };
        Self::new(parse(latitude)?, parse(longitude)?)
    }

    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine_km(*self, *other)
    }
}

/// Haversine great-circle distance between two points, in kilometres.
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Linear travel-time estimate: `ceil(distance / speed) + fixed_wait`.
///
/// The defaults (2 km per minute, 5 minutes) reproduce `ceil(d / 2) + 5`; they
/// are a heuristic, not a routing result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtaModel {
    pub speed_km_per_minute: f64,
    pub fixed_wait_minutes: u32,
}

impl Default for EtaModel {
    fn default() -> Self {
        Self {
            speed_km_per_minute: 2.0,
            fixed_wait_minutes: 5,
        }
    }
}

impl EtaModel {
    /// Estimated minutes to reach a store `distance_km` away and get served.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn estimated_minutes(&self, distance_km: f64) -> u32 {
        let travel = (distance_km.max(0.0) / self.speed_km_per_minute).ceil();
        // f64 -> u32 `as` saturates, so absurd distances clamp instead of wrapping.
        (travel as u32).saturating_add(self.fixed_wait_minutes)
    }
}
