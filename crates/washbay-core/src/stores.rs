//! Store entity, its nested service and opening-hours collections, and the
//! insert/patch shapes used by the admin API and the seed loader.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::geo::Coordinates;

pub const MAX_RATING: f64 = 5.0;
const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub name: String,
    pub price: f64,
    pub duration_minutes: u32,
}

/// Opening window for one weekday, as zero-padded `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: String,
    pub close: String,
}

impl DayHours {
    /// `open <= now < close`, compared lexicographically on `HH:MM`.
    #[must_use]
    pub fn is_open_at(&self, now_hhmm: &str) -> bool {
        self.open.as_str() <= now_hhmm && now_hhmm < self.close.as_str()
    }

    fn validate(&self, day: &str) -> Result<(), ValidationError> {
        for (label, value) in [("open", &self.open), ("close", &self.close)] {
            if !is_hhmm(value) {
                return Err(ValidationError::new(format!(
                    "hours.{day}.{label} must be HH:MM, got '{value}'"
                )));
            }
        }
        Ok(())
    }
}

fn is_hhmm(value: &str) -> bool {
    value.len() == 5 && NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}

/// Weekly schedule. A missing day means the store has no hours that day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thursday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunday: Option<DayHours>,
}

impl WeeklyHours {
    #[must_use]
    pub fn for_weekday(&self, weekday: Weekday) -> Option<&DayHours> {
        match weekday {
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
            Weekday::Sun => self.sunday.as_ref(),
        }
    }

    fn days(&self) -> [(&'static str, Option<&DayHours>); 7] {
        [
            ("monday", self.monday.as_ref()),
            ("tuesday", self.tuesday.as_ref()),
            ("wednesday", self.wednesday.as_ref()),
            ("thursday", self.thursday.as_ref()),
            ("friday", self.friday.as_ref()),
            ("saturday", self.saturday.as_ref()),
            ("sunday", self.sunday.as_ref()),
        ]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (day, hours) in self.days() {
            if let Some(hours) = hours {
                hours.validate(day)?;
            }
        }
        Ok(())
    }
}

/// A car-wash location as stored in the `stores` table.
///
/// `latitude`/`longitude` are the authoritative scalars; the database derives
/// its geography point from them, so the two never drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
    pub review_count: i32,
    pub is_active: bool,
    pub capacity: i32,
    pub current_queue: i32,
    pub base_wait_minutes: i32,
    pub services: Vec<ServiceOffering>,
    pub hours: WeeklyHours,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// `max(0, capacity - current_queue)`.
    #[must_use]
    pub fn available_bays(&self) -> i32 {
        self.capacity.saturating_sub(self.current_queue).max(0)
    }
}

/// Insert shape for a store. Used by `POST /stores` and the YAML seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub capacity: i32,
    #[serde(default)]
    pub current_queue: i32,
    #[serde(default)]
    pub base_wait_minutes: i32,
    #[serde(default)]
    pub services: Vec<ServiceOffering>,
    #[serde(default)]
    pub hours: WeeklyHours,
}

fn default_true() -> bool {
    true
}

impl NewStore {
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_required_text("address", &self.address)?;
        validate_required_text("city", &self.city)?;
        Coordinates::new(self.latitude, self.longitude)?;
        validate_rating(self.rating)?;
        validate_non_negative("reviewCount", self.review_count)?;
        validate_non_negative("capacity", self.capacity)?;
        validate_non_negative("currentQueue", self.current_queue)?;
        validate_non_negative("baseWaitMinutes", self.base_wait_minutes)?;
        validate_services(&self.services)?;
        self.hours.validate()
    }
}

/// Sparse update for a store.
///
/// Merge policy: an absent field keeps the stored value, a present field
/// replaces it wholesale (`services` and `hours` are not merged element-wise).
/// For `state`, `zip` and `phone`, JSON `null` clears the column.
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub zip: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub is_active: Option<bool>,
    pub capacity: Option<i32>,
    pub current_queue: Option<i32>,
    pub base_wait_minutes: Option<i32>,
    pub services: Option<Vec<ServiceOffering>>,
    pub hours: Option<WeeklyHours>,
}

// Maps a present key (including `null`) to `Some(..)`; `#[serde(default)]`
// covers the absent case.
#[allow(clippy::option_option)]
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl StorePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found among the supplied fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(address) = &self.address {
            validate_required_text("address", address)?;
        }
        if let Some(city) = &self.city {
            validate_required_text("city", city)?;
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => {
                Coordinates::new(lat, lng)?;
            }
            (None, None) => {}
            _ => {
                return Err(ValidationError::new(
                    "latitude and longitude must be updated together",
                ))
            }
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        for (field, value) in [
            ("reviewCount", self.review_count),
            ("capacity", self.capacity),
            ("currentQueue", self.current_queue),
            ("baseWaitMinutes", self.base_wait_minutes),
        ] {
            if let Some(value) = value {
                validate_non_negative(field, value)?;
            }
        }
        if let Some(services) = &self.services {
            validate_services(services)?;
        }
        if let Some(hours) = &self.hours {
            hours.validate()?;
        }
        Ok(())
    }

    /// Merge this patch into `store` in place and bump `updated_at`.
    pub fn apply_to(&self, store: &mut Store, now: DateTime<Utc>) {
        fn replace<T: Clone>(target: &mut T, value: Option<&T>) {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }

        replace(&mut store.name, self.name.as_ref());
        replace(&mut store.address, self.address.as_ref());
        replace(&mut store.city, self.city.as_ref());
        replace(&mut store.state, self.state.as_ref());
        replace(&mut store.zip, self.zip.as_ref());
        replace(&mut store.phone, self.phone.as_ref());
        replace(&mut store.latitude, self.latitude.as_ref());
        replace(&mut store.longitude, self.longitude.as_ref());
        replace(&mut store.rating, self.rating.as_ref());
        replace(&mut store.review_count, self.review_count.as_ref());
        replace(&mut store.is_active, self.is_active.as_ref());
        replace(&mut store.capacity, self.capacity.as_ref());
        replace(&mut store.current_queue, self.current_queue.as_ref());
        replace(&mut store.base_wait_minutes, self.base_wait_minutes.as_ref());
        replace(&mut store.services, self.services.as_ref());
        replace(&mut store.hours, self.hours.as_ref());
        store.updated_at = now;
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new("name must be 1-200 characters"));
    }
    Ok(())
}

fn validate_required_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!("{field} must be non-empty")));
    }
    Ok(())
}

fn validate_rating(rating: f64) -> Result<(), ValidationError> {
    if rating.is_finite() && (0.0..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "rating must be between 0 and 5, got {rating}"
        )))
    }
}

fn validate_non_negative(field: &str, value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

fn validate_services(services: &[ServiceOffering]) -> Result<(), ValidationError> {
    for service in services {
        if service.name.trim().is_empty() {
            return Err(ValidationError::new("service name must be non-empty"));
        }
        if !service.price.is_finite() || service.price < 0.0 {
            return Err(ValidationError::new(format!(
                "service '{}' has invalid price {}",
                service.name, service.price
            )));
        }
    }
    Ok(())
}
