//! Station domain model and lookup input.
//!
//! # Responsibility
//! - Define the full-row projection of one `Stations` record.
//! - Validate caller-supplied country names before they reach storage.
//!
//! # Invariants
//! - A persisted station always has a non-empty `country`.
//! - Coordinates are decimal degrees inside their geographic range.
//! - `CountryName` is trimmed and non-empty; casing is preserved.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of a monitoring station row.
pub type StationId = i64;

/// One monitoring station as stored in the `Stations` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub station_id: StationId,
    pub name: String,
    /// Exact-match lookup key.
    pub country: String,
    /// Decimal degrees, `-90..=90`.
    pub latitude: f64,
    /// Decimal degrees, `-180..=180`.
    pub longitude: f64,
    /// Metres above sea level, when surveyed.
    pub elevation: Option<f64>,
}

/// Persisted station state violating model invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum StationValidationError {
    EmptyCountry { station_id: StationId },
    LatitudeOutOfRange { station_id: StationId, value: f64 },
    LongitudeOutOfRange { station_id: StationId, value: f64 },
}

impl Display for StationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCountry { station_id } => {
                write!(f, "station {station_id} has an empty country")
            }
            Self::LatitudeOutOfRange { station_id, value } => {
                write!(f, "station {station_id} latitude {value} is outside -90..=90")
            }
            Self::LongitudeOutOfRange { station_id, value } => {
                write!(f, "station {station_id} longitude {value} is outside -180..=180")
            }
        }
    }
}

impl Error for StationValidationError {}

impl Station {
    /// Validates invariants a persisted row must satisfy.
    pub fn validate(&self) -> Result<(), StationValidationError> {
        let station_id = self.station_id;
        if self.country.trim().is_empty() {
            return Err(StationValidationError::EmptyCountry { station_id });
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(StationValidationError::LatitudeOutOfRange {
                station_id,
                value: self.latitude,
            });
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(StationValidationError::LongitudeOutOfRange {
                station_id,
                value: self.longitude,
            });
        }
        Ok(())
    }
}

/// Rejected lookup input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryValidationError {
    /// Empty or whitespace-only after trimming.
    Empty,
}

impl Display for CountryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "country name must not be empty"),
        }
    }
}

impl Error for CountryValidationError {}

/// Trimmed, non-empty country name ready to be bound into a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryName(String);

impl CountryName {
    /// Trims surrounding whitespace and rejects empty input.
    ///
    /// Casing and inner characters are kept verbatim; matching semantics
    /// belong to the store.
    pub fn parse(raw: &str) -> Result<Self, CountryValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CountryValidationError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, safe to log in place of the name itself.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl AsRef<str> for CountryName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for CountryName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{CountryName, CountryValidationError, Station, StationValidationError};

    fn station(country: &str, latitude: f64, longitude: f64) -> Station {
        Station {
            station_id: 7,
            name: "Test Site".to_string(),
            country: country.to_string(),
            latitude,
            longitude,
            elevation: None,
        }
    }

    #[test]
    fn parse_trims_and_preserves_case() {
        let name = CountryName::parse("  uSa \t").unwrap();
        assert_eq!(name.as_str(), "uSa");
    }

    #[test]
    fn parse_rejects_blank_input() {
        assert_eq!(CountryName::parse(""), Err(CountryValidationError::Empty));
        assert_eq!(CountryName::parse(" \n\t "), Err(CountryValidationError::Empty));
    }

    #[test]
    fn parse_keeps_query_metacharacters_verbatim() {
        let name = CountryName::parse("USA'; DROP TABLE Stations;--").unwrap();
        assert_eq!(name.as_str(), "USA'; DROP TABLE Stations;--");
    }

    #[test]
    fn parse_accepts_long_names_without_a_length_cap() {
        let raw = format!("  {}  ", "A".repeat(300));
        let name = CountryName::parse(&raw).unwrap();
        assert_eq!(name.char_len(), 300);
    }

    #[test]
    fn validate_flags_empty_country_and_bad_coordinates() {
        assert!(station("Chile", -33.4, -70.6).validate().is_ok());
        assert_eq!(
            station("  ", 0.0, 0.0).validate(),
            Err(StationValidationError::EmptyCountry { station_id: 7 })
        );
        assert!(matches!(
            station("Chile", 91.0, 0.0).validate(),
            Err(StationValidationError::LatitudeOutOfRange { .. })
        ));
        assert!(matches!(
            station("Chile", 0.0, -181.0).validate(),
            Err(StationValidationError::LongitudeOutOfRange { .. })
        ));
    }

    #[test]
    fn station_serializes_with_snake_case_fields() {
        let json = serde_json::to_value(station("Japan", 35.7, 139.7)).unwrap();
        assert_eq!(json["country"], "Japan");
        assert_eq!(json["station_id"], 7);
        assert!(json["elevation"].is_null());
    }
}
