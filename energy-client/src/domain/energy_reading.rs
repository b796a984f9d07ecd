use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;

/// A persisted telemetry reading. `id` and `timestamp` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct EnergyReading {
    pub id: i64,
    #[sqlx(rename = "ts")]
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// kW
    pub solar_output: f64,
    /// Percent, expected within 0..=100 but not enforced.
    pub battery_level: f64,
    /// Liters per hour
    pub diesel_usage: f64,
}

/// Measurement values of a reading that has not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewEnergyReading {
    pub solar_output: f64,
    pub battery_level: f64,
    pub diesel_usage: f64,
}

impl NewEnergyReading {
    pub fn into_reading(self, id: i64, timestamp: OffsetDateTime) -> EnergyReading {
        EnergyReading {
            id,
            timestamp,
            solar_output: self.solar_output,
            battery_level: self.battery_level,
            diesel_usage: self.diesel_usage,
        }
    }
}

impl fmt::Display for EnergyReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - Solar: {} kW", self.timestamp, self.solar_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample() -> EnergyReading {
        NewEnergyReading {
            solar_output: 12.5,
            battery_level: 87.3,
            diesel_usage: 1.2,
        }
        .into_reading(1, datetime!(2024-01-01 12:00:00 UTC))
    }

    #[test]
    fn serializes_timestamp_as_rfc3339() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["timestamp"], "2024-01-01T12:00:00Z");
        assert_eq!(json["solar_output"], 12.5);
        assert_eq!(json["battery_level"], 87.3);
        assert_eq!(json["diesel_usage"], 1.2);
    }

    #[test]
    fn display_shows_timestamp_and_solar_output() {
        let s = sample().to_string();
        assert!(s.ends_with(" - Solar: 12.5 kW"));
        assert!(s.starts_with("2024-01-01"));
    }
}
