//! Time source for pending-duration computation

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

use reefer_types::{ConfigError, Result};

/// Local wall-clock time of the terminal
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Current time in a fixed IANA timezone
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))?;
        Ok(Self::new(tz))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoned_clock_from_name() {
        let clock = ZonedClock::from_name("America/Santiago").unwrap();
        assert_eq!(clock.timezone(), chrono_tz::America::Santiago);
        assert!(ZonedClock::from_name("Mars/Olympus").is_err());
    }

    #[test]
    fn test_fixed_clock() {
        let t = NaiveDateTime::parse_from_str("2024-01-10 08:20", "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(FixedClock(t).now(), t);
    }
}
