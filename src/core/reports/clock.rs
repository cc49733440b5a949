use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Source of "now" for report timestamps and the today filter.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Wall clock, either the host's local time or a fixed IANA timezone.
///
/// Hotels rarely run their bot host in the same zone as the front desk, so
/// the zone can be pinned with `REPORT_TIMEZONE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Option<Tz>,
}

impl SystemClock {
    pub fn local() -> Self {
        Self { timezone: None }
    }

    pub fn in_timezone(timezone: Tz) -> Self {
        Self {
            timezone: Some(timezone),
        }
    }

    /// Parses an IANA zone name such as `Europe/Lisbon`.
    pub fn from_zone_name(name: &str) -> Option<Self> {
        name.trim().parse::<Tz>().ok().map(Self::in_timezone)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}

#[cfg(test)]
pub struct FixedClock(pub NaiveDateTime);

#[cfg(test)]
impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let time = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid test timestamp");
        Self(time)
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_names() {
        assert!(SystemClock::from_zone_name("Europe/Lisbon").is_some());
        assert!(SystemClock::from_zone_name(" Asia/Kolkata ").is_some());
        assert!(SystemClock::from_zone_name("Mars/Olympus").is_none());
    }

    #[test]
    fn test_fixed_clock_today() {
        let clock = FixedClock::at(2026, 10, 17, 23, 59);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
    }
}
