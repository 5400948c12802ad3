//! Clock sub-element and the time source the widget reads "now" from.

use chrono::{DateTime, FixedOffset, Local, Timelike};

/// Supplies the current wall-clock time.
pub trait TimeSource: Send {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTime(pub DateTime<FixedOffset>);

impl TimeSource for FixedTime {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// The large time display at the top of the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockView {
    format: String,
    twelve_hour: bool,
    time: String,
    am_pm: Option<String>,
}

impl ClockView {
    /// `format` is only used in 24-hour mode; 12-hour mode always shows
    /// `h:mm` with a separate AM/PM marker.
    pub fn new(format: &str, twelve_hour: bool) -> Self {
        Self {
            format: format.to_string(),
            twelve_hour,
            time: String::new(),
            am_pm: None,
        }
    }

    pub fn update_time(&mut self, now: &DateTime<FixedOffset>) {
        if self.twelve_hour {
            self.time = now.format("%-I:%M").to_string();
            self.am_pm = Some(now.format("%p").to_string());
        } else {
            self.time = now.format(&self.format).to_string();
            self.am_pm = None;
        }
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn am_pm(&self) -> Option<&str> {
        self.am_pm.as_deref()
    }
}

/// Detects when the displayed minute or the UTC offset changes.
#[derive(Debug, Clone, Default)]
pub struct MinuteTicker {
    last: Option<(i64, i32)>,
}

impl MinuteTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `now`; true if it falls in a different minute or zone than the
    /// previous observation. The first observation only primes the ticker.
    pub fn observe(&mut self, now: &DateTime<FixedOffset>) -> bool {
        let minute = now.timestamp().div_euclid(60);
        let key = (minute, now.offset().local_minus_utc());
        let changed = self.last.is_some_and(|last| last != key);
        self.last = Some(key);
        if changed {
            log::debug!("Minute tick at {:02}:{:02}", now.hour(), now.minute());
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2021, 3, 15, h, m, 0)
            .unwrap()
    }

    #[test]
    fn twenty_four_hour_clock() {
        let mut clock = ClockView::new("%H:%M", false);
        clock.update_time(&at(19, 5));
        assert_eq!(clock.time(), "19:05");
        assert_eq!(clock.am_pm(), None);
    }

    #[test]
    fn twelve_hour_clock_has_marker() {
        let mut clock = ClockView::new("%H:%M", true);
        clock.update_time(&at(19, 5));
        assert_eq!(clock.time(), "7:05");
        assert_eq!(clock.am_pm(), Some("PM"));
    }

    #[test]
    fn ticker_fires_on_minute_change() {
        let mut ticker = MinuteTicker::new();
        assert!(!ticker.observe(&at(7, 0)));
        assert!(!ticker.observe(&(at(7, 0) + chrono::Duration::seconds(30))));
        assert!(ticker.observe(&at(7, 1)));
        assert!(!ticker.observe(&at(7, 1)));
    }

    #[test]
    fn ticker_fires_on_zone_change() {
        let mut ticker = MinuteTicker::new();
        let utc = at(7, 0);
        ticker.observe(&utc);
        let shifted = utc.with_timezone(&FixedOffset::east_opt(3600).unwrap());
        assert!(ticker.observe(&shifted));
    }

    #[test]
    fn fixed_time_is_stable() {
        let source = FixedTime(at(7, 0));
        assert_eq!(source.now(), source.now());
    }
}
