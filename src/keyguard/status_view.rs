//! The lock-screen status widget model.
//!
//! `StatusDisplay` owns its regions and pulls everything it shows from the
//! collaborators in [`StatusServices`]. It holds no gpui types so that the
//! refresh logic can be driven directly from tests.

use async_channel::Receiver;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use super::alarm::{AlarmSource, ID_DEFAULT_STATUS_WIDGET};
use super::clock::{ClockView, SystemTime, TimeSource};
use super::region::{Icon, RegionId, StatusLayout, TextRegion, Typeface, Visibility};
use super::update_monitor::{MonitorEvent, Subscription, UpdateMonitor};
use crate::locale::{
    DateFormatter, Locale, PatternError, PatternResolver, ResourceKey, Resources,
    SkeletonResolver,
};
use crate::lunar::{self, ChineseLunarCalendar, LunarConverter, LunarError};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("can't find widget at index {index} ({id})")]
    MissingRegion { index: usize, id: RegionId },
    #[error("missing string resource '{0}'")]
    MissingResource(&'static str),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("initial refresh failed: {0}")]
    InitialRefresh(#[from] RefreshError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("lunar date: {0}")]
    Lunar(#[from] LunarError),
}

/// External collaborators the widget reads from.
pub struct StatusServices {
    pub resources: Box<dyn Resources>,
    pub patterns: Box<dyn PatternResolver>,
    pub alarms: Box<dyn AlarmSource>,
    pub lunar: Box<dyn LunarConverter>,
    pub time: Box<dyn TimeSource>,
}

impl StatusServices {
    /// Built-in resolver, lunar calendar and the system clock.
    pub fn new(resources: impl Resources + 'static, alarms: impl AlarmSource + 'static) -> Self {
        Self {
            resources: Box::new(resources),
            patterns: Box::new(SkeletonResolver),
            alarms: Box::new(alarms),
            lunar: Box::new(ChineseLunarCalendar),
            time: Box::new(SystemTime),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOptions {
    pub upper_case: bool,
    pub clock_format: String,
    pub twelve_hour: bool,
}

impl StatusOptions {
    /// Defaults with the text case taken from the process-wide flag.
    pub fn from_process() -> Self {
        Self {
            upper_case: super::use_upper_case(),
            ..Self::default()
        }
    }
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            upper_case: false,
            clock_format: "%H:%M".to_string(),
            twelve_hour: false,
        }
    }
}

/// Upper-cases `text` when the policy is on. `None` stays `None`.
pub fn apply_text_case(text: Option<&str>, upper_case: bool) -> Option<String> {
    text.map(|t| if upper_case { t.to_uppercase() } else { t.to_string() })
}

pub struct StatusDisplay {
    services: StatusServices,
    options: StatusOptions,
    locale: Locale,
    date_format: DateFormatter,
    date_no_year: DateFormatter,
    date_with_year: DateFormatter,
    order: Vec<RegionId>,
    clock: Option<ClockView>,
    date: TextRegion,
    lunar: Option<TextRegion>,
    alarm: TextRegion,
    subscription: Option<Subscription>,
    last_refresh: Option<DateTime<FixedOffset>>,
}

impl StatusDisplay {
    /// Resolves regions and patterns, then performs the first refresh.
    pub fn inflate(
        layout: &StatusLayout,
        services: StatusServices,
        options: StatusOptions,
    ) -> Result<Self, LayoutError> {
        let locale = services.resources.locale();
        let resource = |key: ResourceKey| {
            services
                .resources
                .string(key)
                .ok_or(LayoutError::MissingResource(key.name()))
        };

        let skeleton = resource(ResourceKey::SystemUiDatePattern)?;
        let best = services.patterns.best_pattern(&skeleton, &locale);
        let date_format = DateFormatter::new(&best, &locale)?;
        let date_no_year =
            DateFormatter::new(&resource(ResourceKey::AbbrevWdayMonthDayNoYear)?, &locale)?;
        let date_with_year =
            DateFormatter::new(&resource(ResourceKey::AbbrevWdayMonthDayYear)?, &locale)?;
        crate::locale::validate_pattern(&options.clock_format)?;

        let clock = layout
            .contains(RegionId::Clock)
            .then(|| ClockView::new(&options.clock_format, options.twelve_hour));
        let mut date = layout
            .find_region(RegionId::Date)
            .ok_or(LayoutError::MissingRegion {
                index: 0,
                id: RegionId::Date,
            })?;
        let mut lunar = layout.find_region(RegionId::LunarDate);
        if !locale.uses_lunar_calendar() {
            if let Some(lunar) = lunar.as_mut() {
                lunar.set_visibility(Visibility::Gone);
            }
        }
        let mut alarm = layout
            .find_region(RegionId::AlarmStatus)
            .ok_or(LayoutError::MissingRegion {
                index: 1,
                id: RegionId::AlarmStatus,
            })?;

        date.set_typeface(Typeface::SANS_SERIF_BOLD);
        if let Some(lunar) = lunar.as_mut() {
            lunar.set_typeface(Typeface::SANS_SERIF_BOLD);
        }
        date.set_selected(true);
        alarm.set_selected(true);

        log::info!(
            "Status widget inflated: locale={}, date pattern '{}', regions={:?}",
            locale,
            date_format.pattern(),
            layout.regions()
        );

        let mut display = Self {
            services,
            options,
            locale,
            date_format,
            date_no_year,
            date_with_year,
            order: layout.regions().to_vec(),
            clock,
            date,
            lunar,
            alarm,
            subscription: None,
            last_refresh: None,
        };
        display.refresh()?;
        Ok(display)
    }

    /// Recomputes every region from a single reading of the clock.
    pub fn refresh(&mut self) -> Result<(), RefreshError> {
        let now = self.services.time.now();
        self.last_refresh = Some(now);
        if let Some(clock) = self.clock.as_mut() {
            clock.update_time(&now);
        }
        let date_result = self.refresh_date(&now);
        self.refresh_alarm_status();
        date_result
    }

    pub fn refresh_date(&mut self, now: &DateTime<FixedOffset>) -> Result<(), RefreshError> {
        let text = self.date_no_year.format(now);
        self.date
            .set_text(apply_text_case(Some(&text), self.options.upper_case));

        if !self.locale.uses_lunar_calendar() {
            return Ok(());
        }
        let Some(region) = self.lunar.as_mut() else {
            return Ok(());
        };

        let formatted = self.date_with_year.format(now);
        let converted = lunar::parse_date_tokens(&formatted)
            .and_then(|day| self.services.lunar.convert(day, &self.locale));
        match converted {
            Ok(converted) => {
                log::debug!("Lunar date for '{}': {}", formatted, converted);
                region.set_text(Some(lunar::strip_prefix(&converted)));
                region.set_visibility(Visibility::Visible);
                Ok(())
            }
            Err(err) => {
                // A stale lunar day must not sit beside the new solar date.
                region.set_text(None);
                region.set_visibility(Visibility::Gone);
                Err(err.into())
            }
        }
    }

    pub fn refresh_alarm_status(&mut self) {
        let next = match self.services.alarms.next_alarm() {
            Ok(next) => next,
            Err(err) => {
                log::warn!("Failed to read next alarm: {}", err);
                None
            }
        };

        match next.filter(|alarm| !alarm.is_empty()) {
            Some(alarm) => {
                self.alarm
                    .set_text(apply_text_case(Some(&alarm), self.options.upper_case));
                self.alarm.set_leading_icon(Some(Icon::Alarm));
                self.alarm.set_visibility(Visibility::Visible);
            }
            None => self.alarm.set_visibility(Visibility::Gone),
        }
    }

    /// Subscribes to the monitor. A second attach keeps the first subscription.
    pub fn on_attached_to_window(&mut self, monitor: &UpdateMonitor) {
        if self.subscription.is_some() {
            log::debug!("Status widget already attached");
            return;
        }
        let subscription = monitor.register_callback();
        log::info!("Status widget attached (callback {})", subscription.id());
        self.subscription = Some(subscription);
    }

    /// Releases the subscription. Undelivered events are dropped with it.
    pub fn on_detached_from_window(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            log::info!("Status widget detached (callback {})", subscription.id());
            subscription.cancel();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Returns whether the event caused a refresh.
    pub fn handle_event(&mut self, event: MonitorEvent) -> Result<bool, RefreshError> {
        match event {
            MonitorEvent::TimeChanged
            | MonitorEvent::KeyguardVisibilityChanged { showing: true } => {
                self.refresh()?;
                Ok(true)
            }
            MonitorEvent::KeyguardVisibilityChanged { showing: false } => Ok(false),
        }
    }

    /// Handles every pending event and returns how many refreshes ran.
    pub fn poll_events(&mut self) -> Result<usize, RefreshError> {
        let mut refreshed = 0;
        while let Some(event) = self.subscription.as_ref().and_then(Subscription::try_next) {
            if self.handle_event(event)? {
                refreshed += 1;
            }
        }
        Ok(refreshed)
    }

    /// Receiver for the current subscription, if attached.
    pub fn events(&self) -> Option<Receiver<MonitorEvent>> {
        self.subscription.as_ref().map(Subscription::receiver)
    }

    pub fn app_widget_id(&self) -> i32 {
        ID_DEFAULT_STATUS_WIDGET
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn options(&self) -> &StatusOptions {
        &self.options
    }

    pub fn date_formatter(&self) -> &DateFormatter {
        &self.date_format
    }

    /// Last refresh time rendered with the locale's best pattern.
    pub fn long_date(&self) -> Option<String> {
        self.last_refresh.as_ref().map(|at| self.date_format.format(at))
    }

    pub fn clock(&self) -> Option<&ClockView> {
        self.clock.as_ref()
    }

    pub fn date_region(&self) -> &TextRegion {
        &self.date
    }

    pub fn lunar_region(&self) -> Option<&TextRegion> {
        self.lunar.as_ref()
    }

    pub fn alarm_region(&self) -> &TextRegion {
        &self.alarm
    }

    /// Text regions in layout order.
    pub fn text_regions(&self) -> Vec<&TextRegion> {
        self.order
            .iter()
            .filter_map(|id| match id {
                RegionId::Clock => None,
                RegionId::Date => Some(&self.date),
                RegionId::LunarDate => self.lunar.as_ref(),
                RegionId::AlarmStatus => Some(&self.alarm),
            })
            .collect()
    }
}

impl Drop for StatusDisplay {
    fn drop(&mut self) {
        self.on_detached_from_window();
    }
}
