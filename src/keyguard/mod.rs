//! Lock-screen status widget: regions, collaborators and the refresh model.

pub mod alarm;
pub mod clock;
pub mod region;
pub mod status_view;
pub mod update_monitor;

use std::sync::atomic::{AtomicBool, Ordering};

pub use alarm::{AlarmError, AlarmFile, AlarmSource, AlarmStore, ID_DEFAULT_STATUS_WIDGET};
pub use clock::{ClockView, FixedTime, MinuteTicker, SystemTime, TimeSource};
pub use region::{Icon, RegionId, StatusLayout, TextRegion, Typeface, Visibility};
pub use status_view::{
    apply_text_case, LayoutError, RefreshError, StatusDisplay, StatusOptions, StatusServices,
};
pub use update_monitor::{MonitorEvent, Subscription, UpdateMonitor};

/// Whether user-facing widget text is upper-cased before display.
pub static USE_UPPER_CASE: AtomicBool = AtomicBool::new(false);

pub fn set_use_upper_case(enabled: bool) {
    USE_UPPER_CASE.store(enabled, Ordering::Relaxed);
}

pub fn use_upper_case() -> bool {
    USE_UPPER_CASE.load(Ordering::Relaxed)
}
