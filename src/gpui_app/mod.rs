//! gpui host for the status widget: window, event loop and rendering.

mod status_view;
pub mod theme;

pub use status_view::KeyguardView;

use gpui::{
    px, size, App, AppContext, Application, Bounds, WindowBounds, WindowKind, WindowOptions,
};
use std::sync::{Arc, RwLock};

use crate::config::{load_config, Config, SharedConfig};
use crate::keyguard::{
    self, AlarmStore, LayoutError, StatusDisplay, StatusServices, UpdateMonitor,
};

/// Inflates the widget model described by `config`.
pub(crate) fn build_display(
    config: &Config,
    alarms: AlarmStore,
) -> Result<StatusDisplay, LayoutError> {
    let services = StatusServices::new(config.resources(), alarms);
    StatusDisplay::inflate(&config.layout(), services, config.status_options())
}

/// Runs the status window until the app quits.
///
/// Layout errors are returned before any window is created.
pub fn run() -> Result<(), LayoutError> {
    let config = load_config();
    keyguard::set_use_upper_case(config.status.upper_case);

    let alarms = config.alarm_store();
    let display = build_display(&config, alarms.clone())?;
    let theme = theme::Theme::from_config(&config.window);
    let window_size = size(
        px(config.window.width as f32),
        px(config.window.height as f32),
    );
    log::info!(
        "Creating status window: {}x{}",
        config.window.width,
        config.window.height
    );
    let monitor = UpdateMonitor::new();
    let shared_config: SharedConfig = Arc::new(RwLock::new(config));

    Application::new().run(move |cx: &mut App| {
        let bounds = Bounds::centered(None, window_size, cx);

        let window = cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                titlebar: None,
                kind: WindowKind::PopUp,
                is_movable: false,
                focus: false,
                show: true,
                ..Default::default()
            },
            |_window, cx| {
                cx.new(|cx| {
                    KeyguardView::new(display, theme, shared_config, alarms, monitor, cx)
                })
            },
        );

        if let Err(e) = window {
            log::error!("Failed to create status window: {}", e);
            cx.quit();
            return;
        }

        log::info!("gpui app initialization complete");
    });

    Ok(())
}
