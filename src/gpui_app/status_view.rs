//! gpui view hosting the status widget.

use async_channel::Receiver;
use futures_util::future::FutureExt;
use futures_util::{pin_mut, select};
use gpui::{div, prelude::*, px, Context, FontWeight, SharedString, Task, Window};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigWatcher, SharedConfig};
use crate::gpui_app::theme::{Theme, TypographyScale};
use crate::ipc::{self, IpcCommand, StatusSnapshot};
use crate::keyguard::region::FontStyle;
use crate::keyguard::{
    self, AlarmStore, ClockView, MinuteTicker, MonitorEvent, RegionId, StatusDisplay, SystemTime,
    TextRegion, TimeSource, UpdateMonitor,
};

/// The lock-screen status window's root view.
pub struct KeyguardView {
    display: StatusDisplay,
    theme: Theme,
    config: SharedConfig,
    config_watcher: Option<ConfigWatcher>,
    alarms: AlarmStore,
    monitor: UpdateMonitor,
    keyguard_showing: bool,
    /// Awaits update-monitor events for the current subscription
    #[allow(dead_code)]
    event_task: Option<Task<()>>,
    /// Minute ticker, IPC drain and config reload
    #[allow(dead_code)]
    host_task: Option<Task<()>>,
}

impl KeyguardView {
    pub fn new(
        display: StatusDisplay,
        theme: Theme,
        config: SharedConfig,
        alarms: AlarmStore,
        monitor: UpdateMonitor,
        cx: &mut Context<Self>,
    ) -> Self {
        let config_watcher = ConfigWatcher::new(Arc::clone(&config))
            .map_err(|e| log::warn!("Failed to set up config watcher: {}", e))
            .ok();

        let mut view = Self {
            display,
            theme,
            config,
            config_watcher,
            alarms,
            monitor,
            keyguard_showing: true,
            event_task: None,
            host_task: None,
        };
        view.attach(cx);
        view.host_task = Some(view.start_host_task(cx));
        view.publish();
        view
    }

    /// Subscribes the widget and starts awaiting its events.
    fn attach(&mut self, cx: &mut Context<Self>) {
        self.display.on_attached_to_window(&self.monitor);
        let Some(events) = self.display.events() else {
            return;
        };
        self.event_task = Some(cx.spawn(async move |this, cx| {
            while let Ok(event) = events.recv().await {
                if this
                    .update(cx, |view, cx| view.on_monitor_event(event, cx))
                    .is_err()
                {
                    break;
                }
            }
        }));
    }

    fn detach(&mut self) {
        self.display.on_detached_from_window();
        self.event_task = None;
    }

    fn on_monitor_event(&mut self, event: MonitorEvent, cx: &mut Context<Self>) {
        if let MonitorEvent::KeyguardVisibilityChanged { showing } = event {
            self.keyguard_showing = showing;
        }
        match self.display.handle_event(event) {
            Ok(true) => log::debug!("Refreshed on {:?}", event),
            Ok(false) => {}
            Err(e) => log::error!("Status refresh failed: {}", e),
        }
        self.publish();
        cx.notify();
    }

    fn publish(&self) {
        ipc::publish_snapshot(StatusSnapshot::capture(&self.display));
    }

    fn start_host_task(&self, cx: &mut Context<Self>) -> Task<()> {
        let ipc_rx: Receiver<IpcCommand> = ipc::subscribe_ipc_commands();
        let monitor = self.monitor.clone();

        cx.spawn(async move |this, cx| {
            let mut ticker = MinuteTicker::new();
            ticker.observe(&SystemTime.now());

            loop {
                let ipc_fut = ipc_rx.recv().fuse();
                let timer_fut = cx
                    .background_executor()
                    .timer(Duration::from_secs(1))
                    .fuse();
                pin_mut!(ipc_fut, timer_fut);

                select! {
                    cmd = ipc_fut => {
                        let Ok(cmd) = cmd else {
                            log::warn!("IPC command bus closed");
                            break;
                        };
                        if this
                            .update(cx, |view, cx| view.apply_ipc_command(cmd, cx))
                            .is_err()
                        {
                            break;
                        }
                    }
                    _ = timer_fut => {
                        if ticker.observe(&SystemTime.now()) {
                            monitor.dispatch_time_changed();
                        }
                        if this.update(cx, |view, cx| view.check_config_reload(cx)).is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }

    fn apply_ipc_command(&mut self, cmd: IpcCommand, cx: &mut Context<Self>) {
        match cmd {
            IpcCommand::Refresh => self.monitor.dispatch_time_changed(),
            IpcCommand::Show => self.monitor.dispatch_keyguard_visibility_changed(true),
            IpcCommand::Hide => self.monitor.dispatch_keyguard_visibility_changed(false),
            IpcCommand::SetAlarm(alarm) => {
                log::info!("Next alarm set over IPC: {:?}", alarm);
                self.alarms.set(alarm);
                self.display.refresh_alarm_status();
                self.publish();
                cx.notify();
            }
        }
    }

    /// Rebuilds the widget when the config file changed.
    fn check_config_reload(&mut self, cx: &mut Context<Self>) {
        let reloaded = self
            .config_watcher
            .as_ref()
            .is_some_and(|watcher| watcher.check_and_reload());
        if !reloaded {
            return;
        }

        let Ok(config) = self.config.read().map(|c| c.clone()) else {
            return;
        };
        keyguard::set_use_upper_case(config.status.upper_case);
        let alarms = config.alarm_store();
        match super::build_display(&config, alarms.clone()) {
            Ok(display) => {
                log::info!("Config reloaded, rebuilding status widget");
                self.detach();
                self.display = display;
                self.alarms = alarms;
                self.theme = Theme::from_config(&config.window);
                self.attach(cx);
                self.publish();
                cx.notify();
            }
            Err(e) => log::error!("Keeping previous widget, reloaded config failed: {}", e),
        }
    }

    fn render_clock(&self, clock: &ClockView) -> gpui::Div {
        let theme = &self.theme;
        let mut row = div()
            .flex()
            .flex_row()
            .items_end()
            .gap(px(6.0))
            .child(
                div()
                    .text_size(px(theme.font_size_for_scale(TypographyScale::Display)))
                    .font_weight(FontWeight::LIGHT)
                    .child(SharedString::from(clock.time().to_string())),
            );
        if let Some(marker) = clock.am_pm() {
            row = row.child(
                div()
                    .pb(px(8.0))
                    .text_size(px(theme.font_size_for_scale(TypographyScale::Sm)))
                    .text_color(theme.foreground_muted)
                    .child(SharedString::from(marker.to_string())),
            );
        }
        row
    }

    fn render_region(&self, region: &TextRegion) -> gpui::Div {
        let theme = &self.theme;
        let (scale, color) = match region.id() {
            RegionId::AlarmStatus => (TypographyScale::Sm, theme.foreground_muted),
            RegionId::LunarDate => (TypographyScale::Base, theme.foreground_muted),
            _ => (TypographyScale::Base, theme.foreground),
        };

        let mut row = div()
            .flex()
            .flex_row()
            .items_center()
            .gap(px(6.0))
            .max_w_full()
            .text_size(px(theme.font_size_for_scale(scale)))
            .text_color(color);
        if let Some(icon) = region.leading_icon() {
            row = row.child(
                div()
                    .text_color(theme.accent)
                    .child(SharedString::from(icon.glyph())),
            );
        }

        let mut text = div().child(SharedString::from(
            region.text().unwrap_or_default().to_string(),
        ));
        if region
            .typeface()
            .is_some_and(|t| t.style == FontStyle::Bold)
        {
            text = text.font_weight(FontWeight::BOLD);
        }
        // No marquee in gpui; selected regions stay on one line and truncate.
        if region.is_selected() {
            text = text.whitespace_nowrap().overflow_x_hidden().text_ellipsis();
        }
        row.child(text)
    }
}

impl Render for KeyguardView {
    fn render(&mut self, _window: &mut Window, _cx: &mut Context<Self>) -> impl IntoElement {
        let mut root = div()
            .id("keyguard-status")
            .flex()
            .flex_col()
            .items_center()
            .justify_center()
            .gap(px(4.0))
            .size_full()
            .px(px(16.0))
            .bg(self.theme.background)
            .text_color(self.theme.foreground)
            .font_family(SharedString::from(self.theme.font_family.clone()));

        if !self.keyguard_showing {
            return root;
        }

        if let Some(clock) = self.display.clock() {
            root = root.child(self.render_clock(clock));
        }
        for region in self.display.text_regions() {
            if region.is_visible() {
                root = root.child(self.render_region(region));
            }
        }
        root
    }
}

impl Drop for KeyguardView {
    fn drop(&mut self) {
        self.detach();
    }
}
