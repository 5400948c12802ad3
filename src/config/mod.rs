mod types;

pub use types::{parse_hex_color, AlarmConfig, Config, WindowConfig};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use crate::keyguard::{AlarmFile, AlarmStore, StatusLayout, StatusOptions};
use crate::locale::{BundledResources, Locale};

pub type SharedConfig = Arc<RwLock<Config>>;

pub fn load_config() -> Config {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Config {
    let config = if config_path.exists() {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {:?}", config_path);
                    config
                }
                Err(e) => {
                    log::error!("Failed to parse config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                log::error!("Failed to read config file: {}", e);
                Config::default()
            }
        }
    } else {
        log::info!("No config file found at {:?}, using defaults", config_path);
        Config::default()
    };

    let issues = config.validate();
    let errors: Vec<_> = issues.iter().filter(|i| i.is_error).collect();
    let warnings: Vec<_> = issues.iter().filter(|i| !i.is_error).collect();

    for warning in &warnings {
        log::warn!("Config: {}", warning);
    }
    for error in &errors {
        log::error!("Config: {}", error);
    }

    if !issues.is_empty() {
        log::info!(
            "Config validation: {} error(s), {} warning(s)",
            errors.len(),
            warnings.len()
        );
    }

    if !errors.is_empty() {
        log::error!("Config has errors; falling back to defaults.");
        return Config::default();
    }

    config
}

pub fn get_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("keyguard-status")
        .join("config.toml")
}

/// Expands a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

impl Config {
    /// Configured locale, or the environment's when unset or unparseable.
    pub fn locale(&self) -> Locale {
        self.status
            .locale
            .as_deref()
            .and_then(Locale::parse)
            .unwrap_or_else(Locale::detect)
    }

    pub fn layout(&self) -> StatusLayout {
        StatusLayout::new(self.region_ids())
    }

    pub fn resources(&self) -> BundledResources {
        BundledResources::new(self.locale()).with_overrides(&self.resources)
    }

    /// Alarm store, backed by the configured file if any.
    pub fn alarm_store(&self) -> AlarmStore {
        match &self.alarm.file {
            Some(file) => AlarmStore::backed_by(AlarmFile::new(expand_home(file))),
            None => AlarmStore::new(),
        }
    }

    /// Widget options. Text case comes from the process-wide flag.
    pub fn status_options(&self) -> StatusOptions {
        StatusOptions {
            clock_format: self.status.clock_format.clone(),
            twelve_hour: self.status.twelve_hour,
            ..StatusOptions::from_process()
        }
    }
}

/// Minimum spacing between two config reloads.
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Coalesces bursts of file events into one reload per window.
///
/// A change seen inside the window stays pending and fires once it passes.
#[derive(Debug, Default)]
struct ReloadDebounce {
    pending: bool,
    last_reload: Option<Instant>,
}

impl ReloadDebounce {
    fn mark_changed(&mut self) {
        self.pending = true;
    }

    /// True when a pending change may be applied at `now`. Consumes it.
    fn take_ready(&mut self, now: Instant) -> bool {
        let quiet = self
            .last_reload
            .map_or(true, |last| now.duration_since(last) >= RELOAD_DEBOUNCE);
        if !(self.pending && quiet) {
            return false;
        }
        self.pending = false;
        self.last_reload = Some(now);
        true
    }
}

/// Watches the config file and swaps the shared config when it changes.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    path: PathBuf,
    config: SharedConfig,
    debounce: Mutex<ReloadDebounce>,
}

impl ConfigWatcher {
    pub fn new(config: SharedConfig) -> notify::Result<Self> {
        Self::watch(get_config_path(), config)
    }

    /// Watches the directory holding `path`, creating it if needed.
    pub fn watch(path: PathBuf, config: SharedConfig) -> notify::Result<Self> {
        let (tx, events) = channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;

        let dir = path.parent().unwrap_or(&path).to_path_buf();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            log::debug!("Could not create config directory {:?}: {}", dir, e);
        }
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        log::info!("Watching {:?} for config changes", path);

        Ok(Self {
            _watcher: watcher,
            events,
            path,
            config,
            debounce: Mutex::new(ReloadDebounce::default()),
        })
    }

    fn touches_config(&self, event: &Event) -> bool {
        (event.kind.is_modify() || event.kind.is_create())
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == self.path.file_name())
    }

    /// Drains file events and reloads once the debounce window allows.
    /// Returns true if the shared config was replaced.
    pub fn check_and_reload(&self) -> bool {
        let Ok(mut debounce) = self.debounce.lock() else {
            return false;
        };
        for event in self.events.try_iter() {
            match event {
                Ok(event) if self.touches_config(&event) => debounce.mark_changed(),
                Ok(_) => {}
                Err(e) => log::error!("Config watch error: {}", e),
            }
        }
        if !debounce.take_ready(Instant::now()) {
            return false;
        }

        log::info!("Config file changed, reloading");
        let reloaded = load_config_from(&self.path);
        match self.config.write() {
            Ok(mut config) => {
                *config = reloaded;
                true
            }
            Err(_) => {
                log::error!("Shared config lock poisoned, reload skipped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyguard::{AlarmSource, RegionId};
    use crate::locale::{ResourceKey, Resources};
    use std::io::Write;

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[status]\nlocale = \"zh_TW\"\nregions = [\"date\", \"alarm_status\"]")
            .unwrap();

        let config = load_config_from(file.path());
        assert_eq!(config.locale(), Locale::new("zh", "TW"));
        assert_eq!(
            config.layout().regions(),
            &[RegionId::Date, RegionId::AlarmStatus]
        );
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[status]\nregions = [\"clock\"]").unwrap();

        let config = load_config_from(file.path());
        assert_eq!(config.status.regions.len(), 4);
    }

    #[test]
    fn unparseable_config_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[status\nlocale = ").unwrap();
        let config = load_config_from(file.path());
        assert!(config.status.locale.is_none());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml"));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn resources_apply_overrides() {
        let config: Config = toml::from_str(
            "[status]\nlocale = \"en_US\"\n[resources]\nabbrev_wday_month_day_no_year = \"%d.%m\"\n",
        )
        .unwrap();
        let resources = config.resources();
        assert_eq!(
            resources.string(ResourceKey::AbbrevWdayMonthDayNoYear).as_deref(),
            Some("%d.%m")
        );
    }

    #[test]
    fn alarm_store_reads_configured_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Mon 6:00").unwrap();
        let config = Config {
            alarm: AlarmConfig {
                file: Some(file.path().to_string_lossy().into_owned()),
            },
            ..Config::default()
        };
        assert_eq!(
            config.alarm_store().next_alarm().unwrap().as_deref(),
            Some("Mon 6:00")
        );
    }

    #[test]
    fn first_change_reloads_immediately() {
        let mut debounce = ReloadDebounce::default();
        let start = Instant::now();
        assert!(!debounce.take_ready(start));

        debounce.mark_changed();
        assert!(debounce.take_ready(start));
        assert!(!debounce.take_ready(start));
    }

    #[test]
    fn change_inside_window_waits_for_it() {
        let mut debounce = ReloadDebounce::default();
        let start = Instant::now();
        debounce.mark_changed();
        assert!(debounce.take_ready(start));

        debounce.mark_changed();
        assert!(!debounce.take_ready(start + Duration::from_millis(100)));
        assert!(debounce.take_ready(start + RELOAD_DEBOUNCE));
        assert!(!debounce.take_ready(start + RELOAD_DEBOUNCE * 3));
    }

    #[test]
    fn watcher_reloads_from_its_own_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let shared: SharedConfig = Arc::new(RwLock::new(Config::default()));
        let watcher = ConfigWatcher::watch(path.clone(), Arc::clone(&shared)).unwrap();

        std::fs::write(&path, "[status]\nlocale = \"zh_CN\"\n").unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !watcher.check_and_reload() {
            assert!(Instant::now() < deadline, "no reload after write");
            std::thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(
            shared.read().unwrap().status.locale.as_deref(),
            Some("zh_CN")
        );
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/tmp/alarm"), PathBuf::from("/tmp/alarm"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/alarm"), home.join("alarm"));
        }
    }
}
