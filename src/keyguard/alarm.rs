//! Lock-policy service: the formatted next alarm and widget identity.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Host-side id of the default status widget.
pub const ID_DEFAULT_STATUS_WIDGET: i32 = -2;

#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("failed to read next alarm from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("alarm store lock poisoned")]
    Poisoned,
}

/// Provides the display string of the next scheduled alarm.
pub trait AlarmSource: Send {
    /// `Ok(None)` or an empty string both mean no alarm is scheduled.
    fn next_alarm(&self) -> Result<Option<String>, AlarmError>;
}

/// In-memory alarm string shared between the IPC thread and the widget.
///
/// A value set here wins; when cleared, the optional backing file is read.
#[derive(Debug, Clone, Default)]
pub struct AlarmStore {
    next: Arc<RwLock<Option<String>>>,
    file: Option<AlarmFile>,
}

impl AlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backed_by(file: AlarmFile) -> Self {
        Self {
            next: Arc::default(),
            file: Some(file),
        }
    }

    pub fn set(&self, alarm: Option<String>) {
        let alarm = alarm.filter(|s| !s.trim().is_empty());
        if let Ok(mut guard) = self.next.write() {
            *guard = alarm;
        }
    }

    pub fn clear(&self) {
        self.set(None);
    }
}

impl AlarmSource for AlarmStore {
    fn next_alarm(&self) -> Result<Option<String>, AlarmError> {
        let stored = self
            .next
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| AlarmError::Poisoned)?;
        match (stored, &self.file) {
            (Some(alarm), _) => Ok(Some(alarm)),
            (None, Some(file)) => file.next_alarm(),
            (None, None) => Ok(None),
        }
    }
}

/// Reads the formatted next alarm from a file written by the alarm app.
///
/// A missing file means no alarm; other I/O failures are errors.
#[derive(Debug, Clone)]
pub struct AlarmFile {
    path: PathBuf,
}

impl AlarmFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AlarmSource for AlarmFile {
    fn next_alarm(&self) -> Result<Option<String>, AlarmError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let line = contents.lines().next().unwrap_or("").trim();
                Ok((!line.is_empty()).then(|| line.to_string()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AlarmError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
