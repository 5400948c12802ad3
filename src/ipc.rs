//! IPC command types, global command bus, and Unix socket listener.
//!
//! Commands are parsed on the listener thread, pushed onto an async channel
//! and drained by the gpui app task. `status` is answered directly from the
//! last snapshot the widget published.

use async_channel::{Receiver, Sender};
use serde::Serialize;
use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::Duration;

use crate::keyguard::StatusDisplay;

/// An IPC command destined for the gpui main thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcCommand {
    /// Deliver a "time changed" event.
    Refresh,
    /// Keyguard became visible.
    Show,
    /// Keyguard became hidden.
    Hide,
    /// Set (or clear, with `None`) the next alarm text and redraw the alarm line.
    SetAlarm(Option<String>),
}

/// Async channel pair for IPC → gpui communication.
struct IpcCommandBus {
    tx: Sender<IpcCommand>,
    rx: Receiver<IpcCommand>,
}

static IPC_COMMAND_BUS: OnceLock<IpcCommandBus> = OnceLock::new();

fn command_bus() -> &'static IpcCommandBus {
    IPC_COMMAND_BUS.get_or_init(|| {
        let (tx, rx) = async_channel::unbounded();
        IpcCommandBus { tx, rx }
    })
}

/// Returns a receiver for the app's drain loop.
pub fn subscribe_ipc_commands() -> Receiver<IpcCommand> {
    command_bus().rx.clone()
}

fn push_ipc_command(cmd: IpcCommand) {
    let _ = command_bus().tx.try_send(cmd);
}

// ---------------------------------------------------------------------------
// Status snapshot (for `status` command)
// ---------------------------------------------------------------------------

/// Displayed state of the widget, as reported by `status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub widget_id: i32,
    pub locale: String,
    pub clock: Option<String>,
    pub date: Option<String>,
    pub long_date: Option<String>,
    pub lunar_date: Option<String>,
    pub alarm: Option<String>,
    pub alarm_visible: bool,
    pub upper_case: bool,
    pub attached: bool,
}

impl StatusSnapshot {
    pub fn capture(display: &StatusDisplay) -> Self {
        let alarm = display.alarm_region();
        Self {
            widget_id: display.app_widget_id(),
            locale: display.locale().to_string(),
            clock: display.clock().map(|c| match c.am_pm() {
                Some(marker) => format!("{} {}", c.time(), marker),
                None => c.time().to_string(),
            }),
            date: display.date_region().text().map(str::to_string),
            long_date: display.long_date(),
            lunar_date: display
                .lunar_region()
                .and_then(|r| r.text())
                .map(str::to_string),
            alarm: alarm
                .is_visible()
                .then(|| alarm.text().map(str::to_string))
                .flatten(),
            alarm_visible: alarm.is_visible(),
            upper_case: display.options().upper_case,
            attached: display.is_attached(),
        }
    }
}

static STATUS_SNAPSHOT: OnceLock<Mutex<Option<StatusSnapshot>>> = OnceLock::new();

fn snapshot_slot() -> &'static Mutex<Option<StatusSnapshot>> {
    STATUS_SNAPSHOT.get_or_init(|| Mutex::new(None))
}

/// Records the widget's current state (called after each refresh).
pub fn publish_snapshot(snapshot: StatusSnapshot) {
    if let Ok(mut slot) = snapshot_slot().lock() {
        *slot = Some(snapshot);
    }
}

fn current_snapshot() -> Option<StatusSnapshot> {
    snapshot_slot().lock().ok().and_then(|slot| slot.clone())
}

// ---------------------------------------------------------------------------
// Command parsing
// ---------------------------------------------------------------------------

/// Parses a single command line into an [`IpcCommand`].
pub fn parse_command(command: &str) -> Result<IpcCommand, String> {
    let trimmed = command.trim();
    let (verb, rest) = match trimmed.split_once(' ') {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };

    match verb {
        "refresh" => Ok(IpcCommand::Refresh),
        "show" => Ok(IpcCommand::Show),
        "hide" => Ok(IpcCommand::Hide),
        "alarm" => Ok(IpcCommand::SetAlarm(
            (!rest.is_empty()).then(|| unquote(rest).to_string()),
        )),
        "" => Err("ERR: empty command".to_string()),
        other => Err(format!("ERR: unknown command '{}'", other)),
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parses and dispatches a single IPC command string, returning a response.
pub fn handle_ipc_command(command: &str) -> String {
    if command.trim() == "status" {
        return status_json();
    }
    match parse_command(command) {
        Ok(cmd) => {
            log::debug!("IPC: {:?}", cmd);
            push_ipc_command(cmd);
            "OK".to_string()
        }
        Err(err) => err,
    }
}

fn status_json() -> String {
    let status = serde_json::json!({
        "version": crate::VERSION,
        "running": true,
        "widget": current_snapshot(),
    });
    status.to_string()
}

// ---------------------------------------------------------------------------
// Unix socket listener
// ---------------------------------------------------------------------------

/// How long a client may take to send its command line.
const CLIENT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Binds `socket_path` and answers clients on a background thread.
///
/// Exits the process if another instance already owns the socket.
pub fn start_ipc_listener(socket_path: &Path) -> io::Result<()> {
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let listener = bind_socket(socket_path)?;
    log::info!("IPC listening on {:?}", socket_path);

    thread::Builder::new()
        .name("ipc-listener".to_string())
        .spawn(move || accept_clients(listener))?;
    Ok(())
}

fn bind_socket(socket_path: &Path) -> io::Result<UnixListener> {
    match UnixListener::bind(socket_path) {
        Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
            if UnixStream::connect(socket_path).is_ok() {
                eprintln!("keyguard-status is already running.");
                std::process::exit(0);
            }
            log::debug!("Replacing stale socket {:?}", socket_path);
            let _ = std::fs::remove_file(socket_path);
            UnixListener::bind(socket_path)
        }
        bound => bound,
    }
}

/// One thread per client, so a stalled client never blocks the others.
fn accept_clients(listener: UnixListener) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("IPC accept failed: {}", e);
                continue;
            }
        };
        let spawned = thread::Builder::new()
            .name("ipc-client".to_string())
            .spawn(move || {
                if let Err(e) = serve_client(stream, CLIENT_READ_TIMEOUT) {
                    log::debug!("IPC client dropped: {}", e);
                }
            });
        if let Err(e) = spawned {
            log::warn!("Failed to spawn IPC client thread: {}", e);
        }
    }
}

/// Reads one command line and writes back one response line.
fn serve_client(stream: UnixStream, timeout: Duration) -> io::Result<()> {
    stream.set_read_timeout(Some(timeout))?;
    let mut reply = stream.try_clone()?;
    let mut line = String::new();
    BufReader::new(stream).read_line(&mut line)?;
    writeln!(reply, "{}", handle_ipc_command(&line))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
