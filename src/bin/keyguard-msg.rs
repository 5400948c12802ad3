//! Sends one command to a running keyguard-status and prints its reply.

use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

const USAGE: &str = "\
Usage: keyguard-msg <command> [args...]

Commands:
  refresh          Deliver a time-changed event
  show             Keyguard became visible (refreshes)
  hide             Keyguard became hidden
  alarm <text>     Set the next alarm text
  alarm            Clear the next alarm
  status           Print the widget state as JSON";

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

fn socket_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("keyguard-status.sock")
}

/// Writes `command` as one line and returns the trimmed reply line.
fn request(socket: &Path, command: &str) -> io::Result<String> {
    let mut stream = UnixStream::connect(socket)?;
    stream.set_read_timeout(Some(REPLY_TIMEOUT))?;
    writeln!(stream, "{}", command)?;

    let mut reply = String::new();
    BufReader::new(stream).read_line(&mut reply)?;
    Ok(reply.trim().to_string())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    }

    let socket = socket_path();
    match request(&socket, &args.join(" ")) {
        Ok(reply) => {
            println!("{}", reply);
            if reply.starts_with("ERR") {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound
            || e.kind() == io::ErrorKind::ConnectionRefused =>
        {
            eprintln!("keyguard-status is not running ({:?}: {})", socket, e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("keyguard-msg: {}", e);
            ExitCode::FAILURE
        }
    }
}
