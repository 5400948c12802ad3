// Allow complex types in internal code
#![allow(clippy::type_complexity)]
// Allow functions with many arguments for now
#![allow(clippy::too_many_arguments)]

mod config;
mod gpui_app;
mod ipc;
mod keyguard;
mod locale;
mod lunar;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn socket_path() -> std::path::PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    std::path::PathBuf::from(runtime_dir).join("keyguard-status.sock")
}

/// Removes the Unix socket file on process exit.
fn install_socket_cleanup() {
    let socket = socket_path();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = std::fs::remove_file(&socket);
        std::process::exit(0);
    }) {
        log::warn!("Failed to install signal handler: {}", e);
    }
}

fn print_help() {
    println!(
        "keyguard-status {}
A lock-screen status widget: clock, date, lunar date and next alarm

USAGE:
    keyguard-status [OPTIONS]

OPTIONS:
    -h, --help       Print this help message
    -v, --version    Print version information

ENVIRONMENT:
    RUST_LOG         Set log level (error, warn, info, debug, trace)
    LC_ALL, LC_TIME, LANG
                     Locale used when status.locale is not configured

CONFIG:
    ~/.config/keyguard-status/config.toml

EXAMPLES:
    keyguard-status                     Run with default config
    RUST_LOG=debug keyguard-status      Run with debug logging
    keyguard-msg alarm \"Mon 7:00 AM\"    Set the next alarm text",
        VERSION
    );
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if !args.is_empty() {
        // Only the first argument is processed (flags don't combine)
        match args[0].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-v" | "--version" => {
                println!("keyguard-status {}", VERSION);
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[0]);
                eprintln!("Try 'keyguard-status --help' for more information.");
                std::process::exit(1);
            }
        }
    }

    // Initialize logging (flush each line for interactive debugging).
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    logger
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {:>5} {}] {}",
                chrono::Utc::now().to_rfc3339(),
                record.level(),
                record.target(),
                record.args()
            )?;
            buf.flush()
        })
        .init();

    log::info!("Starting keyguard-status v{}", VERSION);

    let socket = socket_path();
    if let Err(err) = ipc::start_ipc_listener(&socket) {
        log::warn!("Failed to start IPC listener: {}", err);
    }
    install_socket_cleanup();

    if let Err(err) = gpui_app::run() {
        log::error!("Status widget layout is invalid: {}", err);
        let _ = std::fs::remove_file(&socket);
        std::process::exit(1);
    }
}
