//! CLI definition using clap derive.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hooptrack", about = "basketball shooting session tracker")]
pub struct Cli {
    /// UDS socket path (default: $XDG_RUNTIME_DIR/hooptrack/hooptrackd.sock)
    #[arg(long, short = 's', global = true)]
    pub socket_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the daemon (control server + session polling loop)
    Daemon(DaemonOpts),
    /// Start a practice session
    Start,
    /// End the active session
    End,
    /// Print all session records (JSON)
    Stats,
    /// Show whether a session is running
    Status,
}

#[derive(clap::Args)]
pub struct DaemonOpts {
    /// Polling tick interval in milliseconds
    #[arg(long, default_value = "100")]
    pub tick_interval_ms: u64,

    /// Channel debounce cooldown in milliseconds
    #[arg(long, default_value = "2000")]
    pub cooldown_ms: u64,

    /// Rim distance threshold in meters
    #[arg(long, default_value = "0.5")]
    pub distance_threshold_m: f64,

    /// SQLite database path (default: $XDG_DATA_HOME/hooptrack/sessions.db)
    #[arg(long)]
    pub db_path: Option<String>,

    /// Use the simulated sensor rig instead of GPIO hardware
    #[arg(long)]
    pub simulate: bool,

    /// HC-SR04 trigger GPIO pin
    #[arg(long, default_value = "23")]
    pub trig_pin: u8,

    /// HC-SR04 echo GPIO pin
    #[arg(long, default_value = "24")]
    pub echo_pin: u8,

    /// PIR motion sensor GPIO pin
    #[arg(long, default_value = "16")]
    pub motion_pin: u8,
}

/// Default socket path using $USER for per-user isolation.
pub fn default_socket_path() -> String {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        return format!("{dir}/hooptrack/hooptrackd.sock");
    }
    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    format!("/tmp/hooptrack-{user}/hooptrackd.sock")
}

/// Default database path alongside other per-user data.
pub fn default_db_path() -> String {
    if let Ok(dir) = std::env::var("XDG_DATA_HOME") {
        return format!("{dir}/hooptrack/sessions.db");
    }
    if let Ok(home) = std::env::var("HOME") {
        return format!("{home}/.local/share/hooptrack/sessions.db");
    }
    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    format!("/tmp/hooptrack-{user}/sessions.db")
}
