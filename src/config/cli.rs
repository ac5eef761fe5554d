//! Command-line argument parsing

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[clap(name = "tap-control", version, author)]
#[clap(about = "Control plane for a portable network-interception tap")]
pub struct CliArgs {
    /// Path to the TOML settings file
    #[clap(short, long, default_value = "/etc/tap-control/config.toml")]
    pub config: PathBuf,

    /// Wireless uplink interface name (overrides the settings file)
    #[clap(short, long)]
    pub interface: Option<String>,

    /// Path for the control Unix socket (overrides the settings file)
    #[clap(long)]
    pub socket_path: Option<String>,
}
