//! Clap derive structures for the `vigil` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vigil -- console for monitored locations and VPN clients
#[derive(Debug, Parser)]
#[command(
    name = "vigil",
    version,
    about = "Administer monitored locations, VPN clients and URL profiles",
    long_about = "A command-line console for a location monitoring backend.\n\n\
        Shows which locations and clients are online, manages users,\n\
        locations, clients and URL profiles, and renders each location's\n\
        quick links from its URL profile.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "VIGIL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend API URL (overrides profile)
    #[arg(long, short = 'u', env = "VIGIL_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VIGIL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "VIGIL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "VIGIL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and remember the session for this profile
    Login(LoginArgs),

    /// End the session for this profile
    Logout,

    /// Show who is logged in
    Whoami,

    /// Show every location with its status and quick links
    #[command(alias = "home")]
    Links(ListArgs),

    /// Manage console users (admin)
    Users(UsersArgs),

    /// Manage monitored locations (admin)
    #[command(alias = "loc")]
    Locations(LocationsArgs),

    /// Manage VPN clients (admin)
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Manage URL profiles (admin)
    #[command(alias = "up")]
    UrlProfiles(UrlProfilesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Shared arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Keep polling and redraw on every change (Ctrl-C to stop)
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Refresh interval while watching (e.g. "1s", "500ms")
    #[arg(long, value_parser = parse_interval, requires = "watch")]
    pub interval: Option<Duration>,
}

/// Where a downloaded file goes.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Output file ("-" for stdout; default derived from the name)
    #[arg(long, short = 'O')]
    pub out: Option<PathBuf>,
}

/// Parse a human duration such as "1s", "250ms" or "2m".
pub fn parse_interval(raw: &str) -> Result<Duration, String> {
    let interval = humantime::parse_duration(raw).map_err(|e| e.to_string())?;
    if interval.is_zero() {
        return Err("interval must be greater than zero".into());
    }
    Ok(interval)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (default: profile username or VIGIL_USERNAME)
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Admin,
    Normal,
}

impl RoleArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Normal => "normal",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List console users
    #[command(alias = "ls")]
    List(ListArgs),

    /// Create a user (prompts for the password)
    #[command(alias = "create")]
    Add {
        /// Username (4-20 letters, digits or underscores)
        username: String,

        /// Role to grant
        #[arg(long, short = 'r', value_enum, default_value = "normal")]
        role: RoleArg,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Change a user's name, role or password
    Update {
        /// User ID or username
        user: String,

        /// New username
        #[arg(long)]
        username: Option<String>,

        /// New role
        #[arg(long, short = 'r', value_enum)]
        role: Option<RoleArg>,

        /// Prompt for a new password
        #[arg(long, conflicts_with = "password_stdin")]
        password: bool,

        /// Read the new password from stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        /// User ID or username
        user: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOCATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LocationsArgs {
    #[command(subcommand)]
    pub command: LocationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocationsCommand {
    /// List locations with their online status
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one location
    Get {
        /// Location ID or name
        location: String,
    },

    /// Create a location
    #[command(alias = "create")]
    Add {
        /// Location name
        name: String,

        /// URL profile whose links apply to this location
        #[arg(long)]
        url_profile: String,

        /// Create the location disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Change a location
    Update {
        /// Location ID or name
        location: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New URL profile
        #[arg(long)]
        url_profile: Option<String>,

        /// Enable or disable the location
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: Option<bool>,
    },

    /// Delete a location
    #[command(alias = "rm")]
    Delete {
        /// Location ID or name
        location: String,
    },

    /// Download the location's QR code (PNG)
    Qrcode {
        /// Location ID or name
        location: String,

        #[command(flatten)]
        download: DownloadArgs,
    },

    /// Download the location's configuration file
    #[command(name = "config")]
    Configuration {
        /// Location ID or name
        location: String,

        #[command(flatten)]
        download: DownloadArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List VPN clients with their online status
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one client
    Get {
        /// Client ID or name
        client: String,
    },

    /// Create a client
    #[command(alias = "create")]
    Add {
        /// Client name
        name: String,
    },

    /// Rename a client
    Update {
        /// Client ID or name
        client: String,

        /// New name
        #[arg(long)]
        name: String,
    },

    /// Delete a client
    #[command(alias = "rm")]
    Delete {
        /// Client ID or name
        client: String,
    },

    /// Download the client's QR code (PNG)
    Qrcode {
        /// Client ID or name
        client: String,

        #[command(flatten)]
        download: DownloadArgs,
    },

    /// Download the client's configuration file
    #[command(name = "config")]
    Configuration {
        /// Client ID or name
        client: String,

        #[command(flatten)]
        download: DownloadArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  URL PROFILES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UrlProfilesArgs {
    #[command(subcommand)]
    pub command: UrlProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum UrlProfilesCommand {
    /// List URL profiles
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one URL profile and its templates
    Get {
        /// Profile name
        name: String,
    },

    /// Create a URL profile
    #[command(alias = "create")]
    Add {
        /// Profile name
        #[arg(required_unless_present = "from_file")]
        name: Option<String>,

        /// Link template as NAME=TEMPLATE; "{ip}" is replaced by the
        /// location's address (repeatable)
        #[arg(long = "url", value_name = "NAME=TEMPLATE")]
        urls: Vec<String>,

        /// Read the whole profile from a JSON file
        #[arg(long, short = 'F', conflicts_with_all = ["name", "urls"])]
        from_file: Option<PathBuf>,
    },

    /// Replace a URL profile's name or templates
    Update {
        /// Current profile name
        name: String,

        /// New profile name
        #[arg(long)]
        rename: Option<String>,

        /// Replacement templates as NAME=TEMPLATE (repeatable)
        #[arg(long = "url", value_name = "NAME=TEMPLATE")]
        urls: Vec<String>,

        /// Read the replacement profile from a JSON file
        #[arg(long, short = 'F', conflicts_with_all = ["rename", "urls"])]
        from_file: Option<PathBuf>,
    },

    /// Delete a URL profile
    #[command(alias = "rm")]
    Delete {
        /// Profile name
        name: String,
    },

    /// Upload a profile export file
    Import {
        /// File produced by `url-profiles export`
        file: PathBuf,
    },

    /// Download all profiles as an export file
    Export {
        #[command(flatten)]
        download: DownloadArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn interval_parses_human_durations() {
        assert_eq!(parse_interval("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_interval("2s"), Ok(Duration::from_secs(2)));
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("soon").is_err());
    }
}
