//! CLI argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};

use atmwatch_core::{AckFilter, AlertQuery, AlertType, Severity, SortMode};

#[derive(Parser)]
#[command(
    name = "atmwatch",
    about = "Role-aware monitor for ATM Guard security backends",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalOpts {
    /// Configuration profile to use.
    #[arg(long, short = 'p', global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides the profile).
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Output format.
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Skip TLS certificate verification.
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    JsonCompact,
    Yaml,
    Plain,
}

#[derive(Subcommand)]
pub enum Command {
    /// Authenticate and persist the session token.
    Login(LoginArgs),

    /// Drop the persisted session token.
    Logout,

    /// Device operations.
    Devices(DevicesArgs),

    /// Alert operations.
    Alerts(AlertsArgs),

    /// Remote buzzer control.
    Buzzer(BuzzerArgs),

    /// Show the user-activity audit log.
    Activity,

    /// Show the aggregate threat summary for the session role.
    Status,

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

// ── Login ───────────────────────────────────────────────────────────

#[derive(Args)]
pub struct LoginArgs {
    /// Username (defaults to the profile's username).
    #[arg(long, short = 'u')]
    pub username: Option<String>,
}

// ── Devices ─────────────────────────────────────────────────────────

#[derive(Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Subcommand)]
pub enum DevicesCommand {
    /// List devices with their live state.
    List,
    /// Show one device in detail.
    Show { device_id: String },
}

// ── Alerts ──────────────────────────────────────────────────────────

#[derive(Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Subcommand)]
pub enum AlertsCommand {
    /// List alerts visible to the session role.
    List(AlertListArgs),
    /// Acknowledge an alert.
    Ack { alert_id: String },
    /// Archive an alert.
    Archive { alert_id: String },
}

#[derive(Args)]
pub struct AlertListArgs {
    /// Severity floor: keeps the chosen band and everything below it.
    #[arg(long, value_enum)]
    pub severity: Option<SeverityArg>,

    /// Acknowledgment status filter.
    #[arg(long, value_enum, default_value_t = StatusArg::All)]
    pub status: StatusArg,

    /// Exact alert-type filter.
    #[arg(long = "type", value_enum)]
    pub alert_type: Option<TypeArg>,

    /// Case-insensitive search over message, device id, and type.
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort order.
    #[arg(long, value_enum, default_value_t = SortArg::Newest)]
    pub sort: SortArg,
}

impl AlertListArgs {
    pub fn to_query(&self) -> AlertQuery {
        AlertQuery {
            search: self.search.clone().unwrap_or_default(),
            min_severity: self.severity.map(SeverityArg::to_severity),
            ack: self.status.to_filter(),
            alert_type: self.alert_type.map(TypeArg::to_alert_type),
            sort: self.sort.to_mode(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityArg {
    pub fn to_severity(self) -> Severity {
        match self {
            Self::Low => Severity::Low,
            Self::Medium => Severity::Medium,
            Self::High => Severity::High,
            Self::Critical => Severity::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    All,
    Unacknowledged,
    Acknowledged,
}

impl StatusArg {
    pub fn to_filter(self) -> AckFilter {
        match self {
            Self::All => AckFilter::All,
            Self::Unacknowledged => AckFilter::Unacknowledged,
            Self::Acknowledged => AckFilter::Acknowledged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    Motion,
    Vibration,
    Fire,
    CameraTamper,
    HumanDetected,
    Unknown,
}

impl TypeArg {
    pub fn to_alert_type(self) -> AlertType {
        match self {
            Self::Motion => AlertType::Motion,
            Self::Vibration => AlertType::Vibration,
            Self::Fire => AlertType::Fire,
            Self::CameraTamper => AlertType::CameraTamper,
            Self::HumanDetected => AlertType::HumanDetected,
            Self::Unknown => AlertType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Newest,
    Oldest,
    Severity,
}

impl SortArg {
    pub fn to_mode(self) -> SortMode {
        match self {
            Self::Newest => SortMode::Newest,
            Self::Oldest => SortMode::Oldest,
            Self::Severity => SortMode::Severity,
        }
    }
}

// ── Buzzer ──────────────────────────────────────────────────────────

#[derive(Args)]
pub struct BuzzerArgs {
    #[command(subcommand)]
    pub command: BuzzerCommand,
}

#[derive(Subcommand)]
pub enum BuzzerCommand {
    /// Sound the buzzer on a device.
    On { device_id: String },
    /// Silence the buzzer on a device.
    Off { device_id: String },
}

// ── Completions ─────────────────────────────────────────────────────

#[derive(Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
