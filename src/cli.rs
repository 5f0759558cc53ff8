use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "inspections", version, about = "PA restaurant inspections agent")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = ".env",
        help = "Env file holding storage and API credentials"
    )]
    pub env_file: String,
    #[arg(
        long,
        global = true,
        default_value = "settings.yaml",
        help = "Pipeline settings file (compiled-in defaults when absent)"
    )]
    pub settings: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline once and exit
    Run {
        #[arg(long, value_enum, default_value_t = TriggerArg::Manual)]
        trigger: TriggerArg,
    },
    /// Run as a daemon, firing daily at the configured UTC time
    Schedule,
    /// Emit a single keepalive log line and exit
    Keepalive,
    /// Verify credentials and settings without running the pipeline
    Preflight,
}

#[derive(ValueEnum, Copy, Clone, Debug)]
pub enum TriggerArg {
    Manual,
    Push,
}
