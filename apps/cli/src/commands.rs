//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use contactaudit_core::pipeline::{
    ProgressReporter, ReportOptions, ReportOutcome, build_missing_contact_report,
};
use contactaudit_heart::{HeartClient, HeartCredentials};
use contactaudit_lgl::LglClient;
use contactaudit_shared::{AppConfig, AuditError, init_config, load_config, resolve_credential};
use dialoguer::{Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// contactaudit: report HEART contacts missing from Little Green Light.
#[derive(Parser)]
#[command(
    name = "contactaudit",
    version,
    about = "Report HEART contacts whose name, email, or phone is missing from Little Green Light.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `run` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Pull HEART and LGL, reconcile, and write the missing-contact report.
    Run(RunArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Default)]
pub(crate) struct RunArgs {
    /// Directory for the report (defaults to report.output_dir).
    #[arg(short, long)]
    pub out: Option<String>,

    /// Authenticate against the HEART sandbox org.
    #[arg(long)]
    pub sandbox: bool,

    /// One-time HEART OAuth2 access code (prompted if absent).
    #[arg(long, env = "HEART_ACCESS_CODE", hide_env_values = true)]
    pub access_code: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "contactaudit=info",
        1 => "contactaudit=debug",
        _ => "contactaudit=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => cmd_run(args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

async fn cmd_run(args: RunArgs) -> Result<()> {
    let config = load_config()?;

    let lgl_token = resolve_or_prompt(
        &config.lgl.token_env,
        "LGL API token",
        "Enter your LGL API Token",
    )?;
    let lgl = LglClient::from_config(&config.lgl, Some(&lgl_token))?;

    let credentials = heart_credentials(&config, &args)?;
    let heart = HeartClient::connect(&credentials, &config.heart.api_version)
        .await
        .wrap_err("could not authenticate with HEART")?;

    let output_dir = args
        .out
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.report.output_dir));
    let options = ReportOptions::today(output_dir);

    info!(
        lgl = %lgl.base_url(),
        sandbox = credentials.sandbox,
        "building missing contact report"
    );

    let reporter = CliProgress::new();
    let outcome = build_missing_contact_report(&heart, &lgl, &options, &reporter).await?;

    println!();
    match &outcome.report_path {
        Some(path) => println!("  Wrote the report to {}", path.display()),
        None => println!("  Failed to write the report to CSV."),
    }
    println!("  HEART contacts:    {}", outcome.contact_count);
    println!("  LGL constituents:  {}", outcome.constituent_count);
    println!("  Flagged contacts:  {}", outcome.rows.len());
    println!("  Time:              {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    Ok(())
}

/// Gather HEART credentials: env/config first, prompting for whatever is left.
fn heart_credentials(config: &AppConfig, args: &RunArgs) -> Result<HeartCredentials> {
    let client_id = resolve_or_prompt(
        &config.heart.consumer_key_env,
        "HEART consumer key",
        "Enter the HEART consumer key",
    )?;
    let client_secret = resolve_or_prompt(
        &config.heart.consumer_secret_env,
        "HEART consumer secret",
        "Enter the HEART consumer secret",
    )?;

    // Bare `contactaudit` skips clap's env lookup, so check it here too.
    let access_code =
        match resolve_credential(args.access_code.as_deref(), "HEART_ACCESS_CODE", "access code") {
            Ok(code) => code,
            Err(_) => Input::<String>::new()
                .with_prompt("Enter your access code")
                .interact_text()?,
        };

    let sandbox = if args.sandbox {
        true
    } else {
        match config.heart.sandbox {
            Some(sandbox) => sandbox,
            None => Confirm::new()
                .with_prompt("Is this a sandbox account?")
                .default(false)
                .interact()?,
        }
    };

    Ok(HeartCredentials {
        client_id,
        client_secret,
        access_code,
        redirect_uri: config.heart.redirect_uri.clone(),
        sandbox,
    })
}

/// Resolve a secret from the environment, falling back to a hidden prompt.
fn resolve_or_prompt(env_var: &str, name: &str, prompt: &str) -> Result<String> {
    match resolve_credential(None, env_var, name) {
        Ok(value) => Ok(value),
        Err(AuditError::MissingCredential { .. }) => {
            info!(env_var, "credential not set, prompting");
            Ok(Password::new().with_prompt(prompt).interact()?)
        }
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn constituent_processed(&self, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Processing constituent {current}/{total}"));
    }

    fn done(&self, _outcome: &ReportOutcome) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
