//! Terminal front end for Vitalis account workflows
//!
//! Drives the headless controllers in `vitalis-app` with production handlers:
//! forgot-password reset, one-time code verification after sign-up, and a
//! signed-in password change.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vitalis_app::{ContextPatch, CredentialUpdateGateway, RecoveryContext, StepEffects, WorkflowTiming};
use vitalis_core::{NavigationPayload, Origin, Route};
use vitalis_effects::{
    EnvTokenStore, FallbackTokenStore, FileTokenStore, ReqwestHttpClient, TokioTimerHandler,
    VitalisConfig,
};

mod host;
mod navigator;
mod prompt;

use host::{Flow, Host};
use navigator::ChannelNavigator;
use prompt::Prompt;

#[derive(Parser)]
#[command(name = "vitalis")]
#[command(about = "Vitalis - account recovery and verification", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset a forgotten password
    Reset,

    /// Enter a one-time code
    Verify {
        /// Workflow the code belongs to
        #[arg(long, value_enum, default_value_t = OriginArg::Signup)]
        origin: OriginArg,

        /// Account email, if known
        #[arg(long)]
        email: Option<String>,
    },

    /// Change the password of the signed-in account
    ChangePassword,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OriginArg {
    Signup,
    ForgotPassword,
}

impl From<OriginArg> for Origin {
    fn from(arg: OriginArg) -> Self {
        match arg {
            OriginArg::Signup => Origin::SignUp,
            OriginArg::ForgotPassword => Origin::ForgotPassword,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.config.clone().or_else(VitalisConfig::default_path) {
        Some(path) => VitalisConfig::load(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => VitalisConfig::default(),
    };
    tracing::debug!(base_url = %config.client.base_url, "configuration ready");

    let (flow, start, arrival) = match cli.command {
        Commands::Reset => (Flow::Reset, Route::ForgotPassword, None),
        Commands::Verify { origin, email } => {
            let origin = Origin::from(origin);
            let patch = ContextPatch { email, otp: None };
            let flow = match origin {
                Origin::SignUp => Flow::SignUp,
                _ => Flow::Reset,
            };
            let arrival = RecoveryContext::create(origin, patch).to_payload();
            (flow, Route::VerifyOtp, Some(arrival))
        }
        Commands::ChangePassword => (Flow::Change, Route::SetNewPassword, None),
    };

    let finished = run(&config, flow, start, arrival).await?;
    tracing::info!(route = %finished, "workflow finished");
    Ok(())
}

async fn run(
    config: &VitalisConfig,
    flow: Flow,
    start: Route,
    arrival: Option<NavigationPayload>,
) -> Result<Route> {
    let mut tokens = FallbackTokenStore::new().with(EnvTokenStore::default());
    if let Some(path) = config.client.token_path.clone().or_else(FileTokenStore::default_path) {
        tokens = tokens.with(FileTokenStore::new(path));
    }
    let http = ReqwestHttpClient::from_config(&config.client, Arc::new(tokens))?;

    let (navigator, routes) = ChannelNavigator::new(arrival);
    let effects = StepEffects::new(Arc::new(navigator), Arc::new(TokioTimerHandler::new()));
    let timing = WorkflowTiming {
        otp_success_delay: config.timing.otp_success_delay(),
        password_success_delay: config.timing.password_success_delay(),
    };

    let host = Host {
        effects,
        gateway: Arc::new(CredentialUpdateGateway::new(Arc::new(http))),
        timing,
        routes,
        prompt: Prompt::stdin(),
        flow,
    };
    host.run(start).await
}
