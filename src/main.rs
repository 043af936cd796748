//! gts - stack-aware sync and submit for gt
//!
//! CLI binary. `sync` and `submit` are handled here; every other command is
//! forwarded to the stacking tool.

use anyhow::{Context, Result};
use gt_stack::config::Settings;
use gt_stack::router::{route, Invocation};
use std::ffi::OsString;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::style::Stylize;

/// Environment variable holding the log filter
const LOG_ENV: &str = "GT_STACK_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Vec<OsString>) -> Result<u8> {
    // Route before touching config or git so bad flags fail without side effects
    let invocation = route(&args)?;

    // A broken config file must not lock the user out of the stacking tool
    let settings = match invocation {
        Invocation::Sync(_) | Invocation::Submit(_) => {
            Settings::load().context("loading configuration")?
        }
        _ => Settings::load_or_default(),
    };
    let session = cli::Session::new(settings);

    match invocation {
        Invocation::Sync(request) => cli::run_sync(&session, request).await?,
        Invocation::Submit(request) => cli::run_submit(&session, request).await?,
        Invocation::Usage => cli::run_usage(&session).await,
        Invocation::Version => cli::run_version(&session).await,
        Invocation::CommandHelp(help) => anstream::println!("{help}"),
        Invocation::PassThrough(args) => {
            let code = cli::run_pass_through(&session, &args).await?;
            return Ok(u8::try_from(code).unwrap_or(1));
        }
    }

    Ok(0)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let domain = err.downcast_ref::<gt_stack::Error>();
            match domain {
                Some(gt_stack::Error::Argument(msg)) => anstream::eprintln!("{msg}"),
                _ => anstream::eprintln!("{}: {err:#}", "error".error()),
            }
            ExitCode::from(domain.map_or(1, gt_stack::Error::exit_code))
        }
    }
}
