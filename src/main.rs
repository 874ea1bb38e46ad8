//! creditline - status line for AI coding tools
//!
//! Prints mirror credits, plan, model and git context on one line. Designed to
//! be re-run on every status refresh: the config file caches credit data for
//! 30 seconds so most invocations never touch the network.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use directories::BaseDirs;
use tracing_subscriber::EnvFilter;

use creditline::app::App;
use creditline::cli::{parse_cookie_arg, Cli, Command};
use creditline::data::HttpFetcher;
use creditline::settings::{process_env, Settings};

/// Sets up logging on stderr so stdout only ever carries the status line
///
/// Silent unless `RUST_LOG` is set or `--verbose` is passed.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("creditline=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = cli.config_store(process_env)?;
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let home = BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| cwd.clone());
    let settings = Settings::resolve(&cwd, &home, process_env);

    let app = App::new(HttpFetcher::new(), store, settings, cwd);

    match cli.command() {
        Command::Status => {
            println!("{}", app.status_line().await);
        }
        Command::Refresh => {
            // Runs as a hook: stay silent whatever happens
            app.refresh().await;
        }
        Command::SaveCookie { cookie, verify } => {
            let cookie = match parse_cookie_arg(&cookie) {
                Ok(cookie) => cookie,
                Err(e) => {
                    eprintln!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            };
            app.save_cookie(&cookie)?;
            println!("Cookie saved to {}", app.config_path().display());
            println!("Cookie length: {} characters", cookie.chars().count());

            if verify {
                let refreshed = app.refresh().await;
                println!("Test result: {}", app.status_line().await);
                if !refreshed {
                    println!("Could not fetch credits with this cookie; it is saved anyway");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Usage => match app.usage_report().await {
            Some(report) => println!("{}", report),
            None => {
                eprintln!("No usage data available (is a cookie saved?)");
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
