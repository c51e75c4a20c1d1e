use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use reactive_coordinator::config::Config;
use reactive_coordinator::coordinator::{Coordinator, Navigator};
use reactive_coordinator::demo::{DemoAction, DemoDriver};
use reactive_coordinator::flows::{AppStep, HomeCoordinator, HomeStep, Screens};
use reactive_coordinator::host::HeadlessHost;
use reactive_coordinator::logging::init_tracing;

/// Play the sample home/login flows against a headless window.
#[derive(Debug, Parser)]
#[command(name = "coordinator-demo", version)]
struct Cli {
    /// Config file (default: the user config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma separated actions, e.g. "greet,version,ok,back".
    #[arg(long, value_delimiter = ',')]
    script: Option<Vec<String>>,

    /// Pause between actions in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading config")?;
    if let Some(script) = cli.script {
        config.demo.script = script;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.demo.step_delay_ms = delay_ms;
    }
    config.validate().context("validating config")?;

    init_tracing(&config.logging.filter);

    let actions = config.demo.actions()?;
    let delay = Duration::from_millis(config.demo.step_delay_ms);

    let host = HeadlessHost::new();
    let screens = Screens::new();
    let mut navigator = Navigator::new(host.clone());

    let home = HomeCoordinator::new(screens.clone(), config.demo.app_version.clone())
        .into_flow()
        .on_end_flow(|| tracing::info!("home flow ended"));
    navigator.start(home, AppStep::Home(HomeStep::Launch));
    println!("{}", host.describe());

    let driver = DemoDriver::new(host.clone(), screens);
    let printer = host.clone();
    let mut script = tokio::spawn(async move {
        for action in actions {
            tokio::time::sleep(delay).await;
            match driver.perform(&action) {
                Ok(()) => {}
                Err(err) => tracing::warn!(%action, error = %err, "action skipped"),
            }
            // Let the navigator react before printing.
            tokio::time::sleep(delay / 2).await;
            println!("> {}\n{}", action, printer.describe());
            if action == DemoAction::Close {
                break;
            }
        }
    });

    tokio::select! {
        _ = navigator.run() => {}
        result = &mut script => {
            result.context("demo script task")?;
            navigator.process_pending();
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            script.abort();
        }
    }

    println!(
        "{} coordinator(s) still alive\n{}",
        navigator.len(),
        host.describe()
    );
    Ok(())
}
