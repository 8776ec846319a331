//! One-shot reachability check.

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::config_path;
use crate::core::config::{Config, ProbeMethod};
use crate::core::probe::{PingProber, Prober, TcpProber};
use crate::ui::{format_secs, format_time};

/// Outcome of probing one address
#[derive(Debug)]
struct CheckResult {
    address: String,
    outcome: crate::Result<bool>,
    elapsed: Duration,
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let addresses: Vec<String> = matches
        .get_many::<String>("addresses")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    if addresses.is_empty() {
        bail!("Usage: uptime-monitor check <ADDRESS>...");
    }

    let config = Config::load_from(&config_path(matches)?);
    let timeout = matches
        .get_one::<f64>("timeout")
        .and_then(|secs| Duration::try_from_secs_f64(*secs).ok())
        .filter(|d| !d.is_zero())
        .unwrap_or_else(|| config.probe_timeout());

    let prober: Arc<dyn Prober> = match matches.get_one::<u16>("tcp-port") {
        Some(port) => Arc::new(TcpProber::new(*port)),
        None => match config.probe {
            ProbeMethod::Ping => Arc::new(PingProber::new().context("ping is not available")?),
            ProbeMethod::Tcp { port } => Arc::new(TcpProber::new(port)),
        },
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    println!(
        "{} {}",
        "Checking at".dimmed(),
        format_time(&chrono::Local::now()).dimmed()
    );

    let results = runtime.block_on(probe_all(prober, addresses, timeout));
    let mut unreachable = 0;

    for result in &results {
        match &result.outcome {
            Ok(true) => println!(
                "  {} {} {}",
                "✓".green(),
                result.address,
                format!("({})", format_secs(result.elapsed)).dimmed()
            ),
            Ok(false) => {
                unreachable += 1;
                println!("  {} {} {}", "✗".red(), result.address, "unreachable".red());
            }
            Err(e) => {
                unreachable += 1;
                println!("  {} {} {}", "✗".red(), result.address, e.to_string().red());
            }
        }
    }

    if unreachable > 0 {
        bail!("{} of {} devices unreachable", unreachable, results.len());
    }
    Ok(())
}

async fn probe_all(
    prober: Arc<dyn Prober>,
    addresses: Vec<String>,
    timeout: Duration,
) -> Vec<CheckResult> {
    let checks = addresses.into_iter().map(|address| {
        let prober = Arc::clone(&prober);
        async move {
            let started = Instant::now();
            let outcome = match tokio::time::timeout(timeout, prober.probe(&address, timeout)).await
            {
                Ok(outcome) => outcome,
                Err(_) => Ok(false),
            };
            CheckResult {
                address,
                outcome,
                elapsed: started.elapsed(),
            }
        }
    });

    join_all(checks).await
}
