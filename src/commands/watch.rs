//! Watch command handler.
//!
//! Runs the monitor in the foreground until Ctrl-C, printing every event.

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use super::config_path;
use crate::core::config::{Config, ProbeMethod};
use crate::core::monitor::{
    Capabilities, ChannelSink, Device, DeviceList, FileSettings, FixedSettings, Monitor,
    RawValue, SettingsSource,
};
use crate::core::notify::{EmailNotifier, LogNotifier, Notifier, WebhookNotifier};
use crate::core::probe::{PingProber, Prober, TcpProber};
use crate::ui::{print_event, print_snapshot};

/// Execute the watch command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let path = config_path(matches)?;
    let config = Config::load_from(&path);

    let devices = collect_devices(matches, &config)?;
    let settings = settings_source(matches, &config, &path);
    let prober = build_prober(matches, &config)?;
    let notifier = build_notifier(matches, &config)?;

    let probe_timeout = matches
        .get_one::<f64>("probe-timeout")
        .and_then(|secs| Duration::try_from_secs_f64(*secs).ok())
        .unwrap_or_else(|| config.probe_timeout());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("monitor-worker")
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run_until_interrupted(
        devices,
        settings,
        prober,
        notifier,
        probe_timeout,
    ))
}

async fn run_until_interrupted(
    devices: Vec<Device>,
    settings: Arc<dyn SettingsSource>,
    prober: Arc<dyn Prober>,
    notifier: Arc<dyn Notifier>,
    probe_timeout: Duration,
) -> Result<()> {
    let (sink, mut events) = ChannelSink::new();
    let caps = Capabilities::new(prober, notifier)
        .with_sink(Arc::new(sink))
        .with_probe_timeout(probe_timeout);

    let mut monitor = Monitor::new(caps);
    if let Err(e) = monitor.start(devices, Arc::clone(&settings)) {
        if e.is_validation() {
            bail!("Invalid device list: {}", e);
        }
        return Err(e).context("Failed to start monitoring");
    }

    let interrupted = Arc::new(Notify::new());
    let on_interrupt = Arc::clone(&interrupted);
    ctrlc::set_handler(move || on_interrupt.notify_one())
        .context("Failed to install Ctrl-C handler")?;

    println!("{}", "Press Ctrl-C to stop monitoring".dimmed());

    loop {
        tokio::select! {
            Some(event) = events.recv() => print_event(&event),
            _ = interrupted.notified() => break,
        }
    }

    let snapshot = monitor.snapshots().map(|rx| rx.borrow().clone());
    monitor.stop().await;

    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }

    if let Some(snapshot) = snapshot {
        let interval = crate::core::monitor::resolve(settings.read())
            .settings
            .poll_interval;
        print_snapshot(&snapshot, interval);
    }

    Ok(())
}

/// Devices from --device, --devices-file, or the config file, in that order
fn collect_devices(matches: &ArgMatches, config: &Config) -> Result<Vec<Device>> {
    let mut devices = Vec::new();

    if let Some(specs) = matches.get_many::<String>("device") {
        for spec in specs {
            devices.push(
                Device::parse_spec(spec)
                    .with_context(|| format!("Invalid --device value '{}'", spec))?,
            );
        }
    }

    if let Some(file) = matches.get_one::<String>("devices-file") {
        let text = fs::read_to_string(file)
            .with_context(|| format!("Failed to read devices file: {}", file))?;
        let list = DeviceList::parse(&text)
            .with_context(|| format!("Invalid devices file: {}", file))?;
        devices.extend(list.iter().cloned());
    }

    if devices.is_empty() {
        devices = config.devices.clone();
    }

    if devices.is_empty() {
        bail!(
            "No devices to monitor. Pass --device <ADDR[=ID]>, --devices-file <FILE>, \
             or add devices with 'uptime-monitor config add-device'"
        );
    }

    Ok(devices)
}

/// Command-line values win; otherwise follow the config file live
fn settings_source(
    matches: &ArgMatches,
    config: &Config,
    path: &Path,
) -> Arc<dyn SettingsSource> {
    let interval = matches.get_one::<String>("interval");
    let threshold = matches.get_one::<String>("threshold");

    if interval.is_none() && threshold.is_none() && path.exists() {
        return Arc::new(FileSettings::new(path));
    }

    let mut raw = config.raw_settings();
    if let Some(value) = interval {
        raw.poll_interval = RawValue::from(value.as_str());
    }
    if let Some(value) = threshold {
        raw.threshold = RawValue::from(value.as_str());
    }
    Arc::new(FixedSettings(raw))
}

fn build_prober(matches: &ArgMatches, config: &Config) -> Result<Arc<dyn Prober>> {
    let method = match matches.get_one::<u16>("tcp-port") {
        Some(port) => ProbeMethod::Tcp { port: *port },
        None => config.probe,
    };

    Ok(match method {
        ProbeMethod::Ping => Arc::new(PingProber::new().context(
            "Cannot probe with ping; install it or use --tcp-port <PORT>",
        )?),
        ProbeMethod::Tcp { port } => Arc::new(TcpProber::new(port)),
    })
}

/// --webhook, then the configured mail server, then the configured webhook,
/// then the log
fn build_notifier(matches: &ArgMatches, config: &Config) -> Result<Arc<dyn Notifier>> {
    if let Some(url) = matches.get_one::<String>("webhook") {
        return webhook_notifier(url.clone(), config);
    }

    if let Some(smtp) = &config.smtp {
        if config.alert.recipient_list().is_empty() {
            log::warn!("Mail server configured but no recipients; alerts will fail to send");
        }
        let notifier = EmailNotifier::new(smtp.clone(), config.alert.clone())
            .context("Failed to set up email notifications")?;
        return Ok(Arc::new(notifier));
    }

    match &config.webhook_url {
        Some(url) => webhook_notifier(url.clone(), config),
        None => Ok(Arc::new(LogNotifier::new(config.alert.clone()))),
    }
}

fn webhook_notifier(url: String, config: &Config) -> Result<Arc<dyn Notifier>> {
    let notifier = WebhookNotifier::new(url, config.alert.clone())
        .context("Failed to set up webhook notifications")?;
    Ok(Arc::new(notifier))
}
