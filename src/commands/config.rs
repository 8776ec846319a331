use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::path::Path;

use super::config_path;
use crate::core::config::{Config, ProbeMethod};
use crate::core::monitor::{resolve, Device, RawValue};
use crate::core::notify::SmtpConfig;

/// Which poll setting a `set-*` subcommand edits
enum SettingKind {
    Interval,
    Threshold,
}

impl SettingKind {
    fn name(&self) -> &'static str {
        match self {
            SettingKind::Interval => "Poll interval",
            SettingKind::Threshold => "Alert threshold",
        }
    }

    fn set(&self, config: &mut Config, value: RawValue) {
        match self {
            SettingKind::Interval => config.poll_interval = value,
            SettingKind::Threshold => config.threshold = value,
        }
    }
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let path = config_path(matches)?;

    match matches.subcommand() {
        Some(("show", _)) => show(&path),
        Some(("path", _)) => {
            println!("{}", path.display());
            Ok(())
        }
        Some(("init", sub)) => init(&path, sub.get_flag("force")),
        Some(("set-interval", sub)) => set_setting(&path, sub, SettingKind::Interval),
        Some(("set-threshold", sub)) => set_setting(&path, sub, SettingKind::Threshold),
        Some(("set-webhook", sub)) => set_webhook(&path, sub),
        Some(("set-smtp", sub)) => set_smtp(&path, sub),
        Some(("set-recipients", sub)) => set_recipients(&path, sub),
        Some(("add-device", sub)) => add_device(&path, sub),
        Some(("remove-device", sub)) => remove_device(&path, sub),
        _ => {
            println!("Use 'uptime-monitor config --help' for more information.");
            Ok(())
        }
    }
}

fn show(path: &Path) -> Result<()> {
    let config = Config::load_from(path);
    let resolved = resolve(Ok(config.raw_settings()));

    println!("{}", "Configuration".bold().cyan());
    println!("  {} {}", "File:".bold(), path.display());
    if !path.exists() {
        println!("  {}", "(not created yet, showing defaults)".dimmed());
    }

    println!();
    println!(
        "  {} {}s",
        "Poll interval:".bold(),
        resolved.settings.poll_interval.as_secs_f64()
    );
    println!(
        "  {} {}s",
        "Threshold:".bold(),
        resolved.settings.threshold.as_secs_f64()
    );
    if let Some(reason) = resolved.fallback {
        println!(
            "  {}",
            format!("⚠️  Invalid values in file, defaults in use ({})", reason).yellow()
        );
    }

    let probe = match config.probe {
        ProbeMethod::Ping => "ping".to_string(),
        ProbeMethod::Tcp { port } => format!("tcp port {}", port),
    };
    println!("  {} {}", "Probe:".bold(), probe);
    println!(
        "  {} {}s",
        "Probe timeout:".bold(),
        config.probe_timeout().as_secs_f64()
    );
    match &config.webhook_url {
        Some(url) => println!("  {} {}", "Webhook:".bold(), url),
        None => println!("  {} {}", "Webhook:".bold(), "not set".dimmed()),
    }
    match &config.smtp {
        Some(smtp) => println!(
            "  {} {}:{} from {}{}",
            "SMTP:".bold(),
            smtp.host,
            smtp.port,
            smtp.from,
            if smtp.starttls { "" } else { " (no STARTTLS)" }
        ),
        None => println!("  {} {}", "SMTP:".bold(), "not set".dimmed()),
    }
    let recipients = config.alert.recipient_list();
    if recipients.is_empty() {
        println!("  {} {}", "Recipients:".bold(), "none".dimmed());
    } else {
        println!("  {} {}", "Recipients:".bold(), recipients.join(", "));
    }

    println!();
    if config.devices.is_empty() {
        println!("  {}", "No devices configured".dimmed());
    } else {
        println!("  {} ({})", "Devices".bold(), config.devices.len());
        for device in &config.devices {
            println!("    {} {}", device.address.green(), device.identifier.dimmed());
        }
    }

    Ok(())
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to(path)?;
    println!(
        "{} {}",
        "✓ Wrote default configuration to".green(),
        path.display()
    );
    Ok(())
}

fn set_setting(path: &Path, matches: &ArgMatches, kind: SettingKind) -> Result<()> {
    let seconds = *matches
        .get_one::<f64>("seconds")
        .context("Seconds argument is required")?;

    let value = RawValue::Number(seconds);
    if value.as_duration().is_none() {
        bail!("{} must be a positive number of seconds", kind.name());
    }

    let mut config = Config::load_from(path);
    kind.set(&mut config, value);
    config.save_to(path)?;

    println!("{} {} set to {}s", "✓".green(), kind.name(), seconds);
    Ok(())
}

fn set_webhook(path: &Path, matches: &ArgMatches) -> Result<()> {
    let mut config = Config::load_from(path);

    if matches.get_flag("clear") {
        config.webhook_url = None;
        config.save_to(path)?;
        println!("{}", "✓ Webhook cleared, alerts will be logged".green());
        return Ok(());
    }

    let url = matches
        .get_one::<String>("url")
        .context("URL argument is required (or pass --clear)")?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("Webhook URL must start with http:// or https://");
    }

    config.webhook_url = Some(url.clone());
    config.save_to(path)?;
    println!("{} Webhook set to {}", "✓".green(), url);
    Ok(())
}

fn set_smtp(path: &Path, matches: &ArgMatches) -> Result<()> {
    let mut config = Config::load_from(path);

    if matches.get_flag("clear") {
        config.smtp = None;
        config.save_to(path)?;
        println!("{}", "✓ Mail server cleared".green());
        return Ok(());
    }

    let smtp = smtp_from_matches(matches)?;
    let label = format!("{}:{}", smtp.host, smtp.port);
    config.smtp = Some(smtp);
    config.save_to(path)?;
    println!("{} Mail server set to {}", "✓".green(), label);
    Ok(())
}

fn smtp_from_matches(matches: &ArgMatches) -> Result<SmtpConfig> {
    let host = matches
        .get_one::<String>("host")
        .context("Host argument is required (or pass --clear)")?;
    let from = matches
        .get_one::<String>("from")
        .context("--from is required")?;

    let mut smtp = SmtpConfig::new(host.trim(), from.trim());
    if let Some(port) = matches.get_one::<u16>("port") {
        smtp.port = *port;
    }
    smtp.username = matches.get_one::<String>("username").cloned();
    smtp.password = matches.get_one::<String>("password").cloned();
    smtp.starttls = !matches.get_flag("no-starttls");

    if smtp.username.is_some() != smtp.password.is_some() {
        bail!("--username and --password must be given together");
    }
    Ok(smtp)
}

fn set_recipients(path: &Path, matches: &ArgMatches) -> Result<()> {
    let list = matches
        .get_one::<String>("recipients")
        .context("Recipient list is required")?;

    let mut config = Config::load_from(path);
    config.alert.recipients = list.clone();
    let count = config.alert.recipient_list().len();
    config.save_to(path)?;
    println!("{} {} alert recipient(s) set", "✓".green(), count);
    Ok(())
}

fn add_device(path: &Path, matches: &ArgMatches) -> Result<()> {
    let spec = matches
        .get_one::<String>("device")
        .context("Device argument is required")?;
    let device = Device::parse_spec(spec).with_context(|| format!("Invalid device '{}'", spec))?;

    let mut config = Config::load_from(path);
    let label = device.to_string();
    if config.add_device(device) {
        println!("{} Added {}", "✓".green(), label);
    } else {
        println!("{} Updated {}", "✓".green(), label);
    }
    config.save_to(path)?;
    Ok(())
}

fn remove_device(path: &Path, matches: &ArgMatches) -> Result<()> {
    let address = matches
        .get_one::<String>("address")
        .context("Address argument is required")?;

    let mut config = Config::load_from(path);
    if !config.remove_device(address) {
        bail!("Device '{}' is not configured", address);
    }
    config.save_to(path)?;
    println!("{} Removed {}", "✓".green(), address);
    Ok(())
}
