use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};

use uptime_monitor::commands;

fn build_cli() -> Command {
    Command::new("uptime-monitor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch network devices and alert when one stays unreachable")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Config file to use instead of the default location")
                .global(true),
        )
        .subcommand(
            Command::new("watch")
                .about("Monitor devices until Ctrl-C")
                .arg(
                    Arg::new("device")
                        .short('d')
                        .long("device")
                        .value_name("ADDR[=ID]")
                        .help("Device to monitor, optionally with an identifier such as a MAC address")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("devices-file")
                        .short('f')
                        .long("devices-file")
                        .value_name("FILE")
                        .help("File with one 'ADDRESS [IDENTIFIER]' per line"),
                )
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("SECONDS")
                        .help("Seconds between poll cycles (default 3)"),
                )
                .arg(
                    Arg::new("threshold")
                        .short('t')
                        .long("threshold")
                        .value_name("SECONDS")
                        .help("Seconds a device must stay down before alerting (default 10)"),
                )
                .arg(
                    Arg::new("tcp-port")
                        .long("tcp-port")
                        .value_name("PORT")
                        .help("Probe with a TCP connect to this port instead of ping")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("probe-timeout")
                        .long("probe-timeout")
                        .value_name("SECONDS")
                        .help("Per-probe timeout, always kept below the interval")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("webhook")
                        .long("webhook")
                        .value_name("URL")
                        .help("POST alerts as JSON to this URL"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Probe addresses once and report reachability")
                .arg(
                    Arg::new("addresses")
                        .help("Addresses to probe")
                        .required(true)
                        .num_args(1..),
                )
                .arg(
                    Arg::new("tcp-port")
                        .long("tcp-port")
                        .value_name("PORT")
                        .help("Probe with a TCP connect to this port instead of ping")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_name("SECONDS")
                        .help("Per-probe timeout")
                        .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage configuration (use 'uptime-monitor config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Show the current configuration"))
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(
                    Command::new("init")
                        .about("Write a default config file")
                        .arg(
                            Arg::new("force")
                                .long("force")
                                .help("Overwrite an existing file")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    Command::new("set-interval")
                        .about("Set seconds between poll cycles")
                        .arg(
                            Arg::new("seconds")
                                .required(true)
                                .value_parser(value_parser!(f64)),
                        ),
                )
                .subcommand(
                    Command::new("set-threshold")
                        .about("Set seconds of downtime before alerting")
                        .arg(
                            Arg::new("seconds")
                                .required(true)
                                .value_parser(value_parser!(f64)),
                        ),
                )
                .subcommand(
                    Command::new("set-webhook")
                        .about("Set or clear the alert webhook URL")
                        .arg(Arg::new("url").required_unless_present("clear"))
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .help("Remove the webhook and log alerts instead")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    Command::new("set-smtp")
                        .about("Set or clear the mail server used for email alerts")
                        .arg(Arg::new("host").required_unless_present("clear"))
                        .arg(
                            Arg::new("from")
                                .long("from")
                                .value_name("ADDRESS")
                                .help("Sender address")
                                .required_unless_present("clear"),
                        )
                        .arg(
                            Arg::new("port")
                                .long("port")
                                .value_name("PORT")
                                .help("SMTP port (default 587)")
                                .value_parser(value_parser!(u16)),
                        )
                        .arg(
                            Arg::new("username")
                                .long("username")
                                .value_name("USER")
                                .help("Login name"),
                        )
                        .arg(
                            Arg::new("password")
                                .long("password")
                                .value_name("PASSWORD")
                                .help("Login password, stored in the config file"),
                        )
                        .arg(
                            Arg::new("no-starttls")
                                .long("no-starttls")
                                .help("Send without STARTTLS (local relays only)")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .help("Remove the mail server settings")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    Command::new("set-recipients")
                        .about("Set the comma-separated alert recipients")
                        .arg(Arg::new("recipients").value_name("LIST").required(true)),
                )
                .subcommand(
                    Command::new("add-device")
                        .about("Add a device, or update its identifier")
                        .arg(
                            Arg::new("device")
                                .value_name("ADDR[=ID]")
                                .required(true),
                        ),
                )
                .subcommand(
                    Command::new("remove-device")
                        .about("Remove a device")
                        .arg(Arg::new("address").required(true)),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for (bash, zsh, fish, powershell, elvish)")
                        .required(true),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() -> Result<()> {
    uptime_monitor::init_logging();

    let matches = build_cli().get_matches();

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("watch", sub_matches)) => commands::watch(sub_matches),
        Some(("check", sub_matches)) => commands::check(sub_matches),
        Some(("config", sub_matches)) => commands::config::execute(sub_matches),
        Some(("completions", sub_matches)) => {
            let mut cli = build_cli();
            commands::completions::execute(sub_matches, &mut cli)
        }
        Some(("version", _)) => commands::version(),
        _ => {
            println!("Use 'uptime-monitor --help' for more information.");
            Ok(())
        }
    }
}
