use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use owo_colors::OwoColorize;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::ask;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Theme;
use crate::domain::models::Transport;
use crate::domain::services::help_text;
use crate::domain::services::Preferences;
use crate::infrastructure::transport::http::HttpTransport;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn http_transport() -> Result<HttpTransport> {
    let timeout = Config::get(ConfigKey::RequestTimeout).parse::<u64>()?;
    return HttpTransport::new(&Config::get(ConfigKey::ApiURL), timeout);
}

async fn print_health() -> Result<()> {
    let url = Config::get(ConfigKey::ApiURL);
    let transport = http_transport()?;

    if let Err(err) = transport.health_check().await {
        bail!(format!("FlipAssist API at {url} is not healthy: {err}"));
    }

    println!("FlipAssist API at {url} is healthy");
    return Ok(());
}

async fn print_stats() -> Result<()> {
    let stats = http_transport()?.stats().await?;
    println!("{stats}");

    return Ok(());
}

fn subcommand_ask() -> Command {
    return Command::new("ask")
        .about("Asks a single question and prints the answer as it streams in.")
        .arg(
            Arg::new("query")
                .help("Question to ask. Multiple words are joined with spaces.")
                .num_args(1..)
                .required(true),
        )
        .arg(
            Arg::new("no-stream")
                .long("no-stream")
                .help("Wait for the whole answer using the non-streaming endpoint.")
                .action(ArgAction::SetTrue),
        );
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for FlipAssist")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running FlipAssist with environment variable RUST_LOG=flipassist")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        )
        .subcommand(
            Command::new("preferences-path").about("Output path to the file holding the saved theme.")
        );
}

fn log_path() -> path::PathBuf {
    if let Ok(dir) = env::var("FLIPASSIST_LOG_DIR") {
        return path::PathBuf::from(dir).join("debug.log");
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("flipassist/debug.log");
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
                return format!("CHAT {line}").underline().bold().to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("flipassist")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("chat").about("Start the interactive chat. This is the default."))
        .subcommand(subcommand_ask())
        .subcommand(Command::new("health").about("Checks whether the FlipAssist API is reachable."))
        .subcommand(Command::new("stats").about("Prints the FlipAssist API admin statistics."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(
            Arg::new(ConfigKey::ApiURL.to_string())
                .short('u')
                .long(ConfigKey::ApiURL.to_string())
                .env("FLIPASSIST_API_URL")
                .num_args(1)
                .help(format!("Base URL of the FlipAssist API. [default: {}]", Config::default(ConfigKey::ApiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("FLIPASSIST_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds for the API to start answering. [default: {}]", Config::default(ConfigKey::RequestTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Theme.to_string())
                .short('t')
                .long(ConfigKey::Theme.to_string())
                .env("FLIPASSIST_THEME")
                .num_args(1)
                .help("Colour theme of the chat UI. Falls back to the theme last picked in the UI when unset.")
                .value_parser(PossibleValuesParser::new(Theme::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("FLIPASSIST_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        );
}

async fn run_ask(matches: &ArgMatches, ask_matches: &ArgMatches) -> Result<()> {
    Config::load(build(), vec![matches, ask_matches]).await?;

    let query = ask_matches
        .get_many::<String>("query")
        .map(|words| return words.cloned().collect::<Vec<String>>().join(" "))
        .unwrap_or_default();

    if ask_matches.get_flag("no-stream") {
        return ask::ask_once(&query).await;
    }

    return ask::ask_streaming(&query).await;
}

/// Handles every subcommand that does not need the terminal UI. Returns
/// `true` when the chat should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_path().to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                Some(("preferences-path", _)) => {
                    println!("{}", Preferences::default().file_path.to_string_lossy());
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("ask", subcmd_matches)) => {
            run_ask(&matches, subcmd_matches).await?;
            return Ok(false);
        }
        Some(("health", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            print_health().await?;
            return Ok(false);
        }
        Some(("stats", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            print_stats().await?;
            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
