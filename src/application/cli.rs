#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use owo_colors::OwoColorize;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Author;
use crate::domain::models::Session;
use crate::domain::services::events::help_text;
use crate::domain::services::markup;
use crate::domain::services::Exchange;
use crate::domain::services::PersonaBinder;
use crate::domain::services::Pipeline;
use crate::domain::services::Sessions;
use crate::infrastructure::remote::RemoteManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
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

/// Splits a `source=name` pair given to `ask --as`.
pub fn parse_identity(val: &str) -> Result<(String, String)> {
    let (source, name) = match val.split_once('=') {
        Some(pair) => pair,
        None => bail!(format!("Expected SOURCE=NAME, got '{val}'")),
    };

    let source = source.trim().to_lowercase();
    let name = name.trim();
    if source.is_empty() || name.is_empty() {
        bail!(format!("Expected SOURCE=NAME, got '{val}'"));
    }

    return Ok((source, name.to_string()));
}

pub fn format_transcript(session: &Session) -> String {
    return session
        .messages()
        .iter()
        .map(|message| {
            let author = match message.author {
                Author::Ai => session.persona_label(),
                _ => message.author.to_string(),
            };
            return format!("{author}: {}", markup::strip(&message.text));
        })
        .collect::<Vec<String>>()
        .join("\n");
}

async fn print_years() -> Result<()> {
    let years = RemoteManager::get()?.available_years().await?;
    if years.is_empty() {
        println!("No processed years yet. Run `mindback process` first.");
        return Ok(());
    }

    let years = years
        .iter()
        .map(|year| return year.to_string())
        .collect::<Vec<String>>();
    println!("{}", years.join("\n"));

    return Ok(());
}

async fn print_participants(year: i32) -> Result<()> {
    let res = RemoteManager::get()?.participants(year).await?;
    if res.participants_by_source.is_empty() {
        println!("No participants found for {year}.");
        return Ok(());
    }

    for (source, names) in res.participants_by_source {
        println!("{}", source.bold());
        if names.is_empty() {
            println!("  (none)");
        }
        for name in names {
            println!("  - {name}");
        }
    }

    return Ok(());
}

async fn run_processing() -> Result<()> {
    println!("Processing Data...");
    let report = Pipeline::new(RemoteManager::get()?)
        .request_processing()
        .await?;

    if report.available_years.is_empty() {
        println!(
            "Data processing complete, but no available years found. Please check uploaded files."
        );
    } else {
        let years = report
            .available_years
            .iter()
            .map(|year| return year.to_string())
            .collect::<Vec<String>>();
        println!("Data processing complete. Available years: {}", years.join(", "));
    }

    if !report.unprocessed_files.is_empty() {
        println!("{}", "Unprocessed files:".yellow());
        for file in report.unprocessed_files {
            println!("  - {file}");
        }
    }

    return Ok(());
}

async fn print_processed_files() -> Result<()> {
    let files = Pipeline::new(RemoteManager::get()?)
        .processed_files()
        .await?;
    if files.is_empty() {
        println!("No processed files found.");
        return Ok(());
    }

    for (source, names) in files {
        println!("{}", source.bold());
        for name in names {
            println!("  - {name}");
        }
    }

    return Ok(());
}

async fn reset_uploads() -> Result<()> {
    let message = Pipeline::new(RemoteManager::get()?)
        .clear_uploads()
        .await?;
    println!("{message}");
    return Ok(());
}

async fn ask(matches: &ArgMatches) -> Result<()> {
    let year = match matches.get_one::<i32>("year") {
        Some(year) => *year,
        None => bail!("--year is required"),
    };
    let identities = matches
        .get_many::<String>("as")
        .unwrap_or_default()
        .map(|val| return parse_identity(val))
        .collect::<Result<Vec<(String, String)>>>()?;
    let message = matches
        .get_many::<String>("message")
        .unwrap_or_default()
        .map(|word| return word.to_string())
        .collect::<Vec<String>>()
        .join(" ");

    let remote = RemoteManager::get()?;
    let pipeline = Pipeline::new(remote.clone());
    let exchange = Exchange::new(
        remote,
        Duration::from_millis(Config::get_u64(ConfigKey::ChatTimeout)?),
    );

    let mut sessions = Sessions::new(1);
    let id = sessions.create(year)?;

    let mut binder = PersonaBinder::new(year, pipeline.participants(year).await);
    for (source, name) in identities {
        binder.select(&source, &name)?;
    }

    exchange.bind_with(&mut sessions, &id, &binder).await?;
    exchange.start_with(&mut sessions, &id).await;
    exchange.send_with(&mut sessions, &id, &message).await?;

    if let Some(session) = sessions.get(&id) {
        println!("{}", format_transcript(session));
    }

    return Ok(());
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

fn arg_year(required: bool) -> Arg {
    return Arg::new("year")
        .short('y')
        .long("year")
        .help("Year of message history to use.")
        .num_args(1)
        .value_parser(value_parser!(i32))
        .required(required);
}

fn subcommand_ask() -> Command {
    return Command::new("ask")
        .about("Sends a single message to a persona without opening the chat UI, and prints the conversation.")
        .arg(arg_year(true))
        .arg(
            Arg::new("as")
                .short('a')
                .long("as")
                .help("Your name in a source, as SOURCE=NAME. Repeat for every source that has participants.")
                .value_name("SOURCE=NAME")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("message")
                .help("Message to send.")
                .num_args(1..)
                .required(true),
        );
}

pub fn build() -> Command {
    let hotkeys_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("HOTKEYS:") {
                return format!("CHAT {line}").underline().bold().to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("mindback")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(hotkeys_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("chat").about("Start the chat UI. This is the default."))
        .subcommand(subcommand_ask())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(Command::new("files").about("List processed files per source."))
        .subcommand(
            Command::new("participants")
                .about("List the participants you can pick as yourself for a year.")
                .arg(arg_year(true)),
        )
        .subcommand(Command::new("process").about("Process uploaded message exports into yearly histories."))
        .subcommand(Command::new("reset").about("Delete all uploaded and processed files on the service."))
        .subcommand(Command::new("years").about("List years with processed message history."))
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("MINDBACK_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::ApiURL.to_string())
                .long(ConfigKey::ApiURL.to_string())
                .env("MINDBACK_API_URL")
                .num_args(1)
                .help(format!("Base URL of the processing and chat service. [default: {}]", Config::default(ConfigKey::ApiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ChatTimeout.to_string())
                .long(ConfigKey::ChatTimeout.to_string())
                .env("MINDBACK_CHAT_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds for a persona to reply before giving up. [default: {}]", Config::default(ConfigKey::ChatTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::MaxSessions.to_string())
                .long(ConfigKey::MaxSessions.to_string())
                .env("MINDBACK_MAX_SESSIONS")
                .num_args(1)
                .help(format!("Maximum number of chat tabs open at once. [default: {}]", Config::default(ConfigKey::MaxSessions)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("MINDBACK_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds for every other request to the service. [default: {}]", Config::default(ConfigKey::RequestTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .short('u')
                .long(ConfigKey::Username.to_string())
                .env("MINDBACK_USERNAME")
                .num_args(1)
                .help("Your name shown above your own messages. [default: $USER]")
                .global(true),
        );
}

/// Returns true when the chat UI should be started.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
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
        Some((name, subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            match name {
                "ask" => ask(subcmd_matches).await?,
                "files" => print_processed_files().await?,
                "participants" => {
                    if let Some(year) = subcmd_matches.get_one::<i32>("year") {
                        print_participants(*year).await?;
                    }
                }
                "process" => run_processing().await?,
                "reset" => reset_uploads().await?,
                "years" => print_years().await?,
                _ => return Ok(true),
            }
        }
        None => {
            Config::load(build(), vec![&matches]).await?;
            return Ok(true);
        }
    }

    return Ok(false);
}
