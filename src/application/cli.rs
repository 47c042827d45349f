use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!("Config file already exists at {config_file_path_str}"));
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

fn arg_config(key: ConfigKey, env: &'static str, help: &str) -> Arg {
    let mut help = help.to_string();
    let default = Config::default(key);
    if !default.is_empty() {
        help = format!("{help} [default: {default}]");
    }

    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(help)
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nBuilt: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_BUILD_TIMESTAMP")
    );

    return Command::new("chatrelay")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .subcommand(Command::new("serve").about("Start the HTTP server. This is the default when no subcommand is given."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .arg(
            arg_config(
                ConfigKey::ConfigFile,
                "CHATRELAY_CONFIG_FILE",
                "Path to configuration file",
            )
            .short('c'),
        )
        .arg(arg_config(
            ConfigKey::Host,
            "CHATRELAY_HOST",
            "Interface the HTTP server binds to.",
        ))
        .arg(
            arg_config(ConfigKey::Port, "PORT", "Port the HTTP server listens on.").short('p'),
        )
        .arg(arg_config(
            ConfigKey::OllamaURL,
            "OLLAMA_URL",
            "Base URL of the Ollama backend.",
        ))
        .arg(arg_config(
            ConfigKey::FallbackURL,
            "OLLAMA_FALLBACK_URL",
            "Alternate Ollama host tried once when the chat endpoint answers 403 on the first attempt.",
        ))
        .arg(
            arg_config(
                ConfigKey::Model,
                "MODEL_NAME",
                "Model requested from the Ollama backend.",
            )
            .short('m'),
        )
        .arg(arg_config(
            ConfigKey::Temperature,
            "CHATRELAY_TEMPERATURE",
            "Sampling temperature sent with every request.",
        ))
        .arg(arg_config(
            ConfigKey::MaxRetries,
            "CHATRELAY_MAX_RETRIES",
            "Total attempts per backend call before giving up.",
        ))
        .arg(arg_config(
            ConfigKey::RequestTimeout,
            "CHATRELAY_REQUEST_TIMEOUT",
            "Seconds to wait for a single backend attempt.",
        ))
        .arg(arg_config(
            ConfigKey::PersonaFile,
            "CHATRELAY_PERSONA_FILE",
            "Text file with the system prompt. Uses the built-in persona when unset.",
        ))
        .arg(arg_config(
            ConfigKey::AssistantName,
            "CHATRELAY_ASSISTANT_NAME",
            "Name used for the assistant turns in the completion-shape transcript.",
        ))
        .arg(arg_config(
            ConfigKey::LogDir,
            "CHATRELAY_LOG_DIR",
            "Directory for the JSON log file. Logs go to stdout when unset.",
        ));
}

/// Parses arguments and loads config. Returns `false` when a subcommand has
/// already done its work and the server should not start.
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
        Some(("serve", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
        }
        _ => {
            Config::load(vec![&matches]).await?;
        }
    }

    return Ok(true);
}
