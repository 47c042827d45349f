use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    assert!(res.contains("model = \"llama3:8b\""));
    assert!(res.contains("max-retries = 3"));
    assert!(res.contains("# persona-file = \"\""));
    assert!(!res.contains("config-file"));
}

#[test]
fn it_ships_an_example_config_matching_defaults() -> Result<()> {
    let example = std::fs::read_to_string("./config.example.toml")?;
    assert_eq!(example.trim(), Config::serialize_default(cli::build()).trim());

    return Ok(());
}

#[test]
fn it_binds_config_keys_to_env_vars() {
    let cmd = cli::build();
    let env_for = |key: ConfigKey| {
        return cmd
            .get_arguments()
            .find(|arg| return arg.get_long() == Some(key.to_string().as_str()))
            .and_then(|arg| return arg.get_env())
            .map(|env| return env.to_string_lossy().to_string());
    };

    assert_eq!(env_for(ConfigKey::Host).as_deref(), Some("CHATRELAY_HOST"));
    assert_eq!(env_for(ConfigKey::Port).as_deref(), Some("PORT"));
    assert_eq!(env_for(ConfigKey::OllamaURL).as_deref(), Some("OLLAMA_URL"));
    assert_eq!(env_for(ConfigKey::Model).as_deref(), Some("MODEL_NAME"));
}

#[test]
fn it_returns_defaults() {
    assert_eq!(Config::default(ConfigKey::FallbackURL), "http://127.0.0.1:11434");
    assert_eq!(Config::default(ConfigKey::MaxRetries), "3");
    assert_eq!(Config::default(ConfigKey::RequestTimeout), "60");
    assert_eq!(Config::default(ConfigKey::AssistantName), "Bob");
    assert!(Config::default(ConfigKey::ConfigFile).ends_with("config.toml"));
}

// Config is process wide, so every load scenario runs in one test to keep
// them from racing each other.
#[tokio::test]
async fn it_loads_config_from_files() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["chatrelay", "-c", "./test/config.toml"])?;
    Config::load(vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::Host), "127.0.0.1");
    assert_eq!(Config::get(ConfigKey::Temperature), "0.5");
    assert_eq!(Config::get_parsed::<u32>(ConfigKey::MaxRetries)?, 3);

    let matches = cli::build().try_get_matches_from(vec![
        "chatrelay",
        "-c",
        "./test/config.toml",
        "--model",
        "mistral",
        "--port",
        "9000",
    ])?;
    Config::load(vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::Model), "mistral");
    assert_eq!(Config::get(ConfigKey::Port), "9000");

    let matches =
        cli::build().try_get_matches_from(vec!["chatrelay", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(vec![&matches]).await;
    assert!(res.is_err());
    assert!(res.unwrap_err().to_string().contains("'port'"));

    let matches = cli::build().try_get_matches_from(vec![
        "chatrelay",
        "-c",
        "./test/does-not-exist.toml",
        "--max-retries",
        "0",
    ])?;
    let res = Config::load(vec![&matches]).await;
    assert!(res.is_err());

    return Ok(());
}
