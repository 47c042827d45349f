#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    AssistantName,
    ConfigFile,
    FallbackURL,
    Host,
    LogDir,
    MaxRetries,
    Model,
    OllamaURL,
    PersonaFile,
    Port,
    RequestTimeout,
    Temperature,
}

impl ConfigKey {
    fn is_numeric(&self) -> bool {
        return matches!(
            self,
            ConfigKey::MaxRetries
                | ConfigKey::Port
                | ConfigKey::RequestTimeout
                | ConfigKey::Temperature
        );
    }
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let config_path = dirs::config_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("chatrelay/config.toml");

        let res = match key {
            ConfigKey::AssistantName => "Bob",
            ConfigKey::FallbackURL => "http://127.0.0.1:11434",
            ConfigKey::Host => "0.0.0.0",
            ConfigKey::LogDir => "",
            ConfigKey::MaxRetries => "3",
            ConfigKey::Model => "llama3:8b",
            ConfigKey::OllamaURL => "https://evaenespanol.loca.lt",
            ConfigKey::PersonaFile => "",
            ConfigKey::Port => "5000",
            ConfigKey::RequestTimeout => "60",
            ConfigKey::Temperature => "0.7",

            // Special
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    /// Parses a numeric config value, naming the key when it is invalid.
    pub fn get_parsed<T: std::str::FromStr>(key: ConfigKey) -> Result<T> {
        let val = Config::get(key);
        if let Ok(parsed) = val.parse::<T>() {
            return Ok(parsed);
        }

        bail!(format!("Config has an invalid value for key '{key}': {val}"));
    }

    fn validate() -> Result<()> {
        for key in ConfigKey::iter().filter(|key| return key.is_numeric()) {
            if key == ConfigKey::Temperature {
                Config::get_parsed::<f32>(key)?;
            } else {
                Config::get_parsed::<u64>(key)?;
            }
        }

        if Config::get_parsed::<u32>(ConfigKey::MaxRetries)? < 1 {
            bail!("Config key 'max-retries' must be at least 1");
        }

        return Ok(());
    }

    pub async fn load(clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_float) = val.as_float() {
                        Config::set(key, &val_float.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        Config::set(key, val_str);
                    } else {
                        bail!(format!(
                            "config.toml has an invalid value for key '{key}': {val}"
                        ));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        Config::validate()?;

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if key.is_numeric() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
