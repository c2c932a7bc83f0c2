use crate::output::OutputFormat;
use std::{
    convert::TryInto,
    path::{Path, PathBuf},
};
use tabletop_dice_roll::dice_roll::DEFAULT_MAX_DICE;
use toml::{map::Map, Value};

pub const CONFIG_ENV: &str = "ROLL_CONFIG";
pub const SEED_ENV: &str = "ROLL_SEED";
pub const DEFAULT_CONFIG_PATH: &str = "roll.toml";

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Config {
    pub max_dice: u32,
    pub seed: Option<u64>,
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_dice: DEFAULT_MAX_DICE,
            seed: None,
            output: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Reads the file named by `ROLL_CONFIG` (or `roll.toml`), then applies `ROLL_SEED`.
    pub fn load() -> Config {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let config = Config::from_map(&read_config(&path));
        config.with_seed_override(std::env::var(SEED_ENV).ok())
    }

    pub fn from_map(config: &Map<String, Value>) -> Config {
        let defaults = Config::default();

        let max_dice: u32 = match config.get("max_dice") {
            None => defaults.max_dice,
            Some(value) => match value
                .as_integer()
                .and_then(|i| i.try_into().ok())
                .filter(|i: &u32| *i > 0)
            {
                Some(i) => i,
                None => {
                    log::warn!(
                        "unable to read max_dice, using default of {}",
                        defaults.max_dice
                    );
                    defaults.max_dice
                }
            },
        };

        let seed: Option<u64> = match config.get("seed") {
            None => None,
            Some(value) => match value.as_integer().and_then(|i| i.try_into().ok()) {
                Some(i) => Some(i),
                None => {
                    log::warn!("unable to read seed, seeding from entropy");
                    None
                }
            },
        };

        let output = match config.get("output") {
            None => defaults.output,
            Some(value) => match value.as_str().map(|s| s.parse::<OutputFormat>()) {
                Some(Ok(format)) => format,
                Some(Err(e)) => {
                    log::warn!("{}, using text output", e);
                    defaults.output
                }
                None => {
                    log::warn!("unable to read output, using text output");
                    defaults.output
                }
            },
        };

        Config {
            max_dice,
            seed,
            output,
        }
    }

    pub fn with_seed_override(mut self, seed: Option<String>) -> Config {
        if let Some(seed) = seed {
            match seed.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(e) => log::warn!("Unable to parse {}: {}", SEED_ENV, e),
            }
        }
        self
    }
}

fn read_config(path: &Path) -> Map<String, Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::debug!("Unable to read config file {}: {}", path.display(), e);
            return Map::new();
        }
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Unable to parse config: {}", e);
            Map::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Config {
        Config::from_map(&toml::from_str(source).unwrap())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(""), Config::default());
    }

    #[test]
    fn test_all_keys() {
        assert_eq!(
            parse("max_dice = 50\nseed = 42\noutput = \"json\"\n"),
            Config {
                max_dice: 50,
                seed: Some(42),
                output: OutputFormat::Json,
            }
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        assert_eq!(
            parse("max_dice = 0\nseed = -1\noutput = \"yaml\"\n"),
            Config::default()
        );
        assert_eq!(parse("max_dice = \"many\"\n"), Config::default());
    }

    #[test]
    fn test_seed_override() {
        let config = Config::default().with_seed_override(Some("7".to_string()));
        assert_eq!(config.seed, Some(7));
        let config = parse("seed = 3").with_seed_override(Some("nope".to_string()));
        assert_eq!(config.seed, Some(3));
        let config = parse("seed = 3").with_seed_override(None);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_missing_file() {
        assert!(read_config(Path::new("/nonexistent/roll.toml")).is_empty());
    }
}
