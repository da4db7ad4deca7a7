use crate::engine::Engine;
use crate::errors::IpolError;
use crate::normalize::normalize_identifier;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "torque_ipol";
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Normalized name of the column holding the sample times.
    pub time_attribute: String,
    /// Columns whose normalized name contains this keyword are channels.
    pub channel_keyword: String,
    /// Unit label printed after each value.
    pub unit: String,
    /// Number of decimals printed for each value.
    pub precision: usize,
    /// Field delimiter, guessed from the file extension when absent.
    pub delimiter: Option<char>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            time_attribute: "time_s".to_owned(),
            channel_keyword: "torque".to_owned(),
            unit: "Nm".to_owned(),
            precision: 2,
            delimiter: None,
        }
    }

    /// Location of the per user configuration file, if the platform has a
    /// configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn from_json(text: &str) -> Result<Self, IpolError> {
        let config: Config = serde_json::from_str(text)?;
        config.normalized()
    }

    pub fn read(path: &Path) -> Result<Self, IpolError> {
        if !path.is_file() {
            return Err(IpolError::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Read the configuration from `path`, or from the default location when
    /// no path is given. A missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, IpolError> {
        if let Some(p) = path {
            debug!("Reading configuration from {}", p.display());
            return Self::read(p);
        }
        match Self::default_path() {
            Some(p) if p.is_file() => {
                debug!("Reading configuration from {}", p.display());
                Self::read(&p)
            }
            _ => Ok(Self::new()),
        }
    }

    /// Bring the time attribute and keyword in the same form as the column
    /// headers of a loaded series and validate the remaining fields.
    pub fn normalized(mut self) -> Result<Self, IpolError> {
        self.time_attribute = normalize_identifier(&self.time_attribute);
        self.channel_keyword = normalize_identifier(&self.channel_keyword);
        if self.time_attribute.is_empty() {
            return Err(IpolError::Config(
                "The time attribute must contain at least one letter or digit".to_owned(),
            ));
        }
        if self.channel_keyword.is_empty() {
            return Err(IpolError::Config(
                "The channel keyword must contain at least one letter or digit".to_owned(),
            ));
        }
        if let Some(d) = self.delimiter {
            if !d.is_ascii() {
                return Err(IpolError::Config(format!(
                    "The delimiter [{}] must be a single ASCII character",
                    d
                )));
            }
        }
        Ok(self)
    }

    pub fn engine(&self) -> Engine {
        Engine::new(&self.time_attribute, &self.channel_keyword)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Time column: {}\nChannel keyword: {}\nUnit: {}\nDecimals: {}\n",
            self.time_attribute, self.channel_keyword, self.unit, self.precision
        )
    }
}
