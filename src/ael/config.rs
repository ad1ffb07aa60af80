//! Configuration loader for the AEL front end.
//!
//! `defaults/ael.default.toml` is embedded into the crate so the documented
//! defaults and runtime behavior stay in sync. Callers layer their own files
//! and overrides on top through [`Loader`] before deserializing [`AelConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const DEFAULT_TOML: &str = include_str!("../../defaults/ael.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AelConfig {
    pub parser: ParserConfig,
    pub lexer: LexerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub max_depth: usize,
    pub warn_unknown_functions: bool,
    pub known_functions: Vec<String>,
}

impl ParserConfig {
    pub fn is_known_function(&self, name: &str) -> bool {
        self.known_functions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LexerConfig {
    pub max_include_depth: usize,
    pub tab_width: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Treeviz,
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "treeviz" => Ok(OutputFormat::Treeviz),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Treeviz => "treeviz",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

impl Default for AelConfig {
    /// The embedded defaults. Should they fail to load, the built-in values
    /// that mirror them are used instead.
    fn default() -> Self {
        load_defaults().unwrap_or_else(|err| {
            log::error!("embedded defaults failed to load: {}", err);
            Self::builtin()
        })
    }
}

impl AelConfig {
    fn builtin() -> Self {
        AelConfig {
            parser: ParserConfig {
                max_depth: 200,
                warn_unknown_functions: true,
                known_functions: Vec::new(),
            },
            lexer: LexerConfig {
                max_include_depth: 50,
                tab_width: 8,
            },
            output: OutputConfig {
                format: OutputFormat::Treeviz,
            },
        }
    }
}

/// Layers user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file, ignored if absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, typically from a CLI flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<AelConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<AelConfig, ConfigError> {
    Loader::new().build()
}
