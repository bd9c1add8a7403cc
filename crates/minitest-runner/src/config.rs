//! Runner configuration.
//!
//! Loaded from TOML or built in code, then optionally overridden from the
//! environment (`MINITEST_SEED`, `MINITEST_ORDER`).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, RunnerError};

/// Environment variable pinning the shuffle seed.
pub const SEED_ENV: &str = "MINITEST_SEED";

/// Environment variable selecting the test order.
pub const ORDER_ENV: &str = "MINITEST_ORDER";

/// Order in which the tests of a case are executed.
///
/// Random order is the default: it surfaces tests that silently depend on
/// each other. Every test still runs exactly once whatever the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestOrder {
    /// Shuffled with a seeded generator.
    #[default]
    Random,
    /// Alphabetical.
    Sorted,
    /// Discovery order: own methods first, then delegated ones.
    Defined,
}

impl TestOrder {
    /// Returns the configuration name of this order.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Sorted => "sorted",
            Self::Defined => "defined",
        }
    }
}

impl fmt::Display for TestOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestOrder {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "sorted" | "alpha" => Ok(Self::Sorted),
            "defined" => Ok(Self::Defined),
            other => Err(RunnerError::config(format!(
                "unknown test order {other:?} (expected random, sorted or defined)"
            ))),
        }
    }
}

/// Where the report is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Console when stdout is a terminal, buffered otherwise.
    #[default]
    Auto,
    /// Write through to stdout.
    Console,
    /// Buffer everything and write once at the end of the run.
    Buffered,
}

/// Runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Test order within each case.
    pub order: TestOrder,

    /// Shuffle seed. A fresh one is drawn per run when absent.
    pub seed: Option<u64>,

    /// Print one line per test instead of bare progress markers.
    pub verbose: bool,

    /// Output sink selection.
    pub output: OutputMode,
}

impl RunnerConfig {
    /// Creates the default configuration: random order, fresh seed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the test order.
    #[must_use]
    pub fn with_order(mut self, order: TestOrder) -> Self {
        self.order = order;
        self
    }

    /// Pins the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables verbose output.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the output sink selection.
    #[must_use]
    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid configuration.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RunnerError::config(format!("failed to parse config: {e}")))
    }

    /// Applies `MINITEST_SEED` and `MINITEST_ORDER` from the process
    /// environment.
    ///
    /// # Errors
    /// Returns an error if either variable holds an invalid value.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable holds an invalid value.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup(SEED_ENV) {
            let seed = raw.trim().parse::<u64>().map_err(|e| {
                RunnerError::config(format!("invalid {SEED_ENV} value {raw:?}: {e}"))
            })?;
            info!(seed, "seed overridden from environment");
            self.seed = Some(seed);
        }
        if let Some(raw) = lookup(ORDER_ENV) {
            let order: TestOrder = raw.parse()?;
            info!(%order, "test order overridden from environment");
            self.order = order;
        }
        Ok(self)
    }
}
