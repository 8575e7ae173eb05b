//! Layered settings: defaults, then an optional TOML file, then
//! `PIKAWATCH_*` environment variables, then command-line flags.
//!
//! Nested keys use `__` in the environment, e.g.
//! `PIKAWATCH_AXIS__LONG_FORM_AFTER=12h`.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use pikawatch_types::{RangeToken, TimeWindow};

use crate::data::duration::parse_duration;
use crate::data::AxisConfig;

/// Axis section of the settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AxisSettings {
    /// Humanized duration, e.g. `"24h"`.
    pub long_form_after: String,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            long_form_after: "24h".to_string(),
        }
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub token: Option<String>,
    pub agent: Option<String>,
    pub monitor: Option<String>,
    pub range: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub interface: Option<String>,
    pub refresh_secs: u64,
    pub timeout_secs: u64,
    pub axis: AxisSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/api".to_string(),
            token: None,
            agent: None,
            monitor: None,
            range: RangeToken::default().as_str().to_string(),
            start: None,
            end: None,
            interface: None,
            refresh_secs: 5,
            timeout_secs: 10,
            axis: AxisSettings::default(),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub agent: Option<String>,
    pub monitor: Option<String>,
    pub range: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub interface: Option<String>,
    pub refresh_secs: Option<u64>,
}

/// The `PIKAWATCH_*` environment layer.
fn environment() -> Environment {
    Environment::with_prefix("PIKAWATCH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load settings from the file and environment, then apply `overrides`.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        Self::load_with_env(path, environment(), overrides)
    }

    fn load_with_env(path: Option<&Path>, env: Environment, overrides: Overrides) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(env);

        let config = builder
            .build()
            .context("failed to load configuration")?;
        let mut settings: Settings = config
            .try_deserialize()
            .context("invalid configuration")?;

        settings.apply(overrides);
        settings.validate()?;
        Ok(settings)
    }

    fn apply(&mut self, o: Overrides) {
        if let Some(v) = o.endpoint {
            self.endpoint = v;
        }
        if o.token.is_some() {
            self.token = o.token;
        }
        if o.agent.is_some() {
            self.agent = o.agent;
        }
        if o.monitor.is_some() {
            self.monitor = o.monitor;
        }
        if let Some(v) = o.range {
            self.range = v;
        }
        if o.start.is_some() {
            self.start = o.start;
        }
        if o.end.is_some() {
            self.end = o.end;
        }
        if o.interface.is_some() {
            self.interface = o.interface;
        }
        if let Some(v) = o.refresh_secs {
            self.refresh_secs = v;
        }
    }

    /// Check every derived value so bad input fails before the TUI starts.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            bail!("endpoint must not be empty");
        }
        if self.refresh_secs == 0 {
            bail!("refresh_secs must be at least 1");
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        if self.start.is_some() != self.end.is_some() {
            bail!("start and end must be given together");
        }
        self.window()?;
        self.axis_config()?;
        Ok(())
    }

    pub fn range_token(&self) -> Result<RangeToken> {
        self.range
            .parse()
            .map_err(|e| anyhow!("invalid range: {}", e))
    }

    /// The initial window. Explicit bounds win over the range token.
    pub fn window(&self) -> Result<TimeWindow> {
        let window = TimeWindow::resolve(Some(self.range_token()?), self.start, self.end)
            .ok_or_else(|| anyhow!("no time window configured"))?;
        if let Some((start, end)) = window.bounds() {
            if start > end {
                bail!("start {} is after end {}", start, end);
            }
        }
        Ok(window)
    }

    pub fn axis_config(&self) -> Result<AxisConfig> {
        let long_form_after = parse_duration(&self.axis.long_form_after)
            .with_context(|| format!("invalid axis.long_form_after: {}", self.axis.long_form_after))?;
        Ok(AxisConfig { long_form_after })
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.range_token().unwrap(), RangeToken::H1);
        assert_eq!(settings.window().unwrap(), TimeWindow::Range(RangeToken::H1));
        assert_eq!(settings.axis_config().unwrap(), AxisConfig::default());
        assert_eq!(settings.refresh(), Duration::from_secs(5));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let file = toml_file(
            r#"
            endpoint = "http://pika.internal/api"
            agent = "agent-7"
            range = "7d"
            refresh_secs = 30

            [axis]
            long_form_after = "12h"
            "#,
        );

        let settings = Settings::load(Some(file.path()), Overrides::default()).unwrap();
        assert_eq!(settings.endpoint, "http://pika.internal/api");
        assert_eq!(settings.agent.as_deref(), Some("agent-7"));
        assert_eq!(settings.range_token().unwrap(), RangeToken::D7);
        assert_eq!(settings.refresh_secs, 30);
        assert_eq!(
            settings.axis_config().unwrap().long_form_after,
            Duration::from_secs(12 * 3600)
        );
    }

    #[test]
    fn test_overrides_win() {
        let file = toml_file("agent = \"from-file\"\nrange = \"7d\"\n");
        let overrides = Overrides {
            agent: Some("from-cli".to_string()),
            start: Some(1_000),
            end: Some(2_000),
            ..Default::default()
        };

        let settings = Settings::load(Some(file.path()), overrides).unwrap();
        assert_eq!(settings.agent.as_deref(), Some("from-cli"));
        assert_eq!(
            settings.window().unwrap(),
            TimeWindow::Explicit { start: 1_000, end: 2_000 }
        );
    }

    fn env_vars(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_environment_layer() {
        let env = env_vars(&[
            ("PIKAWATCH_TIMEOUT_SECS", "42"),
            ("PIKAWATCH_AXIS__LONG_FORM_AFTER", "6h"),
        ]);
        let settings = Settings::load_with_env(None, env, Overrides::default()).unwrap();

        assert_eq!(settings.timeout(), Duration::from_secs(42));
        assert_eq!(settings.axis.long_form_after, "6h");
    }

    #[test]
    fn test_environment_below_overrides() {
        let file = toml_file("refresh_secs = 30\n");
        let env = env_vars(&[("PIKAWATCH_REFRESH_SECS", "15")]);
        let overrides = Overrides {
            refresh_secs: Some(2),
            ..Default::default()
        };

        let settings = Settings::load_with_env(Some(file.path()), env, overrides).unwrap();
        assert_eq!(settings.refresh(), Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_range = Overrides {
            range: Some("2w".to_string()),
            ..Default::default()
        };
        assert!(Settings::load(None, bad_range).is_err());

        let half_window = Overrides {
            start: Some(1),
            ..Default::default()
        };
        assert!(Settings::load(None, half_window).is_err());

        let inverted = Overrides {
            start: Some(5),
            end: Some(1),
            ..Default::default()
        };
        assert!(Settings::load(None, inverted).is_err());

        let mut settings = Settings::default();
        settings.axis.long_form_after = "soon".to_string();
        assert!(settings.validate().is_err());
    }
}
