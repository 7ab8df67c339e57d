//! Session configuration.

use std::str::FromStr;

use park_core::{EngineConfig, SessionMode};

use crate::error::{Result, RuntimeError};

/// Role of this participant in a multiplayer session.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NetworkMode {
    /// Single player: nothing is sent anywhere.
    #[default]
    None,
    Server,
    Client,
}

impl NetworkMode {
    pub fn is_networked(self) -> bool {
        self != NetworkMode::None
    }
}

/// Runtime configuration shared by the session and its queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    pub session_mode: SessionMode,
    /// Ticks between submitting a command and applying it.
    pub input_delay_ticks: u64,
    pub event_buffer_size: usize,
    /// Drop inbound entries whose tick has already passed instead of applying them late.
    pub discard_stale: bool,
    pub network_mode: NetworkMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            session_mode: SessionMode::Play,
            input_delay_ticks: 1,
            event_buffer_size: 100,
            discard_stale: false,
            network_mode: NetworkMode::None,
        }
    }
}

impl RuntimeConfig {
    pub const INPUT_DELAY_VAR: &'static str = "PARK_INPUT_DELAY";
    pub const EVENT_BUFFER_VAR: &'static str = "PARK_EVENT_BUFFER";
    pub const DISCARD_STALE_VAR: &'static str = "PARK_DISCARD_STALE";
    pub const NETWORK_MODE_VAR: &'static str = "PARK_NETWORK_MODE";

    /// Defaults overridden by any `PARK_*` variables present in the environment.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidConfig`] for a variable that is set but
    /// does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(delay) = parse_var(&lookup, Self::INPUT_DELAY_VAR)? {
            config.input_delay_ticks = delay;
        }
        if let Some(size) = parse_var(&lookup, Self::EVENT_BUFFER_VAR)? {
            config.event_buffer_size = size;
        }
        if let Some(discard) = parse_var(&lookup, Self::DISCARD_STALE_VAR)? {
            config.discard_stale = discard;
        }
        if let Some(mode) = parse_var(&lookup, Self::NETWORK_MODE_VAR)? {
            config.network_mode = mode;
        }
        if config.event_buffer_size == 0 {
            return Err(RuntimeError::InvalidConfig {
                key: Self::EVENT_BUFFER_VAR,
                value: "0".into(),
            });
        }
        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| RuntimeError::InvalidConfig { key, value: raw })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config, RuntimeConfig::default());
        assert!(!config.discard_stale);
    }

    #[test]
    fn variables_override_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("PARK_INPUT_DELAY", "3"),
            ("PARK_DISCARD_STALE", "true"),
            ("PARK_NETWORK_MODE", "Client"),
        ]))
        .expect("config");

        assert_eq!(config.input_delay_ticks, 3);
        assert!(config.discard_stale);
        assert_eq!(config.network_mode, NetworkMode::Client);
    }

    #[test]
    fn unparsable_values_name_the_variable() {
        let error = RuntimeConfig::from_lookup(lookup(&[("PARK_INPUT_DELAY", "soon")]))
            .expect_err("bad delay");
        assert!(matches!(
            error,
            RuntimeError::InvalidConfig {
                key: "PARK_INPUT_DELAY",
                ..
            }
        ));

        let error = RuntimeConfig::from_lookup(lookup(&[("PARK_EVENT_BUFFER", "0")]))
            .expect_err("zero buffer");
        assert!(matches!(error, RuntimeError::InvalidConfig { .. }));
    }
}
