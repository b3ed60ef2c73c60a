//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! [resolver]
//! default_modulators = true
//!
//! [fallback]
//! program = 0
//! percussion_bank = 128
//!
//! [loader]
//! generator_policy = "reject"
//! ```
//!
//! Every field is optional.

use std::path::Path;

use hb_engine::ResolveOptions;
use hb_ir::GeneratorPolicy;
use serde::Deserialize;

use crate::error::HostError;

/// MIDI bank number SoundFont uses for percussion presets.
pub const PERCUSSION_BANK: u16 = 128;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub resolver: ResolverConfig,
    pub fallback: FallbackConfig,
    pub loader: LoaderConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Apply the SoundFont default modulators
    pub default_modulators: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { default_modulators: true }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackConfig {
    /// Program tried when the requested one is missing
    pub program: u8,
    /// Bank whose misses fall back within itself instead of to bank 0
    pub percussion_bank: u16,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { program: 0, percussion_bank: PERCUSSION_BANK }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    pub generator_policy: PolicySetting,
}

/// What a loader does with a generator id it does not know.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicySetting {
    #[default]
    Reject,
    Skip,
}

impl From<PolicySetting> for GeneratorPolicy {
    fn from(setting: PolicySetting) -> Self {
        match setting {
            PolicySetting::Reject => GeneratorPolicy::Reject,
            PolicySetting::Skip => GeneratorPolicy::Skip,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| HostError::read_config(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, HostError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions { default_modulators: self.resolver.default_modulators }
    }

    /// Policy a loader should build zones with.
    pub fn generator_policy(&self) -> GeneratorPolicy {
        self.loader.generator_policy.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.resolver.default_modulators);
        assert_eq!(config.fallback.program, 0);
        assert_eq!(config.fallback.percussion_bank, 128);
        assert_eq!(config.generator_policy(), GeneratorPolicy::Reject);
    }

    #[test]
    fn parses_every_section() {
        let config = EngineConfig::from_toml_str(
            r#"
            [resolver]
            default_modulators = false

            [fallback]
            program = 4
            percussion_bank = 127

            [loader]
            generator_policy = "skip"
            "#,
        )
        .unwrap();
        assert_eq!(config.resolve_options(), ResolveOptions { default_modulators: false });
        assert_eq!(config.fallback.program, 4);
        assert_eq!(config.fallback.percussion_bank, 127);
        assert_eq!(config.generator_policy(), GeneratorPolicy::Skip);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str("[fallback]\nprogram = 9\n").unwrap();
        assert_eq!(config.fallback.percussion_bank, PERCUSSION_BANK);
        assert!(config.resolver.default_modulators);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err =
            EngineConfig::from_toml_str("[loader]\ngenerator_policy = \"ignore\"\n").unwrap_err();
        assert!(matches!(err, HostError::ParseConfig(_)));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(EngineConfig::from_toml_str("[resolver]\nlayers = 2\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load("/nonexistent/hibank.toml").unwrap_err();
        match err {
            HostError::ReadConfig { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/hibank.toml"))
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
