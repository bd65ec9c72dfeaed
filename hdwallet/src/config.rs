use crate::derivation::PathTemplate;
use crate::error::{Result, WalletError};
use crate::mnemonic::{Mnemonic, STRENGTHS};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_STRENGTH: usize = 128;
pub const DEFAULT_PATH_TEMPLATE: &str = "m/44'/313'/0'/0/index";

/// Wallet settings, read from TOML:
///
/// ```toml
/// strength = 256
/// path_template = "m/44'/313'/0'/0/index"
/// ```
///
/// Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalletConfig {
    /// Entropy bits for newly generated phrases.
    pub strength: usize,
    pub path_template: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        WalletConfig {
            strength: DEFAULT_STRENGTH,
            path_template: DEFAULT_PATH_TEMPLATE.to_owned(),
        }
    }
}

impl WalletConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: WalletConfig =
            toml::from_str(s).map_err(|e| WalletError::InvalidConfig(e.message().to_owned()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading wallet config from {}", path.display());
        let text = std::fs::read_to_string(path)
            .map_err(|e| WalletError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !STRENGTHS.contains(&self.strength) {
            return Err(WalletError::InvalidConfig(format!(
                "strength {} is not one of {STRENGTHS:?}",
                self.strength
            )));
        }
        self.template().map(drop)
    }

    pub fn template(&self) -> Result<PathTemplate> {
        self.path_template
            .parse()
            .map_err(|e: WalletError| WalletError::InvalidConfig(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| WalletError::InvalidConfig(e.to_string()))
    }

    /// A fresh phrase at the configured strength, with no passphrase.
    pub fn generate_mnemonic(&self) -> Result<Mnemonic> {
        Mnemonic::generate(self.strength)?.with_passphrase("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.strength, 128);
        assert!(config.validate().is_ok());
        assert_eq!(config.template().unwrap().to_string(), DEFAULT_PATH_TEMPLATE);
        assert_eq!(WalletConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn reads_toml() {
        let config = WalletConfig::from_toml_str(
            r#"
            strength = 256
            path_template = "m/44'/60'/0'/index'"
            "#,
        )
        .unwrap();
        assert_eq!(config.strength, 256);
        let template = config.template().unwrap();
        assert!(template.is_hardened());
        assert_eq!(template.at(1).unwrap().to_string(), "m/44'/60'/0'/1'");
        assert_eq!(config.generate_mnemonic().unwrap().word_count().unwrap(), 24);

        let written = config.to_toml_string().unwrap();
        assert_eq!(WalletConfig::from_toml_str(&written).unwrap(), config);
    }

    #[test]
    fn rejects_bad_values() {
        for bad in [
            "strength = 100",
            "path_template = \"m/44'/0'\"",
            "path_template = \"44'/index\"",
            "strength = \"high\"",
            "colour = \"blue\"",
        ] {
            assert!(
                matches!(WalletConfig::from_toml_str(bad), Err(WalletError::InvalidConfig(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn loads_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet.toml");
        std::fs::write(&path, "strength = 192\n").unwrap();
        let config = WalletConfig::load(&path).unwrap();
        assert_eq!(config.strength, 192);
        assert_eq!(config.path_template, DEFAULT_PATH_TEMPLATE);

        assert!(matches!(
            WalletConfig::load(dir.path().join("missing.toml")),
            Err(WalletError::InvalidConfig(_))
        ));
    }
}
