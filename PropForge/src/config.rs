//! Codec configuration
//!
//! The only host-supplied setting the codec consumes is the legacy code page
//! used for pre-`6VSM` text. It is passed explicitly to every decode call.
//!
//! ```toml
//! # ~/.config/propforge/config.toml
//! legacy_code_page = 1251
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::formats::prop::CodePage;

/// Settings threaded into decode and encode calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Code page for every header tag except `6VSM`.
    pub legacy_code_page: CodePage,
}

impl CodecConfig {
    pub fn with_code_page(code_page: u16) -> Self {
        Self {
            legacy_code_page: CodePage(code_page),
        }
    }

    /// Load from a TOML file and check that the code page resolves.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// names an unsupported code page.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&contents)?;
        config.legacy_code_page.encoding()?;
        tracing::debug!(
            "Loaded codec config from {}: code page {}",
            path.as_ref().display(),
            config.legacy_code_page.0
        );
        Ok(config)
    }

    /// `<config dir>/propforge/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("propforge").join("config.toml"))
    }

    /// Load from [`Self::default_path`] if present, otherwise use defaults.
    ///
    /// # Errors
    /// Returns an error only if the file exists and is invalid.
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_is_windows_1252() {
        assert_eq!(CodecConfig::default().legacy_code_page, CodePage(1252));
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "legacy_code_page = 1251\n").unwrap();
        let config = CodecConfig::load(&path).unwrap();
        assert_eq!(config, CodecConfig::with_code_page(1251));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(CodecConfig::load(&path).unwrap(), CodecConfig::default());
    }

    #[test]
    fn test_rejects_unknown_code_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "legacy_code_page = 437\n").unwrap();
        assert!(matches!(
            CodecConfig::load(&path),
            Err(Error::UnsupportedCodePage(437))
        ));
    }

    #[test]
    fn test_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "legacy_code_page = \"abc\"\n").unwrap();
        assert!(matches!(CodecConfig::load(&path), Err(Error::Config(_))));
    }
}
