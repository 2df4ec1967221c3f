//! Construction parameters for reading and writing containers
//!
//! Options can be built in code or loaded from a TOML file:
//!
//! ```toml
//! version = "5.0"
//! ignore_payload = false
//! asset_kind = "Texture"
//! verbose = true
//! ```

use crate::error::{AssetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Customized tag shipped with the default format family
pub const DEFAULT_VERSION_TAG: &str = "ff7r";

/// Base format version the default customized tag is built on
const DEFAULT_BASE_VERSION: &str = "4.18";

/// Base version whose import/export records carry an extra trailing field
const EXTENDED_RECORD_VERSION: &str = "5.0";

/// Format family selector: a base engine version plus an optional customized sub-tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionTag {
    base: String,
    customized: Option<String>,
}

impl VersionTag {
    /// Parse a version tag such as `"4.18"`, `"5.0"` or the customized `"ff7r"`
    pub fn parse(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        if tag == DEFAULT_VERSION_TAG {
            return Ok(Self {
                base: DEFAULT_BASE_VERSION.to_string(),
                customized: Some(DEFAULT_VERSION_TAG.to_string()),
            });
        }

        let mut parts = tag.split('.');
        let valid = match (parts.next(), parts.next(), parts.next()) {
            (Some(major), Some(minor), None) => is_number(major) && is_number(minor),
            _ => false,
        };
        if !valid {
            return Err(AssetError::InvalidVersionTag(tag.to_string()));
        }

        Ok(Self {
            base: tag.to_string(),
            customized: None,
        })
    }

    /// Base engine version, e.g. `"4.18"`
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Customized sub-tag, if any
    pub fn customized(&self) -> Option<&str> {
        self.customized.as_deref()
    }

    /// Whether import and export records carry the extra 32-bit trailing field
    pub fn has_extended_records(&self) -> bool {
        self.base == EXTENDED_RECORD_VERSION
    }
}

fn is_number(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

impl Default for VersionTag {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_VERSION.to_string(),
            customized: Some(DEFAULT_VERSION_TAG.to_string()),
        }
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.customized {
            Some(custom) => write!(f, "{}", custom),
            None => write!(f, "{}", self.base),
        }
    }
}

impl TryFrom<String> for VersionTag {
    type Error = AssetError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VersionTag> for String {
    fn from(tag: VersionTag) -> Self {
        tag.to_string()
    }
}

impl std::str::FromStr for VersionTag {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Options controlling how a container is read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerOptions {
    /// Format family of the container
    pub version: VersionTag,

    /// Read metadata only; payload bodies are not loaded
    pub ignore_payload: bool,

    /// Expected asset kind; empty accepts any recognized kind.
    /// Matched as a substring of the detected kind.
    pub asset_kind: String,

    /// Emit per-table dumps at info level
    pub verbose: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            version: VersionTag::default(),
            ignore_payload: false,
            asset_kind: String::new(),
            verbose: false,
        }
    }
}

impl ContainerOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load options from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Serialize options to a TOML document
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn with_version(mut self, version: VersionTag) -> Self {
        self.version = version;
        self
    }

    pub fn with_ignore_payload(mut self, ignore_payload: bool) -> Self {
        self.ignore_payload = ignore_payload;
        self
    }

    pub fn with_asset_kind(mut self, asset_kind: impl Into<String>) -> Self {
        self.asset_kind = asset_kind.into();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
