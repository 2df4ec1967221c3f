use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for asset container operations
pub type Result<T> = std::result::Result<T, AssetError>;

/// Unified error type for all asset container operations
#[derive(Debug, Error)]
pub enum AssetError {
    // Header errors
    #[error("Invalid magic number: expected {expected:02X?}, got {actual:02X?}")]
    MagicMismatch { expected: [u8; 4], actual: [u8; 4] },

    #[error("Unsupported header version: {0} (expected 6 or 7)")]
    UnsupportedVersion(i64),

    // Layout errors
    #[error(
        "Consistency check failed for {field}: expected {expected}, got {actual} at byte {position}"
    )]
    Consistency {
        field: &'static str,
        expected: i64,
        actual: i64,
        position: u64,
    },

    #[error("Invalid {table} reference: index {index} outside table of {len} entries")]
    InvalidReference {
        table: &'static str,
        index: i64,
        len: usize,
    },

    #[error("Invalid string at byte {position}: {reason}")]
    InvalidString { position: u64, reason: String },

    #[error("Value {value} does not fit in 32-bit field {field}")]
    FieldOverflow { field: &'static str, value: u64 },

    // Asset errors
    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("Failed to determine asset path ({} candidates: {candidates:?})", .candidates.len())]
    AssetPathAmbiguity { candidates: Vec<String> },

    #[error("Not an asset container: {}", .0.display())]
    NotAContainer(PathBuf),

    #[error("Payload was not loaded (metadata-only mode, or no payload given)")]
    PayloadNotLoaded,

    // Configuration errors
    #[error("Invalid version tag: {0}")]
    InvalidVersionTag(String),

    #[error("TOML error: {0}")]
    TomlError(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AssetError {
    /// Whether this error reports a disagreement between declared and observed layout
    pub fn is_consistency(&self) -> bool {
        matches!(
            self,
            AssetError::Consistency { .. }
                | AssetError::InvalidReference { .. }
                | AssetError::InvalidString { .. }
        )
    }
}

impl From<toml::de::Error> for AssetError {
    fn from(err: toml::de::Error) -> Self {
        AssetError::TomlError(err.to_string())
    }
}

impl From<toml::ser::Error> for AssetError {
    fn from(err: toml::ser::Error) -> Self {
        AssetError::TomlError(err.to_string())
    }
}
