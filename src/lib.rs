//! uasset-rs: reader and writer for `.uasset`/`.uexp` asset container pairs
//!
//! A container is split over two files:
//! - the metadata file (`.uasset`): header, Name Table, Import Table,
//!   Export Table, padding and the file-data index array
//! - the payload file (`.uexp`): the export bodies back to back
//!
//! Reading validates every declared offset and cross-table reference and
//! fails on the first disagreement. Export bodies are opaque byte blobs that
//! are passed through untouched unless replaced. Writing recomputes every
//! offset, so edited bodies shift the layout correctly.
//!
//! # Example
//!
//! ```no_run
//! use uasset_rs::{Container, ContainerOptions};
//!
//! let options = ContainerOptions::default().with_asset_kind("Texture");
//! let mut container = Container::open("T_Rock.uasset", options)?;
//! println!("{} is a {}", container.asset_path(), container.asset_kind());
//!
//! container.replace_payload(0, vec![0u8; 128])?;
//! container.save("out/T_Rock.uasset")?;
//! # Ok::<(), uasset_rs::error::AssetError>(())
//! ```

// Core modules
pub mod container;
pub mod error;
pub mod format;
pub mod options;
pub mod summary;

// Re-export commonly used types
pub use container::{container_paths, Container, METADATA_EXTENSION, PAYLOAD_EXTENSION};
pub use error::{AssetError, Result};
pub use format::{
    AssetKind, Export, FString, Header, Import, NameHash, NameTable, PackageIndex, MAGIC,
    SUPPORTED_VERSIONS,
};
pub use options::{ContainerOptions, VersionTag};
pub use summary::ContainerSummary;
