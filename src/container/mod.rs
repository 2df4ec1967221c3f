//! The `Container` ties the tables of a metadata/payload pair together
//!
//! Reading goes through [`Container::open`] or [`Container::from_bytes`];
//! both validate every declared offset against the live stream position and
//! only hand back a container once every table and cross-reference checks
//! out. Writing goes through [`Container::save`] or [`Container::to_bytes`],
//! which recompute every offset from the bytes actually produced.

mod reader;
mod writer;

use crate::error::{AssetError, Result};
use crate::format::{
    classify_exports, resolve_imports, AssetKind, Export, Header, Import, NameTable, PackageIndex,
};
use crate::options::ContainerOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension of the metadata file
pub const METADATA_EXTENSION: &str = "uasset";

/// Extension of the payload file
pub const PAYLOAD_EXTENSION: &str = "uexp";

/// A parsed metadata/payload pair
#[derive(Debug, Clone)]
pub struct Container {
    options: ContainerOptions,
    header: Header,
    names: NameTable,
    imports: Vec<Import>,
    exports: Vec<Export>,
    file_data: Vec<PackageIndex>,
    asset_path: String,
    asset_kind: AssetKind,
    /// Payload bytes after the last export body; `None` in metadata-only mode
    payload_trailer: Option<Vec<u8>>,
}

impl Container {
    /// Assemble a container from tables, validating it the way the reader does.
    ///
    /// The payload counts as loaded when every export carries a body.
    pub fn from_parts(
        options: ContainerOptions,
        header: Header,
        names: NameTable,
        mut imports: Vec<Import>,
        mut exports: Vec<Export>,
        file_data: Vec<PackageIndex>,
    ) -> Result<Self> {
        resolve_imports(&mut imports, &names)?;
        let asset_path = derive_asset_path(&names, &imports)?;
        let asset_kind = classify_exports(&mut exports, &imports, &names)?;
        check_asset_kind(asset_kind, &options.asset_kind)?;
        validate_file_data(&file_data, imports.len())?;

        let payload_trailer = exports
            .iter()
            .all(|e| e.payload.is_some())
            .then(Vec::new);

        Ok(Self {
            options,
            header,
            names,
            imports,
            exports,
            file_data,
            asset_path,
            asset_kind,
            payload_trailer,
        })
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Header version (6 or 7)
    pub fn version(&self) -> i32 {
        self.header.version
    }

    pub fn is_unversioned(&self) -> bool {
        self.header.is_unversioned()
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Mutable Name Table. Appended names are written with zeroed hashes.
    /// Resolved strings on imports and exports are not refreshed.
    pub fn names_mut(&mut self) -> &mut NameTable {
        &mut self.names
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    pub fn export(&self, index: usize) -> Option<&Export> {
        self.exports.get(index)
    }

    /// Exports whose class is a recognized primary resource kind
    pub fn primary_exports(&self) -> impl Iterator<Item = &Export> {
        self.exports.iter().filter(|e| !e.ignore)
    }

    /// Imports of a material class
    pub fn material_imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter().filter(|i| i.is_material)
    }

    pub fn file_data(&self) -> &[PackageIndex] {
        &self.file_data
    }

    /// Import a file-data entry points at, if it is an import reference
    pub fn file_data_import(&self, index: usize) -> Option<&Import> {
        self.file_data
            .get(index)
            .and_then(|entry| entry.as_import())
            .and_then(|i| self.imports.get(i))
    }

    /// The container's own package path, e.g. `/Game/Meshes/SM_Rock`
    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    /// Last segment of the asset path
    pub fn asset_name(&self) -> &str {
        self.asset_path.rsplit('/').next().unwrap_or(&self.asset_path)
    }

    pub fn asset_kind(&self) -> AssetKind {
        self.asset_kind
    }

    /// Whether export bodies were loaded
    pub fn has_payload(&self) -> bool {
        self.payload_trailer.is_some()
    }

    /// Bytes following the last export body in the payload file
    pub fn payload_trailer(&self) -> Option<&[u8]> {
        self.payload_trailer.as_deref()
    }

    /// Replace an export's body; sizes and offsets are recomputed on write
    pub fn replace_payload(&mut self, index: usize, body: Vec<u8>) -> Result<()> {
        if !self.has_payload() {
            return Err(AssetError::PayloadNotLoaded);
        }
        let len = self.exports.len();
        let export = self
            .exports
            .get_mut(index)
            .ok_or(AssetError::InvalidReference {
                table: "export",
                index: index as i64,
                len,
            })?;
        debug!(
            "Replacing payload of export {} ({} -> {} bytes)",
            export.name,
            export.size,
            body.len()
        );
        export.replace_payload(body);
        Ok(())
    }

    /// Dump the tables through tracing; info level when verbose, debug otherwise
    fn log_tables(&self) {
        let verbose = self.options.verbose;
        macro_rules! emit {
            ($($arg:tt)*) => {
                if verbose {
                    info!($($arg)*);
                } else {
                    debug!($($arg)*);
                }
            };
        }

        emit!(
            "Header v{}: size {}, {} names, {} imports @ {}, {} exports @ {}, file data {} @ {}",
            self.header.version,
            self.header.uasset_size,
            self.header.name_count,
            self.header.import_count,
            self.header.import_offset,
            self.header.export_count,
            self.header.export_offset,
            self.header.file_data_count,
            self.header.file_data_offset
        );
        for (i, name) in self.names.iter().enumerate() {
            emit!("  name {}: {}", i, name);
        }
        for (i, import) in self.imports.iter().enumerate() {
            emit!(
                "  import {}: {} (class {}, parent dir {}, parent import {})",
                i,
                import.name,
                import.class_name,
                import.parent_dir,
                import.parent_name
            );
        }
        for export in &self.exports {
            let note = if export.ignore { " (ignored)" } else { "" };
            emit!(
                "  export {}: class {}, import {}, size {}, offset {}{}",
                export.name,
                export.class_name,
                export.import_name,
                export.size,
                export.offset,
                note
            );
        }
    }
}

/// Metadata and payload paths for either file of a pair
pub fn container_paths(path: &Path) -> Result<(PathBuf, PathBuf)> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(METADATA_EXTENSION) | Some(PAYLOAD_EXTENSION) => Ok((
            path.with_extension(METADATA_EXTENSION),
            path.with_extension(PAYLOAD_EXTENSION),
        )),
        _ => Err(AssetError::NotAContainer(path.to_path_buf())),
    }
}

/// The single path-like name that no import uses as its own name or parent directory
pub fn derive_asset_path(names: &NameTable, imports: &[Import]) -> Result<String> {
    let candidates: Vec<String> = names
        .iter()
        .filter(|name| name.starts_with('/'))
        .filter(|name| {
            !imports
                .iter()
                .any(|i| i.name == *name || i.parent_dir == *name)
        })
        .map(str::to_string)
        .collect();

    match <[String; 1]>::try_from(candidates) {
        Ok([path]) => Ok(path),
        Err(candidates) => Err(AssetError::AssetPathAmbiguity { candidates }),
    }
}

/// Accept `kind` when the expected filter is empty or a substring of it
pub fn check_asset_kind(kind: AssetKind, expected: &str) -> Result<()> {
    if kind.as_str().contains(expected) {
        Ok(())
    } else {
        Err(AssetError::UnsupportedAsset(format!(
            "expected {}, found {}",
            expected, kind
        )))
    }
}

/// Every import back-reference in the file-data array must exist
fn validate_file_data(file_data: &[PackageIndex], import_count: usize) -> Result<()> {
    for entry in file_data {
        if let PackageIndex::Import(index) = entry {
            if *index >= import_count {
                return Err(AssetError::InvalidReference {
                    table: "import",
                    index: *index as i64,
                    len: import_count,
                });
            }
        }
    }
    Ok(())
}
