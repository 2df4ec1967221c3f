//! Structured description of a parsed container
//!
//! ```no_run
//! use uasset_rs::{Container, ContainerOptions};
//!
//! let container = Container::open("SM_Rock.uasset", ContainerOptions::default())?;
//! println!("{}", container.to_json()?);
//! # Ok::<(), uasset_rs::AssetError>(())
//! ```

use crate::container::Container;
use crate::error::Result;
use crate::format::AssetKind;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ContainerSummary {
    pub asset_path: String,
    pub asset_name: String,
    pub asset_kind: AssetKind,
    pub version_tag: String,
    pub header_version: i32,
    pub unversioned: bool,
    pub header: HeaderSummary,
    pub names: Vec<NameSummary>,
    pub imports: Vec<ImportSummary>,
    pub exports: Vec<ExportSummary>,
    pub file_data: Vec<FileDataSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_trailer_len: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderSummary {
    pub uasset_size: u32,
    pub file_length: u32,
    pub name_count: u32,
    pub name_offset: u32,
    pub import_count: u32,
    pub import_offset: u32,
    pub export_count: u32,
    pub export_offset: u32,
    pub end_to_export: u32,
    pub padding_count: u32,
    pub padding_offset: u32,
    pub file_data_count: u32,
    pub file_data_offset: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameSummary {
    pub index: usize,
    pub name: String,
    /// Hex-encoded, absent for names appended since loading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub index: usize,
    pub name: String,
    pub class_name: String,
    pub parent_dir: String,
    pub parent_name: String,
    pub is_material: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub index: usize,
    pub name: String,
    pub class_name: String,
    pub import_name: String,
    pub size: u64,
    pub offset: u32,
    pub ignored: bool,
    /// CRC-32 of the body, when the payload was loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc32: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileDataSummary {
    None,
    Direct { value: i32 },
    Import { index: usize, name: String },
}

impl Container {
    /// Describe the container's header and tables
    pub fn summary(&self) -> ContainerSummary {
        let header = self.header();

        let names = self
            .names()
            .iter()
            .enumerate()
            .map(|(index, name)| NameSummary {
                index,
                name: name.to_string(),
                hash: self.names().hash(index).map(hex::encode),
            })
            .collect();

        let imports = self
            .imports()
            .iter()
            .enumerate()
            .map(|(index, import)| ImportSummary {
                index,
                name: import.name.clone(),
                class_name: import.class_name.clone(),
                parent_dir: import.parent_dir.clone(),
                parent_name: import.parent_name.clone(),
                is_material: import.is_material,
            })
            .collect();

        let exports = self
            .exports()
            .iter()
            .enumerate()
            .map(|(index, export)| ExportSummary {
                index,
                name: export.name.clone(),
                class_name: export.class_name.clone(),
                import_name: export.import_name.clone(),
                size: export.size,
                offset: export.offset,
                ignored: export.ignore,
                crc32: export.payload.as_deref().map(crc32fast::hash),
            })
            .collect();

        let file_data = self
            .file_data()
            .iter()
            .enumerate()
            .map(|(i, entry)| match entry.as_import() {
                Some(index) => FileDataSummary::Import {
                    index,
                    name: self
                        .file_data_import(i)
                        .map(|import| import.name.clone())
                        .unwrap_or_default(),
                },
                None if entry.is_none() => FileDataSummary::None,
                None => FileDataSummary::Direct {
                    value: entry.to_raw(),
                },
            })
            .collect();

        ContainerSummary {
            asset_path: self.asset_path().to_string(),
            asset_name: self.asset_name().to_string(),
            asset_kind: self.asset_kind(),
            version_tag: self.options().version.to_string(),
            header_version: header.version,
            unversioned: header.is_unversioned(),
            header: HeaderSummary {
                uasset_size: header.uasset_size,
                file_length: header.file_length,
                name_count: header.name_count,
                name_offset: header.name_offset,
                import_count: header.import_count,
                import_offset: header.import_offset,
                export_count: header.export_count,
                export_offset: header.export_offset,
                end_to_export: header.end_to_export,
                padding_count: header.padding_count,
                padding_offset: header.padding_offset,
                file_data_count: header.file_data_count,
                file_data_offset: header.file_data_offset,
            },
            names,
            imports,
            exports,
            file_data,
            payload_trailer_len: self.payload_trailer().map(<[u8]>::len),
        }
    }

    /// Pretty-printed JSON form of [`Container::summary`]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.summary())?)
    }
}
