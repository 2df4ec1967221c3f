use crate::error::{AssetError, Result};
use crate::format::codec::{
    read_exact, read_i32, read_u32, read_u64, write_i32, write_u32, write_u64,
};
use crate::format::imports::Import;
use crate::format::index::PackageIndex;
use crate::format::names::NameTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use tracing::warn;

/// Export record size in bytes, without the extended trailing field
pub const EXPORT_RECORD_SIZE: usize = 104;

/// Primary resource kinds a container can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    SkeletalMesh,
    StaticMesh,
    Skeleton,
    Texture2D,
    TextureCube,
    Material,
    MaterialInstanceConstant,
}

impl AssetKind {
    pub const ALL: [AssetKind; 7] = [
        AssetKind::SkeletalMesh,
        AssetKind::StaticMesh,
        AssetKind::Skeleton,
        AssetKind::Texture2D,
        AssetKind::TextureCube,
        AssetKind::Material,
        AssetKind::MaterialInstanceConstant,
    ];

    /// Recognize an export class name
    pub fn from_class_name(class_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == class_name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::SkeletalMesh => "SkeletalMesh",
            AssetKind::StaticMesh => "StaticMesh",
            AssetKind::Skeleton => "Skeleton",
            AssetKind::Texture2D => "Texture2D",
            AssetKind::TextureCube => "TextureCube",
            AssetKind::Material => "Material",
            AssetKind::MaterialInstanceConstant => "MaterialInstanceConstant",
        }
    }

    pub fn is_texture(self) -> bool {
        matches!(self, AssetKind::Texture2D | AssetKind::TextureCube)
    }

    pub fn is_material(self) -> bool {
        matches!(self, AssetKind::Material | AssetKind::MaterialInstanceConstant)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object physically stored in the payload file
///
/// Structure (104 bytes, +4 with extended records):
/// - Class index: int32 (package index)
/// - Reserved: uint32
/// - Import index: int32 (package index of the owning import)
/// - Reserved: uint32
/// - Name index: uint32
/// - Unknown: uint32 x2
/// - Payload size: uint64
/// - Payload offset: uint32 (absolute, metadata size + preceding bodies)
/// - Reserved: 64 bytes
/// - Extended field: uint32 (extended records only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub class_index: PackageIndex,
    pub reserved_a: u32,
    pub import_index: PackageIndex,
    pub reserved_b: u32,
    pub name_id: u32,
    pub unknown_a: u32,
    pub unknown_b: u32,
    pub size: u64,
    pub offset: u32,
    pub reserved: [u8; 64],
    pub extended: Option<u32>,

    /// Derived by [`classify_exports`]
    pub name: String,
    pub class_name: String,
    pub import_name: String,
    pub ignore: bool,

    /// Opaque body, present once the payload file has been read
    pub payload: Option<Vec<u8>>,
}

impl Export {
    /// New export owned by `import_index`, carrying `payload` as its body
    pub fn new(import_index: PackageIndex, name_id: u32, payload: Vec<u8>) -> Self {
        Self {
            class_index: PackageIndex::None,
            reserved_a: 0,
            import_index,
            reserved_b: 0,
            name_id,
            unknown_a: 0,
            unknown_b: 0,
            size: payload.len() as u64,
            offset: 0,
            reserved: [0; 64],
            extended: None,
            name: String::new(),
            class_name: String::new(),
            import_name: String::new(),
            ignore: true,
            payload: Some(payload),
        }
    }

    /// Read one record
    pub fn read_from<R: Read>(reader: &mut R, extended: bool) -> Result<Self> {
        let class_index = PackageIndex::from_raw(read_i32(reader)?);
        let reserved_a = read_u32(reader)?;
        let import_index = PackageIndex::from_raw(read_i32(reader)?);
        let reserved_b = read_u32(reader)?;
        let name_id = read_u32(reader)?;
        let unknown_a = read_u32(reader)?;
        let unknown_b = read_u32(reader)?;
        let size = read_u64(reader)?;
        let offset = read_u32(reader)?;
        let reserved = read_exact(reader)?;
        let extended = if extended {
            Some(read_u32(reader)?)
        } else {
            None
        };

        Ok(Self {
            class_index,
            reserved_a,
            import_index,
            reserved_b,
            name_id,
            unknown_a,
            unknown_b,
            size,
            offset,
            reserved,
            extended,
            name: String::new(),
            class_name: String::new(),
            import_name: String::new(),
            ignore: true,
            payload: None,
        })
    }

    /// Write one record
    pub fn write_to<W: Write>(&self, writer: &mut W, extended: bool) -> Result<()> {
        write_i32(writer, self.class_index.to_raw())?;
        write_u32(writer, self.reserved_a)?;
        write_i32(writer, self.import_index.to_raw())?;
        write_u32(writer, self.reserved_b)?;
        write_u32(writer, self.name_id)?;
        write_u32(writer, self.unknown_a)?;
        write_u32(writer, self.unknown_b)?;
        write_u64(writer, self.size)?;
        write_u32(writer, self.offset)?;
        writer.write_all(&self.reserved)?;
        if extended {
            write_u32(writer, self.extended.unwrap_or(0))?;
        }
        Ok(())
    }

    /// Set the declared size and absolute payload offset
    pub fn update(&mut self, size: u64, offset: u32) {
        self.size = size;
        self.offset = offset;
    }

    /// Read exactly `size` bytes of body
    pub fn read_payload<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let len = usize::try_from(self.size).map_err(|_| AssetError::FieldOverflow {
            field: "export size",
            value: self.size,
        })?;
        let mut body = Vec::new();
        reader.by_ref().take(self.size).read_to_end(&mut body)?;
        if body.len() != len {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        self.payload = Some(body);
        Ok(())
    }

    /// Write the body verbatim
    pub fn write_payload<W: Write>(&self, writer: &mut W) -> Result<()> {
        let body = self.payload.as_ref().ok_or(AssetError::PayloadNotLoaded)?;
        writer.write_all(body)?;
        Ok(())
    }

    /// Swap the body, keeping the declared size in step
    pub fn replace_payload(&mut self, body: Vec<u8>) {
        self.size = body.len() as u64;
        self.payload = Some(body);
    }

    /// Kind of this export, if it is one of the recognized primary resources
    pub fn asset_kind(&self) -> Option<AssetKind> {
        AssetKind::from_class_name(&self.class_name)
    }
}

/// Read `count` export records
pub fn read_exports<R: Read>(reader: &mut R, count: u32, extended: bool) -> Result<Vec<Export>> {
    let mut exports = Vec::new();
    for _ in 0..count {
        exports.push(Export::read_from(reader, extended)?);
    }
    Ok(exports)
}

/// Resolve each export's owning import and name, flag non-primary exports as
/// ignored, and return the kind of the first primary export.
pub fn classify_exports(
    exports: &mut [Export],
    imports: &[Import],
    names: &NameTable,
) -> Result<AssetKind> {
    let mut asset_kind = None;

    for export in exports.iter_mut() {
        let import = match export.import_index {
            PackageIndex::Import(index) => {
                imports.get(index).ok_or(AssetError::InvalidReference {
                    table: "import",
                    index: index as i64,
                    len: imports.len(),
                })?
            }
            other => {
                return Err(AssetError::InvalidReference {
                    table: "import",
                    index: i64::from(other.to_raw()),
                    len: imports.len(),
                })
            }
        };

        if let PackageIndex::Import(index) = export.class_index {
            if index >= imports.len() {
                return Err(AssetError::InvalidReference {
                    table: "import",
                    index: index as i64,
                    len: imports.len(),
                });
            }
        }

        export.import_name = import.name.clone();
        export.class_name = import.class_name.clone();
        export.name = names.get(u64::from(export.name_id))?.to_string();

        match AssetKind::from_class_name(&export.class_name) {
            Some(kind) => {
                export.ignore = false;
                match asset_kind {
                    None => asset_kind = Some(kind),
                    Some(first) if first != kind => warn!(
                        "Export {} is a {}, but the asset was already classified as {}",
                        export.name, kind, first
                    ),
                    Some(_) => {}
                }
            }
            None => export.ignore = true,
        }
    }

    asset_kind.ok_or_else(|| {
        AssetError::UnsupportedAsset("no export has a recognized resource class".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::imports::resolve_imports;
    use std::io::Cursor;

    fn tables() -> (NameTable, Vec<Import>) {
        let names = NameTable::from_names([
            "/Script/Engine",
            "Texture2D",
            "Default__Texture2D",
            "T_Rock",
            "AssetImportData",
            "Default__AssetImportData",
            "StaticMesh",
            "Default__StaticMesh",
        ]);
        let mut imports = vec![
            Import::new(0, 1, PackageIndex::None, 2),
            Import::new(0, 4, PackageIndex::None, 5),
            Import::new(0, 6, PackageIndex::None, 7),
        ];
        resolve_imports(&mut imports, &names).unwrap();
        (names, imports)
    }

    #[test]
    fn test_record_sizes() {
        let export = Export::new(PackageIndex::import(0), 3, vec![1, 2, 3]);

        let mut buf = Vec::new();
        export.write_to(&mut buf, false).unwrap();
        assert_eq!(buf.len(), EXPORT_RECORD_SIZE);

        let mut buf = Vec::new();
        export.write_to(&mut buf, true).unwrap();
        assert_eq!(buf.len(), EXPORT_RECORD_SIZE + 4);
    }

    #[test]
    fn test_record_roundtrip() {
        let mut export = Export::new(PackageIndex::import(2), 3, Vec::new());
        export.class_index = PackageIndex::import(1);
        export.update(4096, 1000);
        export.reserved[10] = 0x42;
        export.extended = Some(5);
        export.payload = None;

        let mut buf = Vec::new();
        export.write_to(&mut buf, true).unwrap();
        let parsed = Export::read_from(&mut Cursor::new(&buf), true).unwrap();
        assert_eq!(parsed, export);
        assert_eq!(&buf[28..36], &4096u64.to_le_bytes());
        assert_eq!(&buf[36..40], &1000u32.to_le_bytes());
    }

    #[test]
    fn test_classification() {
        let (names, imports) = tables();
        let mut exports = vec![
            Export::new(PackageIndex::import(0), 3, Vec::new()),
            Export::new(PackageIndex::import(1), 4, Vec::new()),
        ];

        let kind = classify_exports(&mut exports, &imports, &names).unwrap();
        assert_eq!(kind, AssetKind::Texture2D);

        assert_eq!(exports[0].name, "T_Rock");
        assert_eq!(exports[0].class_name, "Texture2D");
        assert_eq!(exports[0].import_name, "Default__Texture2D");
        assert!(!exports[0].ignore);

        assert_eq!(exports[1].class_name, "AssetImportData");
        assert!(exports[1].ignore);
    }

    #[test]
    fn test_first_recognized_export_wins() {
        let (names, imports) = tables();
        let mut exports = vec![
            Export::new(PackageIndex::import(1), 4, Vec::new()),
            Export::new(PackageIndex::import(2), 3, Vec::new()),
            Export::new(PackageIndex::import(0), 3, Vec::new()),
        ];

        let kind = classify_exports(&mut exports, &imports, &names).unwrap();
        assert_eq!(kind, AssetKind::StaticMesh);
        assert!(!exports[2].ignore);
    }

    #[test]
    fn test_class_reference_out_of_range() {
        let (names, imports) = tables();
        let mut export = Export::new(PackageIndex::import(0), 3, Vec::new());
        export.class_index = PackageIndex::import(3);

        match classify_exports(&mut [export], &imports, &names) {
            Err(AssetError::InvalidReference { table: "import", index: 3, len: 3 }) => {}
            other => panic!("Expected InvalidReference, got: {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_container_rejected() {
        let (names, imports) = tables();
        let mut exports = vec![Export::new(PackageIndex::import(1), 4, Vec::new())];
        assert!(matches!(
            classify_exports(&mut exports, &imports, &names),
            Err(AssetError::UnsupportedAsset(_))
        ));
    }

    #[test]
    fn test_bad_import_reference() {
        let (names, imports) = tables();

        let mut exports = vec![Export::new(PackageIndex::import(3), 3, Vec::new())];
        assert!(matches!(
            classify_exports(&mut exports, &imports, &names),
            Err(AssetError::InvalidReference { table: "import", index: 3, len: 3 })
        ));

        let mut exports = vec![Export::new(PackageIndex::None, 3, Vec::new())];
        assert!(classify_exports(&mut exports, &imports, &names).is_err());
    }

    #[test]
    fn test_payload_io() {
        let mut export = Export::new(PackageIndex::import(0), 0, Vec::new());
        export.size = 4;
        export.payload = None;

        let data = [9u8, 8, 7, 6, 5];
        let mut cursor = Cursor::new(&data[..]);
        export.read_payload(&mut cursor).unwrap();
        assert_eq!(export.payload.as_deref(), Some(&[9u8, 8, 7, 6][..]));
        assert_eq!(cursor.position(), 4);

        let mut out = Vec::new();
        export.write_payload(&mut out).unwrap();
        assert_eq!(out, [9, 8, 7, 6]);

        export.replace_payload(vec![1; 10]);
        assert_eq!(export.size, 10);
    }

    #[test]
    fn test_short_payload_rejected() {
        let mut export = Export::new(PackageIndex::import(0), 0, Vec::new());
        export.size = 8;
        let result = export.read_payload(&mut Cursor::new(&[1u8, 2, 3][..]));
        assert!(matches!(result, Err(AssetError::Io(_))));
    }

    #[test]
    fn test_asset_kind_names() {
        for kind in AssetKind::ALL {
            assert_eq!(AssetKind::from_class_name(kind.as_str()), Some(kind));
        }
        assert_eq!(AssetKind::from_class_name("Texture"), None);
        assert!(AssetKind::TextureCube.is_texture());
        assert!(AssetKind::MaterialInstanceConstant.is_material());
    }
}
