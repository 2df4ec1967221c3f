use crate::error::{AssetError, Result};
use crate::format::codec::{read_i32, read_u32, read_u64, write_i32, write_u32, write_u64};
use crate::format::index::PackageIndex;
use crate::format::names::NameTable;
use std::io::{Read, Write};

/// Import record size in bytes, without the extended trailing field
pub const IMPORT_RECORD_SIZE: usize = 28;

/// Class names whose imports are flagged as materials
pub const MATERIAL_CLASSES: [&str; 2] = ["Material", "MaterialInstanceConstant"];

/// Display name for an import without a parent
pub const NO_PARENT: &str = "None";

/// Externally defined class or object referenced by the container
///
/// Structure (28 bytes, +4 with extended records):
/// - Parent directory name index: uint64
/// - Class name index: uint64
/// - Parent import: int32 (package index)
/// - Name index: uint32
/// - Reserved: uint32
/// - Extended field: uint32 (extended records only)
///
/// The string fields are derived from the Name Table by [`resolve_imports`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Import {
    pub parent_dir_id: u64,
    pub class_id: u64,
    pub parent_import: PackageIndex,
    pub name_id: u32,
    pub reserved: u32,
    pub extended: Option<u32>,

    pub name: String,
    pub class_name: String,
    pub parent_dir: String,
    pub parent_name: String,
    pub is_material: bool,
}

impl Import {
    pub fn new(
        parent_dir_id: u64,
        class_id: u64,
        parent_import: PackageIndex,
        name_id: u32,
    ) -> Self {
        Self {
            parent_dir_id,
            class_id,
            parent_import,
            name_id,
            ..Self::default()
        }
    }

    /// Read one record
    pub fn read_from<R: Read>(reader: &mut R, extended: bool) -> Result<Self> {
        let parent_dir_id = read_u64(reader)?;
        let class_id = read_u64(reader)?;
        let parent_import = PackageIndex::from_raw(read_i32(reader)?);
        let name_id = read_u32(reader)?;
        let reserved = read_u32(reader)?;
        let extended = if extended {
            Some(read_u32(reader)?)
        } else {
            None
        };

        Ok(Self {
            parent_dir_id,
            class_id,
            parent_import,
            name_id,
            reserved,
            extended,
            ..Self::default()
        })
    }

    /// Write one record; the extended field is written as zero when it was never read
    pub fn write_to<W: Write>(&self, writer: &mut W, extended: bool) -> Result<()> {
        write_u64(writer, self.parent_dir_id)?;
        write_u64(writer, self.class_id)?;
        write_i32(writer, self.parent_import.to_raw())?;
        write_u32(writer, self.name_id)?;
        write_u32(writer, self.reserved)?;
        if extended {
            write_u32(writer, self.extended.unwrap_or(0))?;
        }
        Ok(())
    }

    /// Resolve this import's own name indices
    fn resolve_own_names(&mut self, names: &NameTable) -> Result<()> {
        self.name = names.get(u64::from(self.name_id))?.to_string();
        self.class_name = names.get(self.class_id)?.to_string();
        self.parent_dir = names.get(self.parent_dir_id)?.to_string();
        self.is_material = MATERIAL_CLASSES.contains(&self.class_name.as_str());
        Ok(())
    }
}

/// Read `count` import records
pub fn read_imports<R: Read>(reader: &mut R, count: u32, extended: bool) -> Result<Vec<Import>> {
    let mut imports = Vec::new();
    for _ in 0..count {
        imports.push(Import::read_from(reader, extended)?);
    }
    Ok(imports)
}

/// Resolve names, then parent chains.
///
/// Parent names are looked up among the already-resolved import names, so
/// every import's own name must be known before any parent is resolved.
pub fn resolve_imports(imports: &mut [Import], names: &NameTable) -> Result<()> {
    for import in imports.iter_mut() {
        import.resolve_own_names(names)?;
    }

    let import_names: Vec<String> = imports.iter().map(|i| i.name.clone()).collect();
    for import in imports.iter_mut() {
        import.parent_name = match import.parent_import {
            PackageIndex::None => NO_PARENT.to_string(),
            PackageIndex::Import(index) => import_names
                .get(index)
                .cloned()
                .ok_or(AssetError::InvalidReference {
                    table: "import",
                    index: index as i64,
                    len: import_names.len(),
                })?,
            PackageIndex::Direct(value) => {
                return Err(AssetError::InvalidReference {
                    table: "import",
                    index: i64::from(value),
                    len: import_names.len(),
                })
            }
        };
    }
    Ok(())
}
