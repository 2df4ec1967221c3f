use crate::error::{AssetError, Result};
use crate::format::codec::{
    check_value, read_exact, read_i32, read_u32, read_u64, write_i32, write_u32, write_u64,
};
use std::io::{Read, Seek, Write};

/// Magic number at the start of every metadata file
pub const MAGIC: [u8; 4] = [0xC1, 0x83, 0x2A, 0x9E];

/// Header versions this crate reads and writes
pub const SUPPORTED_VERSIONS: [i32; 2] = [6, 7];

/// Package flag marking an unversioned (cooked) container
pub const UNVERSIONED_FLAG: u32 = 0x2000;

/// Size of the fixed struct between the version block and the optional tail
pub const FIXED_STRUCT_SIZE: u64 = 169;

/// Size of the tail present from version 7 on
pub const TAIL_SIZE: u64 = 12;

/// Length-prefixed folder name every container carries: "None" plus terminator
const FOLDER_NAME: [u8; 5] = *b"None\0";

/// Sentinel the version 7 tail repeats twice
const TAIL_SENTINEL: i32 = -1;

/// Trailing fields present from header version 7 on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderTail {
    pub unknown_count: u32,
}

/// Metadata file header
///
/// Layout:
/// - Magic: `C1 83 2A 9E` (4 bytes)
/// - Version marker: int32, `-version - 1` (4 bytes)
/// - Version block: 16 bytes (20 from version 7)
/// - Fixed struct: 169 bytes
/// - Tail (version 7+): uint32 count, int32 -1, int32 -1 (12 bytes)
///
/// Totals 193 bytes for version 6 and 209 for version 7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: i32,
    /// Raw bytes following the version marker, re-emitted verbatim
    pub version_block: Vec<u8>,

    pub uasset_size: u32,
    pub folder_name_length: u32,
    pub folder_name: [u8; 5],
    pub package_flags: u32,
    pub name_count: u32,
    pub name_offset: u32,
    pub reserved_a: [u8; 8],
    pub export_count: u32,
    pub export_offset: u32,
    pub import_count: u32,
    pub import_offset: u32,
    pub end_to_export: u32,
    pub reserved_b: [u8; 16],
    pub guid: [u8; 16],
    pub unknown_a: u32,
    pub padding_count: u32,
    pub name_count_repeat: u32,
    pub reserved_c: [u8; 36],
    pub unknown_b: u64,
    pub padding_offset: u32,
    /// Metadata size plus payload size, minus 4
    pub file_length: u32,
    pub reserved_d: [u8; 12],
    pub file_data_count: u32,
    pub file_data_offset: u32,

    pub tail: Option<HeaderTail>,
}

impl Header {
    /// Blank header for a new container; offsets and counts are filled in on write
    pub fn new(version: i32) -> Result<Self> {
        validate_version(i64::from(version))?;
        Ok(Self {
            version,
            version_block: vec![0u8; version_block_len(version)],
            uasset_size: 0,
            folder_name_length: FOLDER_NAME.len() as u32,
            folder_name: FOLDER_NAME,
            package_flags: UNVERSIONED_FLAG,
            name_count: 0,
            name_offset: 0,
            reserved_a: [0; 8],
            export_count: 0,
            export_offset: 0,
            import_count: 0,
            import_offset: 0,
            end_to_export: 0,
            reserved_b: [0; 16],
            guid: [0; 16],
            unknown_a: 0,
            padding_count: 0,
            name_count_repeat: 0,
            reserved_c: [0; 36],
            unknown_b: 0,
            padding_offset: 0,
            file_length: 0,
            reserved_d: [0; 12],
            file_data_count: 0,
            file_data_offset: 0,
            tail: (version >= 7).then_some(HeaderTail { unknown_count: 0 }),
        })
    }

    /// Whether the unversioned package flag is set
    pub fn is_unversioned(&self) -> bool {
        self.package_flags & UNVERSIONED_FLAG != 0
    }

    /// Bytes this header occupies on disk
    pub fn encoded_len(&self) -> u64 {
        let tail = if self.tail.is_some() { TAIL_SIZE } else { 0 };
        8 + self.version_block.len() as u64 + FIXED_STRUCT_SIZE + tail
    }

    /// Read header from a reader
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let magic = read_exact::<4, _>(reader)?;
        if magic != MAGIC {
            return Err(AssetError::MagicMismatch {
                expected: MAGIC,
                actual: magic,
            });
        }

        let marker = read_i32(reader)?;
        let decoded = -i64::from(marker) - 1;
        let version = validate_version(decoded)?;

        let mut version_block = vec![0u8; version_block_len(version)];
        reader.read_exact(&mut version_block)?;

        let uasset_size = read_u32(reader)?;
        let folder_position = reader.stream_position()?;
        let folder_name_length = read_u32(reader)?;
        check_value(
            "folder_name_length",
            FOLDER_NAME.len() as i64,
            i64::from(folder_name_length),
            folder_position,
        )?;
        let folder_name = read_exact(reader)?;
        let package_flags = read_u32(reader)?;
        let name_count = read_u32(reader)?;
        let name_offset = read_u32(reader)?;
        let reserved_a = read_exact(reader)?;
        let export_count = read_u32(reader)?;
        let export_offset = read_u32(reader)?;
        let import_count = read_u32(reader)?;
        let import_offset = read_u32(reader)?;
        let end_to_export = read_u32(reader)?;
        let reserved_b = read_exact(reader)?;
        let guid = read_exact(reader)?;
        let unknown_a = read_u32(reader)?;
        let padding_count = read_u32(reader)?;
        let name_count_repeat = read_u32(reader)?;
        let reserved_c = read_exact(reader)?;
        let unknown_b = read_u64(reader)?;
        let padding_offset = read_u32(reader)?;
        let file_length = read_u32(reader)?;
        let reserved_d = read_exact(reader)?;
        let file_data_count = read_u32(reader)?;
        let file_data_offset = read_u32(reader)?;

        let tail = if version >= 7 {
            let unknown_count = read_u32(reader)?;
            for _ in 0..2 {
                let position = reader.stream_position()?;
                let sentinel = read_i32(reader)?;
                check_value(
                    "header tail sentinel",
                    i64::from(TAIL_SENTINEL),
                    i64::from(sentinel),
                    position,
                )?;
            }
            Some(HeaderTail { unknown_count })
        } else {
            None
        };

        Ok(Self {
            version,
            version_block,
            uasset_size,
            folder_name_length,
            folder_name,
            package_flags,
            name_count,
            name_offset,
            reserved_a,
            export_count,
            export_offset,
            import_count,
            import_offset,
            end_to_export,
            reserved_b,
            guid,
            unknown_a,
            padding_count,
            name_count_repeat,
            reserved_c,
            unknown_b,
            padding_offset,
            file_length,
            reserved_d,
            file_data_count,
            file_data_offset,
            tail,
        })
    }

    /// Write header to a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        write_i32(writer, -self.version - 1)?;
        writer.write_all(&self.version_block)?;

        write_u32(writer, self.uasset_size)?;
        write_u32(writer, self.folder_name_length)?;
        writer.write_all(&self.folder_name)?;
        write_u32(writer, self.package_flags)?;
        write_u32(writer, self.name_count)?;
        write_u32(writer, self.name_offset)?;
        writer.write_all(&self.reserved_a)?;
        write_u32(writer, self.export_count)?;
        write_u32(writer, self.export_offset)?;
        write_u32(writer, self.import_count)?;
        write_u32(writer, self.import_offset)?;
        write_u32(writer, self.end_to_export)?;
        writer.write_all(&self.reserved_b)?;
        writer.write_all(&self.guid)?;
        write_u32(writer, self.unknown_a)?;
        write_u32(writer, self.padding_count)?;
        write_u32(writer, self.name_count_repeat)?;
        writer.write_all(&self.reserved_c)?;
        write_u64(writer, self.unknown_b)?;
        write_u32(writer, self.padding_offset)?;
        write_u32(writer, self.file_length)?;
        writer.write_all(&self.reserved_d)?;
        write_u32(writer, self.file_data_count)?;
        write_u32(writer, self.file_data_offset)?;

        if let Some(tail) = &self.tail {
            write_u32(writer, tail.unknown_count)?;
            write_i32(writer, TAIL_SENTINEL)?;
            write_i32(writer, TAIL_SENTINEL)?;
        }

        Ok(())
    }
}

fn validate_version(version: i64) -> Result<i32> {
    SUPPORTED_VERSIONS
        .iter()
        .copied()
        .find(|supported| i64::from(*supported) == version)
        .ok_or(AssetError::UnsupportedVersion(version))
}

fn version_block_len(version: i32) -> usize {
    if version >= 7 {
        20
    } else {
        16
    }
}
