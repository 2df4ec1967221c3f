//! Shared fixture: lays out metadata/payload bytes by hand, without using
//! the crate's writer, so reader and writer are both checked against an
//! independent rendition of the format.

#![allow(dead_code)]

pub const MAGIC: [u8; 4] = [0xC1, 0x83, 0x2A, 0x9E];

// Field positions inside a version 6 header
pub const UASSET_SIZE_AT: usize = 24;
pub const NAME_COUNT_AT: usize = 41;
pub const NAME_OFFSET_AT: usize = 45;
pub const EXPORT_OFFSET_AT: usize = 61;
pub const IMPORT_OFFSET_AT: usize = 69;
pub const END_TO_EXPORT_AT: usize = 73;
pub const PADDING_OFFSET_AT: usize = 165;
pub const FILE_LENGTH_AT: usize = 169;
pub const FILE_DATA_OFFSET_AT: usize = 189;

#[derive(Debug, Clone)]
pub struct RawImport {
    pub parent_dir_id: u64,
    pub class_id: u64,
    pub parent_import: i32,
    pub name_id: u32,
}

#[derive(Debug, Clone)]
pub struct RawExport {
    pub class_index: i32,
    pub import_index: i32,
    pub name_id: u32,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RawFixture {
    pub version: i32,
    pub extended: bool,
    pub names: Vec<(String, [u8; 4])>,
    pub imports: Vec<RawImport>,
    pub exports: Vec<RawExport>,
    pub padding_count: u32,
    pub file_data: Vec<i32>,
    pub trailer: Vec<u8>,
}

/// Offsets computed while laying out a fixture
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub header_len: usize,
    pub import_offset: usize,
    pub export_offset: usize,
    pub end_to_export: usize,
    pub padding_offset: usize,
    pub file_data_offset: usize,
    pub uasset_size: usize,
}

impl RawFixture {
    /// A static mesh container: `/Game/Foo` with a mesh export and a body-setup export
    pub fn static_mesh() -> Self {
        let names = [
            "/Game/Foo",
            "/Script/Engine",
            "StaticMesh",
            "Default__StaticMesh",
            "Foo",
            "BodySetup",
            "Default__BodySetup",
            "Package",
        ];
        Self {
            version: 6,
            extended: false,
            names: names
                .iter()
                .enumerate()
                .map(|(i, n)| (n.to_string(), [0xA0 + i as u8, 0x0B, 0x0C, i as u8]))
                .collect(),
            imports: vec![
                RawImport {
                    parent_dir_id: 1,
                    class_id: 2,
                    parent_import: -3,
                    name_id: 3,
                },
                RawImport {
                    parent_dir_id: 1,
                    class_id: 5,
                    parent_import: -3,
                    name_id: 6,
                },
                RawImport {
                    parent_dir_id: 1,
                    class_id: 7,
                    parent_import: 0,
                    name_id: 1,
                },
            ],
            exports: vec![
                RawExport {
                    class_index: -3,
                    import_index: -1,
                    name_id: 4,
                    body: (0..40u8).collect(),
                },
                RawExport {
                    class_index: -3,
                    import_index: -2,
                    name_id: 5,
                    body: vec![0xEE; 16],
                },
            ],
            padding_count: 2,
            file_data: vec![-1, -2, 1],
            trailer: MAGIC.to_vec(),
        }
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn with_extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    pub fn layout(&self) -> Layout {
        let header_len = if self.version >= 7 { 209 } else { 193 };
        let names_len: usize = self.names.iter().map(|(n, _)| 4 + n.len() + 1 + 4).sum();
        let record_tail = if self.extended { 4 } else { 0 };
        let import_offset = header_len + names_len;
        let export_offset = import_offset + self.imports.len() * (28 + record_tail);
        let end_to_export = export_offset + self.exports.len() * (104 + record_tail);
        let padding_offset = end_to_export + self.padding_count as usize * 4;
        let file_data_offset = padding_offset + 4;
        let uasset_size = file_data_offset + self.file_data.len() * 4;
        Layout {
            header_len,
            import_offset,
            export_offset,
            end_to_export,
            padding_offset,
            file_data_offset,
            uasset_size,
        }
    }

    pub fn payload(&self) -> Vec<u8> {
        let mut payload: Vec<u8> = self.exports.iter().flat_map(|e| e.body.clone()).collect();
        payload.extend_from_slice(&self.trailer);
        payload
    }

    /// Lay out `(metadata, payload)` bytes
    pub fn build(&self) -> (Vec<u8>, Vec<u8>) {
        let layout = self.layout();
        let payload = self.payload();
        let file_length = layout.uasset_size + payload.len() - 4;

        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        put_i32(&mut out, -self.version - 1);
        out.extend_from_slice(&vec![0u8; if self.version >= 7 { 20 } else { 16 }]);

        put_u32(&mut out, layout.uasset_size as u32);
        put_u32(&mut out, 5);
        out.extend_from_slice(b"None\0");
        put_u32(&mut out, 0x2000 | 0x1);
        put_u32(&mut out, self.names.len() as u32);
        put_u32(&mut out, layout.header_len as u32);
        out.extend_from_slice(&[0u8; 8]);
        put_u32(&mut out, self.exports.len() as u32);
        put_u32(&mut out, layout.export_offset as u32);
        put_u32(&mut out, self.imports.len() as u32);
        put_u32(&mut out, layout.import_offset as u32);
        put_u32(&mut out, layout.end_to_export as u32);
        out.extend_from_slice(&[0u8; 16]);
        out.extend_from_slice(&[0x11; 16]); // guid
        put_u32(&mut out, 0xAAAA);
        put_u32(&mut out, self.padding_count);
        put_u32(&mut out, self.names.len() as u32);
        let mut reserved = [0u8; 36];
        reserved[0] = 0x7F;
        out.extend_from_slice(&reserved);
        out.extend_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
        put_u32(&mut out, layout.padding_offset as u32);
        put_u32(&mut out, file_length as u32);
        out.extend_from_slice(&[0u8; 12]);
        put_u32(&mut out, self.file_data.len() as u32);
        put_u32(&mut out, layout.file_data_offset as u32);
        if self.version >= 7 {
            put_u32(&mut out, 3);
            put_i32(&mut out, -1);
            put_i32(&mut out, -1);
        }
        assert_eq!(out.len(), layout.header_len);

        for (name, hash) in &self.names {
            put_i32(&mut out, name.len() as i32 + 1);
            out.extend_from_slice(name.as_bytes());
            out.push(0);
            out.extend_from_slice(hash);
        }
        assert_eq!(out.len(), layout.import_offset);

        for (i, import) in self.imports.iter().enumerate() {
            out.extend_from_slice(&import.parent_dir_id.to_le_bytes());
            out.extend_from_slice(&import.class_id.to_le_bytes());
            put_i32(&mut out, import.parent_import);
            put_u32(&mut out, import.name_id);
            put_u32(&mut out, 0);
            if self.extended {
                put_u32(&mut out, 0x500 + i as u32);
            }
        }
        assert_eq!(out.len(), layout.export_offset);

        let mut offset = layout.uasset_size;
        for (i, export) in self.exports.iter().enumerate() {
            put_i32(&mut out, export.class_index);
            put_u32(&mut out, 0);
            put_i32(&mut out, export.import_index);
            put_u32(&mut out, 0);
            put_u32(&mut out, export.name_id);
            put_u32(&mut out, 0x10 + i as u32);
            put_u32(&mut out, 0);
            out.extend_from_slice(&(export.body.len() as u64).to_le_bytes());
            put_u32(&mut out, offset as u32);
            let mut reserved = [0u8; 64];
            reserved[63] = i as u8 + 1;
            out.extend_from_slice(&reserved);
            if self.extended {
                put_u32(&mut out, 0x600 + i as u32);
            }
            offset += export.body.len();
        }
        assert_eq!(out.len(), layout.end_to_export);

        out.extend_from_slice(&vec![0u8; (self.padding_count as usize + 1) * 4]);
        assert_eq!(out.len(), layout.file_data_offset);

        for value in &self.file_data {
            put_i32(&mut out, *value);
        }
        assert_eq!(out.len(), layout.uasset_size);

        (out, payload)
    }
}

pub fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn patch_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn patch_i32(bytes: &mut [u8], at: usize, value: i32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
