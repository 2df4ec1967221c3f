use crate::container::{container_paths, Container};
use crate::error::{AssetError, Result};
use crate::format::codec::{position_u32, to_u32, write_i32_array, write_null_bytes, NULL_WORD_SIZE};
use std::fs;
use std::io::{Cursor, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, info};

impl Container {
    /// Write the pair to `path` (either extension).
    ///
    /// Both files are laid out in memory first; the payload file is written
    /// before the metadata file, so a failed payload write leaves the
    /// metadata file untouched.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let (metadata_path, payload_path) = container_paths(path.as_ref())?;

        if let Some(dir) = metadata_path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let (metadata, payload) = self.to_bytes()?;

        info!("Saving {}", payload_path.display());
        fs::write(&payload_path, &payload)?;

        info!("Saving {}", metadata_path.display());
        fs::write(&metadata_path, &metadata)?;

        Ok(())
    }

    /// Serialize to `(metadata, payload)` bytes, recomputing every offset
    pub fn to_bytes(&mut self) -> Result<(Vec<u8>, Vec<u8>)> {
        let payload = self.write_payload()?;
        let metadata = self.write_metadata(payload.len() as u64)?;
        Ok((metadata, payload))
    }

    /// Concatenate export bodies in table order, then the trailer
    fn write_payload(&mut self) -> Result<Vec<u8>> {
        let trailer = self
            .payload_trailer
            .as_ref()
            .ok_or(AssetError::PayloadNotLoaded)?;

        let mut out = Vec::new();
        for export in &mut self.exports {
            let len = export
                .payload
                .as_ref()
                .ok_or(AssetError::PayloadNotLoaded)?
                .len();
            export.size = len as u64;
            export.write_payload(&mut out)?;
        }
        out.extend_from_slice(trailer);

        debug!("Payload laid out: {} bytes", out.len());
        Ok(out)
    }

    /// Lay out the metadata file into a buffer, then patch the header and the
    /// export records once the final size is known.
    ///
    /// Header and export offsets are only committed once every value fits.
    fn write_metadata(&mut self, payload_len: u64) -> Result<Vec<u8>> {
        let extended = self.options.version.has_extended_records();
        let mut header = self.header.clone();
        let mut cursor = Cursor::new(Vec::new());

        // placeholder, patched at the end
        write_null_bytes(&mut cursor, header.encoded_len())?;

        header.name_offset = position_u32(&mut cursor, "name_offset")?;
        header.name_count = to_u32(self.names.len() as u64, "name_count")?;
        header.name_count_repeat = header.name_count;
        self.names.write_to(&mut cursor)?;

        header.import_offset = position_u32(&mut cursor, "import_offset")?;
        header.import_count = to_u32(self.imports.len() as u64, "import_count")?;
        for import in &self.imports {
            import.write_to(&mut cursor, extended)?;
        }

        // first pass: payload offsets are still stale
        header.export_offset = position_u32(&mut cursor, "export_offset")?;
        header.export_count = to_u32(self.exports.len() as u64, "export_count")?;
        for export in &self.exports {
            export.write_to(&mut cursor, extended)?;
        }
        header.end_to_export = position_u32(&mut cursor, "end_to_export")?;

        write_null_bytes(
            &mut cursor,
            (u64::from(header.padding_count) + 1) * NULL_WORD_SIZE,
        )?;
        header.padding_offset = to_u32(cursor.position() - NULL_WORD_SIZE, "padding_offset")?;

        header.file_data_offset = position_u32(&mut cursor, "file_data_offset")?;
        header.file_data_count = to_u32(self.file_data.len() as u64, "file_data_count")?;
        let raw: Vec<i32> = self.file_data.iter().map(|entry| entry.to_raw()).collect();
        write_i32_array(&mut cursor, &raw)?;

        header.uasset_size = position_u32(&mut cursor, "uasset_size")?;
        header.file_length = to_u32(
            u64::from(header.uasset_size) + payload_len - NULL_WORD_SIZE,
            "file_length",
        )?;

        let mut offsets = Vec::with_capacity(self.exports.len());
        let mut running = u64::from(header.uasset_size);
        for export in &self.exports {
            offsets.push(to_u32(running, "export offset")?);
            running += export.size;
        }

        cursor.seek(SeekFrom::Start(0))?;
        header.write_to(&mut cursor)?;

        // second pass: final payload offsets
        cursor.seek(SeekFrom::Start(u64::from(header.export_offset)))?;
        for (export, offset) in self.exports.iter_mut().zip(offsets) {
            export.update(export.size, offset);
            export.write_to(&mut cursor, extended)?;
        }

        debug!(
            "Metadata laid out: {} bytes, exports @ {}, file data @ {}",
            header.uasset_size, header.export_offset, header.file_data_offset
        );
        self.header = header;

        Ok(cursor.into_inner())
    }
}
