use crate::container::{
    check_asset_kind, container_paths, derive_asset_path, validate_file_data, Container,
};
use crate::error::{AssetError, Result};
use crate::format::codec::{
    check_offset, check_value, read_i32_array, read_null_bytes, NULL_WORD_SIZE,
};
use crate::format::{
    classify_exports, read_exports, read_imports, resolve_imports, Header, NameTable, PackageIndex,
};
use crate::options::ContainerOptions;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, info};

impl Container {
    /// Open a container from either file of the pair.
    ///
    /// The metadata file is parsed and validated completely before the
    /// payload file is touched; with `ignore_payload` it never is.
    pub fn open<P: AsRef<Path>>(path: P, options: ContainerOptions) -> Result<Self> {
        let (metadata_path, payload_path) = container_paths(path.as_ref())?;

        info!("Loading {}", metadata_path.display());
        let mut container = {
            let mut reader = BufReader::new(File::open(&metadata_path)?);
            Self::read_metadata(&mut reader, options)?
        };

        if !container.options.ignore_payload {
            debug!("Loading payload {}", payload_path.display());
            let mut reader = BufReader::new(File::open(&payload_path)?);
            container.read_payload(&mut reader)?;
        }

        Ok(container)
    }

    /// Parse a container held in memory.
    ///
    /// With `ignore_payload` set, `payload` is not read and may be `None`.
    /// Otherwise it is required, and a missing one is `PayloadNotLoaded`.
    pub fn from_bytes(
        metadata: &[u8],
        payload: Option<&[u8]>,
        options: ContainerOptions,
    ) -> Result<Self> {
        let mut container = Self::read_metadata(&mut Cursor::new(metadata), options)?;

        if !container.options.ignore_payload {
            let payload = payload.ok_or(AssetError::PayloadNotLoaded)?;
            container.read_payload(&mut Cursor::new(payload))?;
        }

        Ok(container)
    }

    /// Read and validate the metadata file, section by section
    fn read_metadata<R: Read + Seek>(reader: &mut R, options: ContainerOptions) -> Result<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = Header::read_from(reader)?;
        debug!(
            "Header v{} ({} bytes), unversioned: {}",
            header.version,
            header.encoded_len(),
            header.is_unversioned()
        );

        check_offset(reader, "name_offset", u64::from(header.name_offset))?;
        let names = NameTable::read_from(reader, header.name_count)?;
        debug!("Read {} names", names.len());

        let extended = options.version.has_extended_records();

        check_offset(reader, "import_offset", u64::from(header.import_offset))?;
        let mut imports = read_imports(reader, header.import_count, extended)?;
        resolve_imports(&mut imports, &names)?;
        debug!("Read {} imports", imports.len());

        let asset_path = derive_asset_path(&names, &imports)?;

        check_offset(reader, "export_offset", u64::from(header.export_offset))?;
        let mut exports = read_exports(reader, header.export_count, extended)?;
        let asset_kind = classify_exports(&mut exports, &imports, &names)?;
        check_asset_kind(asset_kind, &options.asset_kind)?;
        debug!("Read {} exports, asset kind {}", exports.len(), asset_kind);

        check_offset(reader, "end_to_export", u64::from(header.end_to_export))?;
        read_null_bytes(
            reader,
            u64::from(header.padding_count) * NULL_WORD_SIZE,
            "padding",
        )?;
        check_offset(reader, "padding_offset", u64::from(header.padding_offset))?;
        read_null_bytes(reader, NULL_WORD_SIZE, "padding terminator")?;

        check_offset(reader, "file_data_offset", u64::from(header.file_data_offset))?;
        let file_data: Vec<PackageIndex> = read_i32_array(reader, header.file_data_count)?
            .into_iter()
            .map(PackageIndex::from_raw)
            .collect();
        validate_file_data(&file_data, imports.len())?;

        check_offset(reader, "file size", file_size)?;
        check_value(
            "uasset_size",
            file_size as i64,
            i64::from(header.uasset_size),
            file_size,
        )?;

        let container = Self {
            options,
            header,
            names,
            imports,
            exports,
            file_data,
            asset_path,
            asset_kind,
            payload_trailer: None,
        };
        container.log_tables();

        Ok(container)
    }

    /// Read every export body from the payload file, in table order.
    ///
    /// Bodies must sit back to back starting at the metadata size; bytes after
    /// the last body are kept as the trailer.
    fn read_payload<R: Read + Seek>(&mut self, reader: &mut R) -> Result<()> {
        let payload_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let uasset_size = i64::from(self.header.uasset_size);
        check_value(
            "payload length",
            i64::from(self.header.file_length) + NULL_WORD_SIZE as i64 - uasset_size,
            payload_len as i64,
            payload_len,
        )?;

        let mut expected_offset = uasset_size;
        for export in &mut self.exports {
            let position = reader.stream_position()?;
            check_value(
                "export offset",
                expected_offset,
                i64::from(export.offset),
                position,
            )?;
            export.read_payload(reader)?;
            expected_offset += export.size as i64;
        }

        let mut trailer = Vec::new();
        reader.read_to_end(&mut trailer)?;
        debug!(
            "Read {} export bodies, {} trailing bytes",
            self.exports.len(),
            trailer.len()
        );
        self.payload_trailer = Some(trailer);

        Ok(())
    }
}
