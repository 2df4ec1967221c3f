use crate::error::{AssetError, Result};
use crate::format::codec::{read_exact, FString};
use std::io::{Read, Seek, Write};

/// Opaque 4-byte hash stored after every name; never recomputed
pub type NameHash = [u8; 4];

/// Ordered, index-addressed string table shared by every other table
///
/// Order defines the on-disk layout and is never changed by this crate.
/// `hashes` may be shorter than `names` when names were appended after
/// loading; the missing hashes are written as zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: Vec<FString>,
    hashes: Vec<NameHash>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from plain strings, with zeroed hashes
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<FString> = names.into_iter().map(FString::new).collect();
        let hashes = vec![[0u8; 4]; names.len()];
        Self { names, hashes }
    }

    /// Build a table from (name, hash) pairs
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, NameHash)>,
        S: Into<String>,
    {
        let (names, hashes): (Vec<FString>, Vec<NameHash>) = entries
            .into_iter()
            .map(|(name, hash)| (FString::new(name), hash))
            .unzip();
        Self { names, hashes }
    }

    /// Read `count` (string, hash) pairs
    pub fn read_from<R: Read + Seek>(reader: &mut R, count: u32) -> Result<Self> {
        let mut names = Vec::new();
        let mut hashes = Vec::new();
        for _ in 0..count {
            names.push(FString::read_from(reader)?);
            hashes.push(read_exact::<4, _>(reader)?);
        }
        Ok(Self { names, hashes })
    }

    /// Write every (string, hash) pair in order, zero-filling missing hashes first
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        self.pad_hashes();
        for (name, hash) in self.names.iter().zip(&self.hashes) {
            name.write_to(writer)?;
            writer.write_all(hash)?;
        }
        Ok(())
    }

    fn pad_hashes(&mut self) {
        if self.hashes.len() < self.names.len() {
            self.hashes.resize(self.names.len(), [0u8; 4]);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a name index
    pub fn get(&self, index: u64) -> Result<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.names.get(i))
            .map(FString::as_str)
            .ok_or(AssetError::InvalidReference {
                table: "name",
                index: index as i64,
                len: self.names.len(),
            })
    }

    /// Hash stored for a name, if one was loaded or assigned
    pub fn hash(&self, index: usize) -> Option<&NameHash> {
        self.hashes.get(index)
    }

    /// Position of the first entry equal to `name`
    pub fn find(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_str() == name)
    }

    /// Append a name, returning its index. Its hash is written as zeros.
    pub fn push(&mut self, name: impl Into<String>) -> usize {
        self.names.push(FString::new(name));
        self.names.len() - 1
    }

    /// Replace the text of an existing entry, keeping its index and hash
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let len = self.names.len();
        let slot = self
            .names
            .get_mut(index)
            .ok_or(AssetError::InvalidReference {
                table: "name",
                index: index as i64,
                len,
            })?;
        *slot = FString::new(name);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(FString::as_str)
    }

    pub fn entries(&self) -> &[FString] {
        &self.names
    }

    pub fn hashes(&self) -> &[NameHash] {
        &self.hashes
    }
}
