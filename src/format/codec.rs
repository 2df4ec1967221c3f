use crate::error::{AssetError, Result};
use std::io::{Read, Seek, Write};

/// Longest string payload accepted by the reader, in bytes
pub const MAX_STRING_BYTES: usize = 1 << 16;

/// Size of one null padding word
pub const NULL_WORD_SIZE: u64 = 4;

pub fn read_exact<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    Ok(read_exact::<1, _>(reader)?[0])
}

pub fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    Ok(u16::from_le_bytes(read_exact(reader)?))
}

pub fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    Ok(u32::from_le_bytes(read_exact(reader)?))
}

pub fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    Ok(u64::from_le_bytes(read_exact(reader)?))
}

pub fn read_i8<R: Read>(reader: &mut R) -> Result<i8> {
    Ok(i8::from_le_bytes(read_exact(reader)?))
}

pub fn read_i16<R: Read>(reader: &mut R) -> Result<i16> {
    Ok(i16::from_le_bytes(read_exact(reader)?))
}

pub fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    Ok(i32::from_le_bytes(read_exact(reader)?))
}

pub fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    Ok(i64::from_le_bytes(read_exact(reader)?))
}

pub fn write_u8<W: Write>(writer: &mut W, value: u8) -> Result<()> {
    writer.write_all(&[value])?;
    Ok(())
}

pub fn write_u16<W: Write>(writer: &mut W, value: u16) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_i8<W: Write>(writer: &mut W, value: i8) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_i16<W: Write>(writer: &mut W, value: i16) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_i64<W: Write>(writer: &mut W, value: i64) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Read `count` signed 32-bit values.
/// Never preallocates from `count`: it comes straight from an untrusted header.
pub fn read_i32_array<R: Read>(reader: &mut R, count: u32) -> Result<Vec<i32>> {
    let mut values = Vec::new();
    for _ in 0..count {
        values.push(read_i32(reader)?);
    }
    Ok(values)
}

pub fn write_i32_array<W: Write>(writer: &mut W, values: &[i32]) -> Result<()> {
    for value in values {
        write_i32(writer, *value)?;
    }
    Ok(())
}

/// Consume `count` bytes that must all be zero
pub fn read_null_bytes<R: Read + Seek>(
    reader: &mut R,
    count: u64,
    field: &'static str,
) -> Result<()> {
    let mut remaining = count;
    let mut chunk = [0u8; 64];
    while remaining > 0 {
        let take = remaining.min(chunk.len() as u64) as usize;
        let start = reader.stream_position()?;
        reader.read_exact(&mut chunk[..take])?;
        if let Some(pos) = chunk[..take].iter().position(|b| *b != 0) {
            return Err(AssetError::Consistency {
                field,
                expected: 0,
                actual: chunk[pos] as i64,
                position: start + pos as u64,
            });
        }
        remaining -= take as u64;
    }
    Ok(())
}

/// Emit `count` zero bytes
pub fn write_null_bytes<W: Write>(writer: &mut W, count: u64) -> Result<()> {
    std::io::copy(&mut std::io::repeat(0).take(count), writer)?;
    Ok(())
}

/// Fail unless the live stream position equals the offset the header declared
pub fn check_offset<S: Seek>(stream: &mut S, field: &'static str, expected: u64) -> Result<()> {
    let actual = stream.stream_position()?;
    if actual != expected {
        return Err(AssetError::Consistency {
            field,
            expected: expected as i64,
            actual: actual as i64,
            position: actual,
        });
    }
    Ok(())
}

/// Fail unless a decoded value equals its required constant
pub fn check_value(field: &'static str, expected: i64, actual: i64, position: u64) -> Result<()> {
    if expected != actual {
        return Err(AssetError::Consistency {
            field,
            expected,
            actual,
            position,
        });
    }
    Ok(())
}

/// Current stream position narrowed to a 32-bit header field
pub fn position_u32<S: Seek>(stream: &mut S, field: &'static str) -> Result<u32> {
    let position = stream.stream_position()?;
    to_u32(position, field)
}

pub fn to_u32(value: u64, field: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| AssetError::FieldOverflow { field, value })
}

/// Character width of a length-prefixed string on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    /// Positive length, one byte per character (Latin-1)
    Narrow,
    /// Negative length, two bytes per character (UTF-16LE)
    Wide,
}

/// Length-prefixed, null-terminated string that remembers its on-disk encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FString {
    text: String,
    encoding: StringEncoding,
    /// Stored as a bare zero length, without a terminator
    bare: bool,
}

impl FString {
    /// Create a string, choosing the narrow encoding when the text is pure ASCII
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let encoding = if text.is_ascii() {
            StringEncoding::Narrow
        } else {
            StringEncoding::Wide
        };
        Self {
            text,
            encoding,
            bare: false,
        }
    }

    pub fn with_encoding(text: impl Into<String>, encoding: StringEncoding) -> Self {
        Self {
            text: text.into(),
            encoding,
            bare: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Read a string: 4-byte signed length (terminator included), then the characters
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let position = reader.stream_position()?;
        let length = read_i32(reader)?;

        if length == 0 {
            return Ok(Self {
                text: String::new(),
                encoding: StringEncoding::Narrow,
                bare: true,
            });
        }

        let chars = length.unsigned_abs() as usize;
        let byte_len = if length > 0 { chars } else { chars * 2 };
        if byte_len > MAX_STRING_BYTES {
            return Err(AssetError::InvalidString {
                position,
                reason: format!("length {} exceeds {} bytes", length, MAX_STRING_BYTES),
            });
        }

        let mut buf = vec![0u8; byte_len];
        reader.read_exact(&mut buf)?;

        if length > 0 {
            let (body, terminator) = buf.split_at(chars - 1);
            if terminator != [0] {
                return Err(missing_terminator(position));
            }
            // Latin-1: every byte maps to the code point of the same value
            let text: String = body.iter().map(|&b| b as char).collect();
            Ok(Self::with_encoding(text, StringEncoding::Narrow))
        } else {
            let units: Vec<u16> = buf
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            let (body, terminator) = units.split_at(chars - 1);
            if terminator != [0] {
                return Err(missing_terminator(position));
            }
            let text = String::from_utf16(body).map_err(|e| AssetError::InvalidString {
                position,
                reason: format!("invalid UTF-16: {}", e),
            })?;
            Ok(Self::with_encoding(text, StringEncoding::Wide))
        }
    }

    /// Write the string in its recorded encoding, returning bytes written
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        if self.bare && self.text.is_empty() {
            write_i32(writer, 0)?;
            return Ok(4);
        }

        match self.encoding {
            StringEncoding::Narrow => {
                let mut bytes = Vec::with_capacity(self.text.len() + 1);
                for c in self.text.chars() {
                    let code = u32::from(c);
                    if code > 0xFF {
                        return Err(AssetError::InvalidString {
                            position: 0,
                            reason: format!("{:?} cannot be stored as a narrow string", self.text),
                        });
                    }
                    bytes.push(code as u8);
                }
                bytes.push(0);
                write_i32(writer, string_length(bytes.len())?)?;
                writer.write_all(&bytes)?;
                Ok(4 + bytes.len())
            }
            StringEncoding::Wide => {
                let mut units: Vec<u16> = self.text.encode_utf16().collect();
                units.push(0);
                write_i32(writer, -string_length(units.len())?)?;
                for unit in &units {
                    writer.write_all(&unit.to_le_bytes())?;
                }
                Ok(4 + units.len() * 2)
            }
        }
    }
}

fn string_length(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| AssetError::FieldOverflow {
        field: "string length",
        value: len as u64,
    })
}

fn missing_terminator(position: u64) -> AssetError {
    AssetError::InvalidString {
        position,
        reason: "missing null terminator".to_string(),
    }
}

impl std::fmt::Display for FString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
