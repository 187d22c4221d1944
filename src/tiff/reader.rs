//! TIFF file reader implementation
//!
//! This module implements the TIFF/BigTIFF structure reader. It walks the
//! header and IFD chain and decodes tag values; pixel data is read by the
//! raster layer using the offsets this reader exposes.

use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{field_types, header};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::tag_utils;

/// Upper bound on the IFD chain length, guards against offset loops
const MAX_IFDS: usize = 100;

/// Largest number of tag values preallocated before decoding
const MAX_PREALLOCATED_VALUES: u64 = 1 << 16;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler, failing if no header was read yet
    fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Loads the TIFF structure of the file at `path`
    pub fn load(&mut self, path: &Path) -> TiffResult<TIFF> {
        debug!("Loading TIFF structure: {}", path.display());
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(64 * 1024, file);
        self.read(&mut reader)
    }

    /// Reads a TIFF structure from the given reader
    ///
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF or BigTIFF format
    /// 3. Read all IFDs in the chain
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        let byte_order = ByteOrder::detect(reader)?;
        debug!("Detected byte order: {}", byte_order.name());
        self.byte_order_handler = Some(byte_order.create_handler());

        self.is_big_tiff = self.detect_tiff_format(reader)?;
        let mut tiff = TIFF::new(self.is_big_tiff, byte_order);

        let first_ifd_offset = self.read_offset(reader)?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;
        if tiff.ifds.is_empty() {
            return Err(TiffError::GenericError("No IFDs found in TIFF file".to_string()));
        }

        debug!("Read {}", tiff);
        Ok(tiff)
    }

    /// Reads the version word and, for BigTIFF, validates the extra header
    fn detect_tiff_format(&self, reader: &mut dyn SeekableReader) -> TiffResult<bool> {
        let handler = self.handler()?;
        let version = handler.read_u16(reader)?;

        match version {
            header::BIG_TIFF_VERSION => {
                validation::validate_bigtiff_header(reader, handler)?;
                Ok(true)
            }
            header::TIFF_VERSION => Ok(false),
            _ => Err(TiffError::UnsupportedVersion(version)),
        }
    }

    /// Reads a file offset (4 bytes classic, 8 bytes BigTIFF)
    fn read_offset(&self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            Ok(handler.read_u64(reader)?)
        } else {
            Ok(handler.read_u32(reader)? as u64)
        }
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A broken link after the first IFD ends the chain with a warning;
    /// the main image is still usable.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64,
                      file_size: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if !ifds.is_empty() => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
                Err(e) => return Err(e),
            };
            ifds.push(ifd);

            // read_ifd leaves the reader right after the last entry
            let next_ifd_offset = match self.read_offset(reader) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    break;
                }
            };

            if next_ifd_offset != 0 && (next_ifd_offset >= file_size || next_ifd_offset < 8) {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }
            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads one IFD at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let handler = self.handler()?;
        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader)?);
        }

        debug!("Read {}", ifd);
        Ok(ifd)
    }

    /// Reads a single IFD entry, keeping the raw value field bytes
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_size = if self.is_big_tiff { 8 } else { 4 };
        let mut inline_bytes = [0u8; 8];
        reader.read_exact(&mut inline_bytes[..field_size])?;

        // Single values are left-justified in the field, so decode them at
        // their own width for big-endian files to come out right
        let mut field = Cursor::new(inline_bytes);
        let value_offset = match field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED if count == 1 => inline_bytes[0] as u64,
            field_types::SHORT | field_types::SSHORT if count == 1 => handler.read_u16(&mut field)? as u64,
            field_types::LONG | field_types::SLONG if count == 1 => handler.read_u32(&mut field)? as u64,
            _ if self.is_big_tiff => handler.read_u64(&mut field)?,
            _ => handler.read_u32(&mut field)? as u64,
        };

        Ok(IFDEntry::new(tag, field_type, count, value_offset, inline_bytes))
    }

    /// Positions `reader` at the first value of `entry`, returning a reader
    /// over the inline field when the value is stored in the entry itself
    fn with_entry_values<T>(
        &self,
        reader: &mut dyn SeekableReader,
        entry: &IFDEntry,
        decode: impl FnOnce(&mut dyn SeekableReader, &dyn ByteOrderHandler) -> TiffResult<T>,
    ) -> TiffResult<T> {
        let handler = self.handler()?;
        if entry.is_value_inline(self.is_big_tiff) {
            let mut field = Cursor::new(entry.inline_bytes);
            decode(&mut field, handler)
        } else {
            let byte_len = entry.value_byte_len().ok_or_else(|| TiffError::GenericError(format!(
                "Tag {} declares {} values, too many to address", entry.tag, entry.count)))?;
            let file_size = validation::get_file_size(reader)?;
            validation::validate_block_extent(entry.value_offset, byte_len, file_size)?;

            reader.seek(SeekFrom::Start(entry.value_offset))?;
            decode(reader, handler)
        }
    }

    /// Reads a tag's value as a vector of u64
    ///
    /// # Arguments
    /// * `reader` - The seekable reader to use
    /// * `ifd` - The IFD containing the tag
    /// * `tag` - The tag number to read
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        self.with_entry_values(reader, entry, |r, handler| {
            let mut values = Vec::with_capacity(entry.count.min(MAX_PREALLOCATED_VALUES) as usize);
            tag_utils::read_tag_value_array(r, entry, handler, &mut values)?;
            Ok(values)
        })
    }

    /// Reads a DOUBLE (or FLOAT) tag as a vector of f64
    pub fn read_tag_f64_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        self.with_entry_values(reader, entry, |r, handler| {
            let mut values = Vec::with_capacity(entry.count.min(MAX_PREALLOCATED_VALUES) as usize);
            tag_utils::read_tag_f64_array(r, entry, handler, &mut values)?;
            Ok(values)
        })
    }

    /// Reads an optional tag, returning `None` when the tag is absent
    pub fn read_optional_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD,
                                    tag: u16) -> TiffResult<Option<Vec<u64>>> {
        if ifd.has_tag(tag) {
            self.read_tag_values(reader, ifd, tag).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Returns whether the last file read is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}
