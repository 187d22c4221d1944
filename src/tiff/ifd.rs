//! Image File Directory (IFD) structures and methods
//!
//! An IFD holds the tag entries describing one image in a TIFF file. The
//! raster layer only ever consumes the first IFD of a tile, but the reader
//! keeps the whole chain so overviews can be skipped explicitly.

use std::collections::HashMap;
use std::fmt;
use log::trace;

use crate::tiff::constants::{field_types, planar_config, tags};

/// Represents an Image File Directory (IFD) in a TIFF file
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD, in file order
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached entries for lookup by tag
    tag_map: HashMap<u16, IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// Small values live directly in the entry's value field. `inline_bytes`
/// keeps that field exactly as stored in the file so multi-value inline
/// arrays (two SHORTs, four BYTEs, ...) can be decoded in file byte order.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values, decoded as an integer in file byte order
    pub value_offset: u64,
    /// Raw bytes of the value field (4 bytes used for classic TIFF, 8 for BigTIFF)
    pub inline_bytes: [u8; 8],
}

impl IFDEntry {
    /// Creates a new IFD entry
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64, inline_bytes: [u8; 8]) -> Self {
        trace!("IFD entry: tag={}, type={}, count={}, value/offset={}",
               tag, field_type, count, value_offset);

        Self {
            tag,
            field_type,
            count,
            value_offset,
            inline_bytes,
        }
    }

    /// Get the size in bytes for this entry's field type
    pub fn get_field_type_size(&self) -> usize {
        field_type_size(self.field_type)
    }

    /// Total size in bytes of the entry's values, `None` on overflow
    pub fn value_byte_len(&self) -> Option<u64> {
        (self.get_field_type_size() as u64).checked_mul(self.count)
    }

    /// Determines if the value is stored inline in the entry
    /// rather than at the offset location
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        matches!(self.value_byte_len(), Some(total_size) if total_size <= inline_size)
    }
}

/// Size in bytes of a single value of the given field type
pub fn field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,
    }
}

impl IFD {
    /// Creates a new, empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD and updates the tag lookup cache
    pub fn add_entry(&mut self, entry: IFDEntry) {
        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets a tag value (value_offset) directly
    ///
    /// Only meaningful for single-valued integer tags stored inline.
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Gets the dimensions (width, height) of the image described by this IFD
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Returns number of samples per pixel (default 1 if not specified)
    ///
    /// For the tile stacks handled here this is the total band count,
    /// i.e. periods × bands per period.
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Whether the image is tiled rather than stripped
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_LENGTH)
    }

    /// Whether samples are stored band-sequentially
    pub fn is_planar(&self) -> bool {
        self.get_tag_value(tags::PLANAR_CONFIGURATION)
            .map(|v| v == planar_config::PLANAR as u64)
            .unwrap_or(false)
    }

    /// Whether this IFD is a reduced-resolution overview
    pub fn is_overview(&self) -> bool {
        self.get_tag_value(tags::NEW_SUBFILE_TYPE)
            .map(|v| v & 1 == 1)
            .unwrap_or(false)
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IFD #{} (offset {}, {} entries", self.number, self.offset, self.entries.len())?;
        if let Some((width, height)) = self.get_dimensions() {
            write!(f, ", {}x{}", width, height)?;
        }
        write!(f, ", {} samples/pixel)", self.get_samples_per_pixel())
    }
}
