//! Byte order handling for TIFF files
//!
//! This module implements the Strategy pattern for handling different
//! byte orders (little-endian vs big-endian) when reading and writing
//! TIFF structures and raw sample data.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Result, Write};

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the TIFF header
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let byte_order = reader.read_u16::<LittleEndian>()?;
        match byte_order {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II" (Intel)
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM" (Motorola)
            _ => Err(TiffError::InvalidByteOrder(byte_order)),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// The two marker bytes that open a file in this byte order
    pub fn marker(&self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => header::LITTLE_ENDIAN_MARKER,
            ByteOrder::BigEndian => header::BIG_ENDIAN_MARKER,
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }

    /// Reads the raw bit pattern of one sample from a byte slice
    ///
    /// Samples are 1, 2, 4 or 8 bytes wide. The returned value holds the
    /// sample bits in the low end of a u64; interpretation (signed, float)
    /// is left to the caller.
    ///
    /// # Arguments
    /// * `bytes` - Slice starting at the sample, at least `width` bytes long
    /// * `width` - Sample width in bytes
    pub fn read_sample_bits(&self, bytes: &[u8], width: usize) -> u64 {
        use byteorder::ByteOrder as _;
        match (self, width) {
            (_, 1) => bytes[0] as u64,
            (ByteOrder::LittleEndian, 2) => LittleEndian::read_u16(bytes) as u64,
            (ByteOrder::LittleEndian, 4) => LittleEndian::read_u32(bytes) as u64,
            (ByteOrder::LittleEndian, _) => LittleEndian::read_u64(bytes),
            (ByteOrder::BigEndian, 2) => BigEndian::read_u16(bytes) as u64,
            (ByteOrder::BigEndian, 4) => BigEndian::read_u32(bytes) as u64,
            (ByteOrder::BigEndian, _) => BigEndian::read_u64(bytes),
        }
    }

    /// Writes the low `width` bytes of a sample bit pattern
    pub fn write_sample_bits(&self, writer: &mut dyn Write, bits: u64, width: usize) -> Result<()> {
        match (self, width) {
            (_, 1) => writer.write_u8(bits as u8),
            (ByteOrder::LittleEndian, 2) => writer.write_u16::<LittleEndian>(bits as u16),
            (ByteOrder::LittleEndian, 4) => writer.write_u32::<LittleEndian>(bits as u32),
            (ByteOrder::LittleEndian, _) => writer.write_u64::<LittleEndian>(bits),
            (ByteOrder::BigEndian, 2) => writer.write_u16::<BigEndian>(bits as u16),
            (ByteOrder::BigEndian, 4) => writer.write_u32::<BigEndian>(bits as u32),
            (ByteOrder::BigEndian, _) => writer.write_u64::<BigEndian>(bits),
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// Read a u16 value
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    /// Read a u64 value
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    /// Read an f64 value
    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64>;

    /// The byte order this handler reads
    fn byte_order(&self) -> ByteOrder;
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<LittleEndian>()
    }

    fn byte_order(&self) -> ByteOrder {
        ByteOrder::LittleEndian
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<BigEndian>()
    }

    fn byte_order(&self) -> ByteOrder {
        ByteOrder::BigEndian
    }
}
