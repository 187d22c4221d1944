use std::io::Cursor;
use byteorder::{ByteOrder as Endian, LittleEndian, WriteBytesExt};

use crate::tiff::constants::{field_types, tags};

/// Creates a test buffer with TIFF header and a dimensions-only IFD
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    // Sample IFD (at offset 8)
    buffer.write_u16::<LittleEndian>(2).unwrap();      // Entry count (2 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(800).unwrap();    // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(600).unwrap();    // Value (height)

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u32::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Creates a test buffer with BigTIFF header and a dimensions-only IFD
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // BigTIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(43).unwrap();     // BigTIFF version
    buffer.write_u16::<LittleEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Reserved
    buffer.write_u64::<LittleEndian>(16).unwrap();     // IFD offset

    // Sample IFD (at offset 16)
    buffer.write_u64::<LittleEndian>(2).unwrap();      // Entry count (2 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(1024).unwrap();   // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(768).unwrap();    // Value (height)

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u64::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

fn write_short_entry<E: Endian>(buffer: &mut Vec<u8>, tag: u16, values: &[u16]) {
    buffer.write_u16::<E>(tag).unwrap();
    buffer.write_u16::<E>(field_types::SHORT).unwrap();
    buffer.write_u32::<E>(values.len() as u32).unwrap();
    for value in values {
        buffer.write_u16::<E>(*value).unwrap();
    }
    for _ in values.len()..2 {
        buffer.write_u16::<E>(0).unwrap();
    }
}

fn write_long_entry<E: Endian>(buffer: &mut Vec<u8>, tag: u16, value: u32) {
    buffer.write_u16::<E>(tag).unwrap();
    buffer.write_u16::<E>(field_types::LONG).unwrap();
    buffer.write_u32::<E>(1).unwrap();
    buffer.write_u32::<E>(value).unwrap();
}

fn write_double_entry<E: Endian>(buffer: &mut Vec<u8>, tag: u16, count: u32, offset: u32) {
    buffer.write_u16::<E>(tag).unwrap();
    buffer.write_u16::<E>(field_types::DOUBLE).unwrap();
    buffer.write_u32::<E>(count).unwrap();
    buffer.write_u32::<E>(offset).unwrap();
}

/// Creates a complete single-strip GeoTIFF in byte order `E`
///
/// 2 × 2 pixels, 2 interleaved 8-bit bands. Band 0 holds 1..=4 and band 1
/// holds 10, 20, 30, 40 in row-major order. The upper-left corner is at
/// (100, 200) with 10-unit pixels.
pub fn create_geotiff_buffer<E: Endian>(marker: [u8; 2]) -> Cursor<Vec<u8>> {
    const ENTRY_COUNT: u16 = 10;
    const IFD_OFFSET: u32 = 8;
    const DATA_OFFSET: u32 = 136; // IFD ends at 8 + 2 + 10 * 12 + 4 = 134, word aligned
    const SCALE_OFFSET: u32 = DATA_OFFSET + 8;
    const TIEPOINT_OFFSET: u32 = SCALE_OFFSET + 24;

    let mut buffer = Vec::new();
    buffer.extend_from_slice(&marker);
    buffer.write_u16::<E>(42).unwrap();
    buffer.write_u32::<E>(IFD_OFFSET).unwrap();

    buffer.write_u16::<E>(ENTRY_COUNT).unwrap();
    write_long_entry::<E>(&mut buffer, tags::IMAGE_WIDTH, 2);
    write_long_entry::<E>(&mut buffer, tags::IMAGE_LENGTH, 2);
    write_short_entry::<E>(&mut buffer, tags::BITS_PER_SAMPLE, &[8, 8]);
    write_short_entry::<E>(&mut buffer, tags::COMPRESSION, &[1]);
    write_long_entry::<E>(&mut buffer, tags::STRIP_OFFSETS, DATA_OFFSET);
    write_short_entry::<E>(&mut buffer, tags::SAMPLES_PER_PIXEL, &[2]);
    write_long_entry::<E>(&mut buffer, tags::ROWS_PER_STRIP, 2);
    write_long_entry::<E>(&mut buffer, tags::STRIP_BYTE_COUNTS, 8);
    write_double_entry::<E>(&mut buffer, tags::MODEL_PIXEL_SCALE_TAG, 3, SCALE_OFFSET);
    write_double_entry::<E>(&mut buffer, tags::MODEL_TIEPOINT_TAG, 6, TIEPOINT_OFFSET);
    buffer.write_u32::<E>(0).unwrap();

    buffer.resize(DATA_OFFSET as usize, 0);
    buffer.extend_from_slice(&[1, 10, 2, 20, 3, 30, 4, 40]);

    for value in [10.0, 10.0, 0.0] {
        buffer.write_f64::<E>(value).unwrap();
    }
    for value in [0.0, 0.0, 0.0, 100.0, 200.0, 0.0] {
        buffer.write_f64::<E>(value).unwrap();
    }

    Cursor::new(buffer)
}
