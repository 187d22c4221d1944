//! Tests for the TIFF reader and block decoding

extern crate std;

use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian};
use std::io::Cursor;

use ndarray::Array3;

use crate::errors::ChipError;
use crate::io::byte_order::ByteOrder;
use crate::raster::block_reader::BlockReader;
use crate::raster::geotiff::GeoTiffRaster;
use crate::raster::transform::GeoTransform;
use crate::raster::window::Window;
use crate::tiff::builder::GeoTiffBuilder;
use crate::tiff::constants::tags;
use crate::tiff::reader::TiffReader;

use super::test_utils::{create_geotiff_buffer, create_test_bigtiff_buffer, create_test_tiff_buffer};

#[test]
fn test_read_classic_tiff_structure() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    std::assert!(!tiff.is_big_tiff);
    std::assert_eq!(tiff.byte_order, ByteOrder::LittleEndian);
    std::assert_eq!(tiff.ifd_count(), 1);
    std::assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((800, 600)));
}

#[test]
fn test_read_bigtiff_structure() {
    let mut cursor = create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    std::assert!(tiff.is_big_tiff);
    std::assert!(reader.is_big_tiff());
    std::assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((1024, 768)));
}

#[test]
fn test_invalid_byte_order_is_rejected() {
    let mut cursor = Cursor::new(vec![0x12, 0x34, 42, 0, 8, 0, 0, 0]);
    std::assert!(TiffReader::new().read(&mut cursor).is_err());
}

#[test]
fn test_unknown_version_is_rejected() {
    let mut cursor = Cursor::new(vec![0x49, 0x49, 44, 0, 8, 0, 0, 0]);
    std::assert!(TiffReader::new().read(&mut cursor).is_err());
}

fn check_geotiff_buffer(mut cursor: Cursor<Vec<u8>>, expected_order: ByteOrder) {
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    std::assert_eq!(tiff.byte_order, expected_order);
    let ifd = tiff.main_ifd().unwrap();

    // Inline SHORT pair decoded in file byte order
    let bits = reader.read_tag_values(&mut cursor, ifd, tags::BITS_PER_SAMPLE).unwrap();
    std::assert_eq!(bits, vec![8, 8]);
    std::assert_eq!(ifd.get_samples_per_pixel(), 2);

    let tiepoint = reader.read_tag_f64_values(&mut cursor, ifd, tags::MODEL_TIEPOINT_TAG).unwrap();
    std::assert_eq!(tiepoint, vec![0.0, 0.0, 0.0, 100.0, 200.0, 0.0]);

    let blocks = BlockReader::from_ifd(&mut cursor, &reader, ifd, tiff.byte_order).unwrap();
    let data = blocks.read_window(&mut cursor, &Window::square(0, 0, 2)).unwrap();
    std::assert_eq!(data.dim(), (2, 2, 2));
    std::assert_eq!(data[[0, 0, 0]], 1.0);
    std::assert_eq!(data[[0, 1, 1]], 4.0);
    std::assert_eq!(data[[1, 0, 1]], 20.0);
    std::assert_eq!(data[[1, 1, 0]], 30.0);
}

#[test]
fn test_read_little_endian_geotiff() {
    check_geotiff_buffer(create_geotiff_buffer::<LittleEndian>(*b"II"), ByteOrder::LittleEndian);
}

#[test]
fn test_read_big_endian_geotiff() {
    check_geotiff_buffer(create_geotiff_buffer::<BigEndian>(*b"MM"), ByteOrder::BigEndian);
}

#[test]
fn test_window_past_edge_reads_zero() {
    let mut cursor = create_geotiff_buffer::<LittleEndian>(*b"II");
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();
    let blocks = BlockReader::from_ifd(&mut cursor, &reader, ifd, tiff.byte_order).unwrap();

    let data = blocks.read_window(&mut cursor, &Window::square(1, -1, 2)).unwrap();
    std::assert_eq!(data[[0, 0, 0]], 0.0);
    std::assert_eq!(data[[0, 0, 1]], 0.0);
    std::assert_eq!(data[[0, 1, 0]], 2.0);
    std::assert_eq!(data[[0, 1, 1]], 0.0);
}

#[test]
fn test_truncated_strip_is_an_error() {
    let cursor = create_geotiff_buffer::<LittleEndian>(*b"II");
    let mut bytes = cursor.into_inner();
    bytes.truncate(140);
    let mut cursor = Cursor::new(bytes);

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();
    let blocks = BlockReader::from_ifd(&mut cursor, &reader, ifd, tiff.byte_order).unwrap();

    std::assert!(blocks.read_window(&mut cursor, &Window::square(0, 0, 2)).is_err());
}

#[test]
fn test_oversized_offsets_table_is_an_error() {
    let cursor = create_geotiff_buffer::<LittleEndian>(*b"II");
    let mut bytes = cursor.into_inner();
    // StripOffsets is the fifth entry; its count field sits 4 bytes in
    let count_at = 8 + 2 + 4 * 12 + 4;
    bytes[count_at..count_at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
    let mut cursor = Cursor::new(bytes);

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();
    std::assert_eq!(ifd.get_entry(tags::STRIP_OFFSETS).unwrap().count, u32::MAX as u64);

    std::assert!(reader.read_tag_values(&mut cursor, ifd, tags::STRIP_OFFSETS).is_err());
    std::assert!(BlockReader::from_ifd(&mut cursor, &reader, ifd, tiff.byte_order).is_err());
}

#[test]
fn test_bigtiff_offsets_count_overflow_fails_to_open() {
    let data = Array3::from_elem((1, 4, 4), 1.0);
    let mut bytes = GeoTiffBuilder::new(data, GeoTransform::north_up(0.0, 4.0, 1.0, 1.0))
        .big_tiff(true)
        .to_bytes()
        .unwrap();

    let ifd_offset = LittleEndian::read_u64(&bytes[8..16]) as usize;
    let entry_count = LittleEndian::read_u64(&bytes[ifd_offset..ifd_offset + 8]) as usize;
    let entry_at = (0..entry_count)
        .map(|i| ifd_offset + 8 + i * 20)
        .find(|&at| LittleEndian::read_u16(&bytes[at..at + 2]) == tags::STRIP_OFFSETS)
        .unwrap();
    bytes[entry_at + 4..entry_at + 12].copy_from_slice(&(1u64 << 62).to_le_bytes());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.tif");
    std::fs::write(&path, bytes).unwrap();

    std::assert!(std::matches!(GeoTiffRaster::open(&path), Err(ChipError::Tiff { .. })));
}
