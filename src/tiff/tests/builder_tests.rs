//! Tests for the GeoTIFF builder, read back through the block reader

extern crate std;

use ndarray::Array3;
use std::io::Cursor;

use crate::io::byte_order::ByteOrder;
use crate::raster::block_reader::BlockReader;
use crate::raster::sample::{SampleKind, SampleLayout};
use crate::raster::transform::GeoTransform;
use crate::raster::window::Window;
use crate::tiff::builder::GeoTiffBuilder;
use crate::tiff::constants::{compression, tags};
use crate::tiff::reader::TiffReader;

fn sample_data(bands: usize, rows: usize, cols: usize) -> Array3<f64> {
    Array3::from_shape_fn((bands, rows, cols), |(b, r, c)| ((b * 7 + r * 3 + c) % 250) as f64)
}

fn read_back(bytes: Vec<u8>, window: &Window) -> Array3<f64> {
    let mut cursor = Cursor::new(bytes);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();
    let blocks = BlockReader::from_ifd(&mut cursor, &reader, ifd, tiff.byte_order).unwrap();
    blocks.read_window(&mut cursor, window).unwrap()
}

fn transform() -> GeoTransform {
    GeoTransform::north_up(500.0, 1000.0, 30.0, 30.0)
}

#[test]
fn test_default_layout_reads_back() {
    let data = sample_data(3, 20, 13);
    let bytes = GeoTiffBuilder::new(data.clone(), transform()).to_bytes().unwrap();

    std::assert_eq!(read_back(bytes, &Window::new(0, 0, 13, 20)), data);
}

#[test]
fn test_layouts_and_encodings_read_back() {
    let data = sample_data(4, 37, 29);
    let full = Window::new(0, 0, 29, 37);

    let builders = [
        GeoTiffBuilder::new(data.clone(), transform()).strips(5).planar(true),
        GeoTiffBuilder::new(data.clone(), transform()).tiles(16, 16),
        GeoTiffBuilder::new(data.clone(), transform()).tiles(16, 32).planar(true),
        GeoTiffBuilder::new(data.clone(), transform()).byte_order(ByteOrder::BigEndian).tiles(16, 16),
        GeoTiffBuilder::new(data.clone(), transform()).big_tiff(true).strips(7),
        GeoTiffBuilder::new(data.clone(), transform()).big_tiff(true).byte_order(ByteOrder::BigEndian).planar(true),
        GeoTiffBuilder::new(data.clone(), transform()).compression(compression::DEFLATE).predictor(true),
        GeoTiffBuilder::new(data.clone(), transform()).compression(compression::ZSTD).tiles(16, 16).predictor(true),
        GeoTiffBuilder::new(data.clone(), transform())
            .sample_layout(SampleLayout { bits: 8, kind: SampleKind::Unsigned })
            .compression(compression::DEFLATE),
    ];

    for (i, builder) in builders.iter().enumerate() {
        let bytes = builder.to_bytes().unwrap();
        std::assert_eq!(read_back(bytes, &full), data, "builder #{}", i);
    }
}

#[test]
fn test_signed_and_float_samples_read_back() {
    let data = Array3::from_shape_fn((2, 9, 9), |(b, r, c)| (r as f64 - 4.0) * 1.5 + c as f64 * 0.25 - b as f64);

    let float = GeoTiffBuilder::new(data.clone(), transform())
        .sample_layout(SampleLayout { bits: 64, kind: SampleKind::Float })
        .compression(compression::ZSTD)
        .to_bytes()
        .unwrap();
    std::assert_eq!(read_back(float, &Window::square(0, 0, 9)), data);

    let ints = data.mapv(|v| v.round());
    let signed = GeoTiffBuilder::new(ints.clone(), transform())
        .sample_layout(SampleLayout { bits: 16, kind: SampleKind::Signed })
        .predictor(true)
        .to_bytes()
        .unwrap();
    std::assert_eq!(read_back(signed, &Window::square(0, 0, 9)), ints);
}

#[test]
fn test_partial_window_matches_source_slice() {
    let data = sample_data(2, 40, 40);
    let bytes = GeoTiffBuilder::new(data.clone(), transform()).tiles(16, 16).to_bytes().unwrap();

    let out = read_back(bytes, &Window::square(14, 30, 5));
    for band in 0..2 {
        for r in 0..5 {
            for c in 0..5 {
                std::assert_eq!(out[[band, r, c]], data[[band, 30 + r, 14 + c]]);
            }
        }
    }
}

#[test]
fn test_georeference_tags_are_written() {
    let bytes = GeoTiffBuilder::new(sample_data(1, 4, 4), transform()).to_bytes().unwrap();
    let mut cursor = Cursor::new(bytes);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    let scale = reader.read_tag_f64_values(&mut cursor, ifd, tags::MODEL_PIXEL_SCALE_TAG).unwrap();
    let tiepoint = reader.read_tag_f64_values(&mut cursor, ifd, tags::MODEL_TIEPOINT_TAG).unwrap();
    std::assert_eq!(GeoTransform::from_tiepoint_and_scale(&tiepoint, &scale).unwrap(), transform());
}

#[test]
fn test_pixel_is_point_tiepoint_refers_to_pixel_center() {
    let bytes = GeoTiffBuilder::new(sample_data(1, 4, 4), transform())
        .pixel_is_point(true)
        .to_bytes()
        .unwrap();
    let mut cursor = Cursor::new(bytes);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    let keys = reader.read_tag_values(&mut cursor, ifd, tags::GEO_KEY_DIRECTORY_TAG).unwrap();
    std::assert_eq!(keys, vec![1, 1, 0, 1, 1025, 0, 1, 2]);

    let scale = reader.read_tag_f64_values(&mut cursor, ifd, tags::MODEL_PIXEL_SCALE_TAG).unwrap();
    let tiepoint = reader.read_tag_f64_values(&mut cursor, ifd, tags::MODEL_TIEPOINT_TAG).unwrap();
    let (center_x, center_y) = transform().pixel_to_world(0.5, 0.5);
    std::assert_eq!((tiepoint[3], tiepoint[4]), (center_x, center_y));

    let written = GeoTransform::from_tiepoint_and_scale(&tiepoint, &scale).unwrap();
    std::assert_eq!(written.point_to_area(), transform());
}

#[test]
fn test_float_predictor_is_rejected() {
    let result = GeoTiffBuilder::new(sample_data(1, 4, 4), transform())
        .sample_layout(SampleLayout { bits: 32, kind: SampleKind::Float })
        .predictor(true)
        .to_bytes();
    std::assert!(result.is_err());
}
