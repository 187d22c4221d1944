//! I/O utilities for file handling
//!
//! This module provides the seekable reader abstraction and the byte order
//! strategies used by the TIFF reader and writer.

pub mod seekable;
pub mod byte_order;
