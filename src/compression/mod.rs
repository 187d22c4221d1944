//! Compression handling for TIFF data blocks
//!
//! Each supported TIFF compression scheme is a strategy behind the
//! `CompressionHandler` trait; the factory maps TIFF compression codes
//! and user-facing names to handlers.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use zstd::ZstdHandler;
