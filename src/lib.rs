//! Inspection tools for baseline JPEG/JFIF files.
//!
//! This crate has two independent halves:
//!
//! - [`analyze`] walks the marker segments of a JPEG stream and returns a [`Node`] tree in which
//!   every segment and field is annotated with the byte range it occupies. The entropy-coded scan
//!   data is located but not decoded. This is meant to drive hex-view style visualizations.
//! - The transform stages of a baseline encoder: color conversion ([`color`]), chroma subsampling
//!   ([`subsample`]), and 8×8 block DCT, quantization and zigzag ordering ([`dct`], [`tables`]),
//!   operating on the planes of a [`Context`].

pub mod color;
mod context;
pub mod dct;
mod error;
mod file;
mod node;
mod reader;
pub mod subsample;
pub mod tables;


pub use context::{Context, Rgba};
pub use error::{Error, ErrorKind};
pub use file::{analyze, Analyzer, Marker};
pub use node::{Node, Value};
