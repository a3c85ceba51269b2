//! color-mapper: nearest-color matching for LED palettes
//!
//! Hardware controllers usually light their pads and buttons with a small,
//! fixed set of colors, each selected by a numeric code. This crate maps an
//! arbitrary RGB color (for example a track color) onto the closest color of
//! such a palette and hands back the code bound to it.
//!
//! # Quick Start
//!
//! ```
//! use color_mapper::{Color, ColorMapper};
//!
//! let pads = ColorMapper::new([
//!     ("#C50A08", 1),
//!     ("#32BE44", 2),
//!     ("#0044FF", 5),
//!     ("#F2F2FF", 8),
//! ])
//! .unwrap();
//!
//! assert_eq!(pads.nearest_color(0xFF0000u32), Color::new(0xC5, 0x0A, 0x08));
//! assert_eq!(*pads.value_for_nearest_color(0xFFFFFFu32), 8);
//! ```
//!
//! # Matching
//!
//! Distance is the squared Euclidean distance between the raw 8-bit
//! channels, computed in integers. The search is a linear scan in insertion
//! order that only moves on a strictly smaller distance, so equidistant
//! entries resolve to the one supplied first. Both
//! [`ColorMapper::nearest_color`] and [`ColorMapper::value_for_nearest_color`]
//! are projections of the same [`ColorMapper::find_nearest`] scan.
//!
//! A mapper is immutable once built and holds no interior mutability, so a
//! shared reference can be queried from any number of threads.

pub mod color;
pub mod mapper;


pub use color::Color;
pub use mapper::{ColorEntry, ColorMapper, MapperError, ParseColorError};
