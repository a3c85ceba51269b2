//! Color-to-value mapping with nearest-color lookup
//!
//! This module provides the [`ColorMapper`] type and the errors its
//! construction can produce.

mod error;
mod mapper;

pub use error::{MapperError, ParseColorError};
pub use mapper::{ColorEntry, ColorMapper};
