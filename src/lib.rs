//! ledmap - nearest-color LED mapping for controller scripts
//!
//! Maps arbitrary RGB colors onto the fixed color sets of hardware LEDs.
//! This library exposes modules for integration testing.

pub mod assets;
pub mod error;
pub mod models;
pub mod services;
