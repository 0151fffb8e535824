//! Numeric helpers shared by the driver and the video adapters.

pub mod safe_cast;
