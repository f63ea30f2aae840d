// src/lib.rs

#![cfg_attr(not(test), no_std)] // Specify no_std at the crate root, tests run on the host

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

#[cfg(all(feature = "std", not(test)))]
extern crate std;

#[macro_use]
mod macros;

pub mod common;
pub mod sht31;
pub mod tsl2591;

// Re-export key types for convenience
pub use common::{BusError, BusErrorKind, Clock, RegisterBus, SensorError};
pub use sht31::Sht31;
pub use tsl2591::Tsl2591;
