//! # svitlowatch-types
//!
//! Core types for the svitlowatch power watchdog. This crate defines the
//! published snapshot that downstream display collaborators consume, plus
//! the compact duration text used in outage notifications.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature as needed
//! - **Host agnostic**: Works regardless of which state store feeds the watchdog
//!
//! ## Example
//!
//! ```rust
//! use svitlowatch_types::{format_duration, WatchdogData};
//! use std::time::Duration;
//!
//! let data = WatchdogData::new(true, "sensor.kitchen_voltage")
//!     .with_reading("230.4", Some(230.4));
//!
//! assert!(data.power_on);
//! assert_eq!(format_duration(Duration::from_secs(3661)), "1г 1хв 1с");
//! ```

mod data;
mod duration;

pub use data::*;
pub use duration::*;
