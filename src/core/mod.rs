//! Core components of the `yfinance-session` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`YfClient`] and its builder.
//! - The primary [`YfError`] type.
//! - Shared data models like [`PriceBar`] and [`FetchRequest`].
//! - Internal networking helpers.

/// The main client (`YfClient`), builder, and retry configuration.
pub mod client;
/// The primary error type (`YfError`) for the crate.
pub mod error;
/// Shared data models (`PriceBar`, `FetchRequest`, `Interval`).
pub mod models;

#[cfg(feature = "test-mode")]
pub(crate) mod fixtures;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::YfClient`
pub use client::{YfClient, YfClientBuilder};
pub use error::YfError;
pub use models::{FetchRequest, Interval, PriceBar};
