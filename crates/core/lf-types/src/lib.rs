//! Core types for logfetch.
//!
//! This crate provides the foundational types used throughout the system:
//! - [`Entity`] - A monitored log source and how to scope its bucket listing
//! - [`ObjectRef`] - An object reported by a bucket listing
//! - [`DownloadedObject`] - A fetched object handed to the consumer

pub mod entity;
pub mod object;

pub use entity::*;
pub use object::*;
