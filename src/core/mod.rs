//! core
//!
//! Domain types, deferred values and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types for object ids, ref names and refs
//! - [`lazy`] - Deferred, memoized values with `map` composition
//! - [`config`] - Layered TOML configuration

pub mod config;
pub mod lazy;
pub mod types;
