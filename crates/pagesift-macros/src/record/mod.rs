//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates the field accessor, field name constants and the declared
//! field-type schema from `#[record(...)]` field annotations.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
