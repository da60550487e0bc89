//! Invoice layout and PDF serialization.
//!
//! Layout happens on an in-memory canvas of [`builder::Page`]s in top-down
//! coordinates; [`writer`] flips them into PDF space and emits the file.

pub mod builder;
pub mod fonts;
pub mod generator;
pub mod writer;

pub use generator::{InvoiceLayout, InvoiceRenderer, RowPlacement};
