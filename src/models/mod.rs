pub mod common;
pub mod document;
pub mod invoice;

pub use common::*;
pub use document::*;
pub use invoice::*;
