//! Domain types shared across the search pipeline.

mod product;
mod source;

pub use product::Product;
pub use source::SourceDescriptor;
