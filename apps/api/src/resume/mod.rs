pub mod document;
pub mod extractor;
pub mod handlers;
