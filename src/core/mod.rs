pub mod extractor;
pub mod logging;
