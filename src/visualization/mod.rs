pub mod classifier;
pub mod encoder;
pub mod formatter;
pub mod markup;
pub mod normalizer;
pub mod nucleus;
pub mod tooltip;
