pub mod cli;
pub mod predict;
pub mod source;
pub mod train;

pub use predict::{Prediction, predict};
pub use source::{Source, SourceError};
