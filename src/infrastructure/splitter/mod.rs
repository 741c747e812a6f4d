//! Text chunking collaborator

mod unit;

pub use unit::UnitSplitter;
