//! Domain models for the thyroid report extraction engine.

mod indicator;
mod report;
mod text;
mod ultrasound;

pub use indicator::*;
pub use report::*;
pub use text::*;
pub use ultrasound::*;
