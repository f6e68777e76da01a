//! Reference ranges and abnormal-value flagging for lab indicators.

mod range;
mod status;

pub use range::*;
pub use status::*;
