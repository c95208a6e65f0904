//! Validated domain types.

mod quote;
mod symbol;
mod timestamp;

pub use quote::{Quote, QuoteOrigin};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
