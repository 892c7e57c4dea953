//! Exchange abstraction layer.
//!
//! Defines the trait that exchange implementations must fulfill,
//! enabling multi-exchange support with a common interface.

mod traits;

pub use traits::Exchange;
