//! # pillar-quotes
//!
//! Observable market quotes: the rate, price and spread inputs that rate
//! helpers read and curves re-solve against.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// `Quote` trait and `SimpleQuote`.
pub mod quote;

pub use quote::{Quote, SimpleQuote};
