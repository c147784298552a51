//! REST client for the expense-splitting backend.

mod client;
mod error;

pub use client::*;
pub use error::*;
