//! Rule factories.
//!
//! This module contains both synchronous and asynchronous rule factories.

mod async_rules;
mod sync_rules;

pub use async_rules::*;
pub use sync_rules::*;
