//! Transaction Module
//!
//! Building unsigned transactions and broadcasting signed ones.

mod broadcaster;
mod builder;

pub use broadcaster::*;
pub use builder::*;
