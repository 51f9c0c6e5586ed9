//! Credential models: redacted secrets, token pairs, and account payloads.

pub mod account;
pub mod token;

pub use account::*;
pub use token::{pair::*, secret::*};
