//! Helpers shared by the client and the inspector.

pub mod constants;
pub mod json;
pub mod message;

pub use constants::*;
pub use json::{id_string, strip_nulls};
pub use message::*;
