//! Domain models for the concept-match system.

mod outcome;
mod reference;
mod source;

pub use outcome::*;
pub use reference::*;
pub use source::*;
