//! Application layer: drives the kernel store and runs its effects.

pub mod session;

pub use session::{Notice, Session};
