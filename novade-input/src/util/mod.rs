//! Small building blocks shared by the translator, the seat and the tablet multiplexer.

pub mod bounded_set;
pub mod signal;

pub use bounded_set::BoundedSet;
pub use signal::{ListenerId, Signal};
