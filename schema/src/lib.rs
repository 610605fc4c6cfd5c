// Pet Battle Schema - Shared type definitions
// The closed enumerations used by the battle engine, its data files and any
// host application that drives it.

pub use abilities::*;
pub use actions::*;
pub use ai::*;
pub use equipment::*;

pub mod abilities;
pub mod actions;
pub mod ai;
pub mod equipment;
