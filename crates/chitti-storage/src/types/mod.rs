//! Type definitions for chitti storage.

mod batch;
mod draws;
mod groups;
mod ids;
mod payments;
mod period;

// Re-export all types from submodules
pub use batch::*;
pub use draws::*;
pub use groups::*;
pub use ids::*;
pub use payments::*;
pub use period::*;
