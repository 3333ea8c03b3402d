//! Embassy tasks
//!
//! The radio link is blocking, so one task runs the whole node loop. The
//! end node's page button gets its own task so presses during a receive
//! window are not lost.

pub mod button;
pub mod node;

pub use button::button_task;
pub use node::{node_task, NodeHardware};
