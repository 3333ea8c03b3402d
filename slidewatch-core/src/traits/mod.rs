//! Collaborator traits
//!
//! These traits define the interface between the link/node logic and
//! board-specific sensors, displays and logging.

pub mod diagnostics;
pub mod display;
pub mod sensor;

pub use diagnostics::{DiagnosticSink, LinkNote, NullSink};
pub use display::{ReadingDisplay, RelayPage};
pub use sensor::{GatewaySource, SensorSource};
