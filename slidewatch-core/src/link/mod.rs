//! Radio link
//!
//! Layers, bottom up:
//! - [`channel::CommandChannel`] writes AT lines and waits for their
//!   acknowledgement while accumulating the module's output
//! - [`receiver::ReceiveParser`] recognizes role-tagged packets in that
//!   output
//! - [`state::LinkState`] is the link's lifecycle
//! - [`driver::LinkDriver`] owns all of the above for one node

pub mod channel;
pub mod driver;
pub mod error;
pub mod receiver;
pub mod state;

pub use channel::{ChannelTiming, CommandChannel};
pub use driver::LinkDriver;
pub use error::LinkError;
pub use receiver::{ReceiveParser, Received};
pub use state::{LinkEvent, LinkState};
