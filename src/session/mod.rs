//! Session layer: the engine that owns the active game, and the message
//! protocol spoken with controllers and displays.

pub mod engine;
pub mod protocol;

pub use engine::Engine;
pub use protocol::{Audience, ClientMessage, Outbound, ServerMessage, CONTROLLER_DEVICE_ACTION_ID};
