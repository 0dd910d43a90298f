//! Game mode implementations.
//!
//! One module per mode, each exporting a stateless rules struct that
//! implements [`ModeRules`](crate::rules::ModeRules) plus its per-participant
//! and per-game payload types.

pub mod around_the_world;
pub mod baseball;
pub mod beers;
pub mod cricket;
pub mod five_zero_one;
pub mod golf;
pub mod killer;
pub mod three_ff;

pub use around_the_world::AroundTheWorld;
pub use baseball::Baseball;
pub use beers::Beers;
pub use cricket::Cricket;
pub use five_zero_one::FiveZeroOne;
pub use golf::Golf;
pub use killer::Killer;
pub use three_ff::ThreeFf;
