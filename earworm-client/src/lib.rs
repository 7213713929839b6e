//! Client-side playback for earworm.
//!
//! The state machines in this crate are free of I/O. [Player] wires them to a
//! media element, a stream source and the favorites storage, which are provided
//! by whatever front-end embeds the client.

mod favorites;
mod media;
mod playback;
mod player;
mod queue;
mod scrub;
mod source;
mod time;

#[cfg(test)]
mod fakes;

pub use favorites::*;
pub use media::*;
pub use playback::*;
pub use player::*;
pub use queue::*;
pub use scrub::*;
pub use source::*;
pub use time::*;
