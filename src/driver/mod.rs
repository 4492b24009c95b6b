//! Collaborators that drive a [`crate::simulation::SimEngine`]
//!
//! A wall-clock ticker, a snapshot broadcaster with subscriber fan-out, and
//! the command vocabulary clients use to control a run. No transport lives
//! here; a server would forward the frames and feed in the commands.

mod broadcast;
mod command;
mod loops;

pub use broadcast::{encode_snapshot, Broadcaster, Frame};
pub use command::SimCommand;
pub use loops::{spawn_broadcaster, spawn_ticker};
