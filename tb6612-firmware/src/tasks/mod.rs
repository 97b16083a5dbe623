//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod motor;
pub mod sequence;

pub use motor::{channel_a_task, channel_b_task, ChannelA, ChannelB};
pub use sequence::sequence_task;
