//! Turning a fetched resource into exactly one chat message.

pub mod classify;
pub mod format;
pub mod outcome;
pub mod pipeline;

pub use outcome::RelayOutcome;
pub use pipeline::LinkRelay;
