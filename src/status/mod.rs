pub mod client;
pub mod poller;

pub use client::{PollError, StatusClient};
pub use poller::{StatusPoller, TransitionCallback};
