pub mod client;
pub mod session;

pub use client::StreamClient;
pub use session::{StreamSession, StreamSettings};
