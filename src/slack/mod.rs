//! All Slack-specific functionality

pub mod client;
pub mod mention;
pub mod socket;

// Re-export main types for convenience
pub use client::SlackClient;
pub use mention::{parse_bot_commands, parse_direct_mention};
pub use socket::{SocketModeConnector, SocketModeFeed};
