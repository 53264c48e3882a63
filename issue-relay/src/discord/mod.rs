//! Discord side of the relay: the forum API seam and retrying delivery.

pub mod client;
pub mod delivery;

pub use client::{CreateThread, DiscordClient, ForumApi, ThreadChannel, ThreadStarter, AUTO_ARCHIVE_MINUTES};
pub use delivery::{Deliverer, RetryPolicy, ThreadRecord};
