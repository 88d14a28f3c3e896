pub mod client;
pub mod error;
pub mod types;

pub use client::CompletionClient;
pub use error::CompletionError;
pub use types::*;
