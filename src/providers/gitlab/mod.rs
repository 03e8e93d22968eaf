mod client;
mod releases;
mod types;

pub use client::GitLabClient;
pub use types::Release;
