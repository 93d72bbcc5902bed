pub mod client;
pub mod config;
pub mod error;
pub mod reaper;
pub mod token;
pub mod types;

pub use client::RegistryClient;
pub use config::{Credentials, ReaperConfig, RepositoryRef};
pub use error::{ReaperError, Result};
pub use reaper::{Reaper, RunReport};
pub use token::{BearerToken, TokenProvider};
pub use types::{TagPage, TagRecord};
