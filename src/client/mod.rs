//! GitHub Gists client modules
//!
//! Request construction, transport, response decoding and the OAuth login
//! flow live in separate modules; [`GistClient`] ties them together.

pub mod api;
pub mod config;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod oauth;
pub mod request;
pub mod service;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use error::ClientError;
pub use oauth::AuthorizationPresenter;
pub use service::GistClient;
