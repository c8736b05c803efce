// atmwatch-api: Async Rust client for the ATM Guard security backend

pub mod claims;
pub mod client;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use claims::TokenClaims;
pub use client::ApiClient;
pub use error::Error;
pub use session::SessionContext;
