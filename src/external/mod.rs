//! HTTP client adapter for the Chirp REST API.
//!
//! `ApiTransport` is the seam between the data layer and the network: the
//! production implementation (`HttpApi`) speaks JSON over reqwest and
//! attaches a bearer token lazily before each call; tests substitute an
//! in-memory transport.

mod api;
mod client;
mod token;

pub use api::{ApiTransport, HttpApi};
pub use token::TokenStore;
