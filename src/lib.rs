//! King Orian chat: a stateless relay in front of a chat-completion API and
//! the client side that talks to it with bounded retries.

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod routes;
pub mod services;
pub mod state;
