//! Web chat gateway: chat page, JSON chat API, WebSocket turn stream and corpus listing.

mod error;
mod handlers;
pub mod render;
mod router;
mod server;
mod ws;

pub use error::GatewayError;
pub use server::GatewayServer;
