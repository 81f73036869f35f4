/**
* filename : mod
* author : HAMA
* date: 2025. 8. 14.
* description: REST/WebSocket API
**/

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod websocket;

pub use error::ApiError;
pub use routes::create_api_router;
