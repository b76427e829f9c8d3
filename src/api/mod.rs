//! HTTP surface: the browser page and the JSON API behind it.

pub mod error;
pub mod handlers;
pub mod page;
pub mod router;
pub mod server;
