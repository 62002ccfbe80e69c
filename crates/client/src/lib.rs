//! Platform-neutral chat & location client.
//!
//! The browser and terminal frontends only translate platform callbacks into
//! [`ClientEvent`]s and implement the collaborator traits; all behaviour lives
//! in [`Session`].

pub mod chat_log;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod markers;
pub mod markup;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use chat_log::*;
pub use config::*;
pub use controller::*;
pub use error::*;
pub use event::*;
pub use markers::*;
pub use markup::*;
pub use session::*;
pub use transport::*;
