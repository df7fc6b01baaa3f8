//! An embeddable [Modbus](http://modbus.org/) TCP server using
//! [Tokio](https://docs.rs/tokio) and Rust's `async/await` syntax.
//!
//! # Features
//!
//! * Panic-free parsing
//! * Pluggable register/coil data store shared by all connections
//! * Bounded connection admission and graceful shutdown
//! * Custom function code handlers and an unhandled-request observer
//!
//! # Supported Functions
//!
//! * Read Coils
//! * Read Discrete Inputs
//! * Read Holding Registers
//! * Read Input Registers
//! * Write Single Coil
//! * Write Single Register
//! * Write Multiple Coils
//! * Write Multiple Registers
//!
//! # Example Server
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mbserver::{InMemoryStore, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryStore::new());
//!
//!     let mut server = Server::new(
//!         store,
//!         ServerConfig {
//!             address: "127.0.0.1:502".to_string(),
//!             max_connections: 10,
//!         },
//!     );
//!
//!     server.set_holding_registers(vec![0; 100])?;
//!     server.start().await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     server.stop().await;
//!     Ok(())
//! }
//! ```

#![deny(
    non_camel_case_types,
    non_snake_case,
    non_shorthand_field_patterns,
    non_upper_case_globals,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    unreachable_pub
)]
#![forbid(unsafe_code, while_true, bare_trait_objects)]

/// byte-level MBAP helpers, usable by custom function code handlers
pub mod codec;
/// environment-variable configuration for embeddings
pub mod config;
/// public constant values related to the Modbus specification
pub mod constants;
/// error types surfaced by the server
pub mod error;
/// Modbus exception codes
pub mod exception;
/// the parsed request record and frame validator
pub mod request;
/// the connection server
pub mod server;
/// the data store abstraction and its in-memory implementation
pub mod store;

// internal modules
mod handler;

pub use crate::error::{Error, FrameError};
pub use crate::exception::ExceptionCode;
pub use crate::request::Request;
pub use crate::server::{Server, ServerConfig};
pub use crate::store::{InMemoryStore, Store, StoreError};
