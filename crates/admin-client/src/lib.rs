//! HTTP transport for the admin console.
//!
//! [`HttpTransport`] implements [`admin_core::Transport`] on top of
//! `reqwest`. Request paths published by the backend are resolved against the
//! configured base URL, so `./admin.json` and `/admin/user/` both work.
//!
//! ```no_run
//! use admin_client::{ClientConfig, HttpTransport};
//! use admin_core::{Console, ConsoleOptions};
//!
//! async fn open() -> admin_core::Result<()> {
//!     let transport = HttpTransport::new(&ClientConfig::new("http://localhost:8080/admin/"))?;
//!     let mut console = Console::new(transport, ConsoleOptions::default());
//!     console.load().await?;
//!     console.switch_object("User").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::HttpTransport;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use error::{ClientError, Result};
