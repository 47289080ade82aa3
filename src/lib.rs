//! Docker Engine API client
//!
//! A synchronous, version-aware client for the Docker Engine remote API.
//! Every call blocks the calling thread; streaming calls return iterators
//! that block per item and release the connection when closed or dropped.
//!
//! Two layers are exposed:
//!
//! - [`ApiClient`] - one method per Engine endpoint, returning raw JSON
//!   documents, byte buffers, or streams
//! - [`DockerClient`] - resource collections (`containers()`, `images()`,
//!   ...) handing out handles such as [`Container`] and [`Image`]
//!
//! Features newer than the negotiated API version are rejected before any
//! request is sent.
//!
//! # Example
//!
//! ```no_run
//! use docker_client::{ContainerOptions, DockerClient, RunOptions};
//!
//! let client = DockerClient::from_env()?;
//!
//! let options = ContainerOptions::new("alpine").with_command("echo hello world");
//! let output = client.containers().run(&options, &RunOptions::default())?;
//! println!("{:?}", output.into_logs());
//!
//! for container in client.containers().list(&Default::default())? {
//!     println!("{} {:?}", container.short_id(), container.status());
//! }
//! # Ok::<(), docker_client::Error>(())
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod transport;
pub mod types;
pub mod utils;
pub mod version;

pub use api::ApiClient;
pub use client::DockerClient;
pub use config::{ClientConfig, Host, TlsConfig};
pub use error::{ApiError, ContainerError, Error, Result};
pub use models::*;
pub use types::*;
pub use version::ApiVersion;
