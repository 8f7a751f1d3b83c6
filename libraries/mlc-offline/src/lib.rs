//! MLC Soundboard - Offline Shell
//!
//! Keeps the soundboard shell usable without a network connection.
//!
//! - **Install**: precache the shell files, all or nothing
//! - **Fetch**: cache-first, with write-through for same-origin 200s
//! - **Activate**: drop every cache but the current version's
//! - **Control**: `{"action":"skipWaiting"}` activates a waiting version
//!
//! Storage and transport are the `CacheStorage` and `Network` traits from
//! `mlc-core`. [`HttpNetwork`] is the reqwest transport and [`router`] puts
//! the worker behind an axum server.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = WorkerConfig::new(DEFAULT_CACHE_VERSION, origin.clone());
//! let network = HttpNetwork::new(origin, upstream)?;
//! let worker = Arc::new(OfflineWorker::new(config, cache, Arc::new(network)));
//!
//! worker.start().await?;
//! axum::serve(listener, router(worker)).await?;
//! ```

#![forbid(unsafe_code)]

mod config;
mod error;
mod lifecycle;
mod network;
mod server;
mod worker;

pub use config::{WorkerConfig, DEFAULT_CACHE_VERSION, DEFAULT_EXCLUDED_HOSTS, DEFAULT_PRECACHE};
pub use error::{Result, WorkerError};
pub use lifecycle::{WorkerMessage, WorkerState};
pub use network::HttpNetwork;
pub use server::{router, MessageResponse, MESSAGE_PATH};
pub use worker::OfflineWorker;
