//! calc-client - session client for the calculation BREAD API
//!
//! Registers and logs users in against a token-based auth API, keeps the
//! bearer token in durable storage, and browses, reads, adds, edits and
//! deletes calculation records, reloading the full list after every change.
//!
//! ## Modules
//!
//! - [`client`] - [`SessionClient`], the stateful front door
//! - [`api`] - typed HTTP calls, one per endpoint
//! - [`session`], [`storage`] - token state in memory and on disk
//! - [`view`], [`notice`], [`render`] - what the front end displays
//! - [`prompt`] - injectable answers for edit and delete

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod notice;
pub mod prompt;
pub mod render;
pub mod session;
pub mod storage;
pub mod view;

pub use api::ApiClient;
pub use client::SessionClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use notice::{Notice, NoticeKind};
pub use prompt::{EditFields, InputProvider, ScriptedInput};
pub use render::{CalculationCard, CardAction, ListView};
pub use session::Session;
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use view::View;

pub use calc_types::{Calculation, Operation};
pub use reqwest::StatusCode;
