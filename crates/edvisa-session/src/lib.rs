//! # Edvisa Session
//!
//! The consumer side of the token lifecycle, as used by the admin panel.
//!
//! On start the client reads the persisted refresh token. Without one it
//! stays unauthenticated. With one it exchanges it once at the refresh
//! endpoint: success stores the rotated refresh token and holds the new
//! access token and user in memory; failure deletes the persisted token and
//! falls back to unauthenticated. There are no retries.
//!
//! ```text
//! Unauthenticated ──bootstrap/refresh──▶ Refreshing ──ok──▶ Authenticated
//!        ▲                                   │                  │
//!        └──────────────failure──────────────┘◀──────logout─────┘
//! ```
//!
//! - [`client`]: [`SessionClient`] and its [`SessionState`]
//! - [`storage`]: where the single refresh token is persisted
//! - [`transport`]: how the login and refresh endpoints are reached

pub mod client;
pub mod error;
pub mod storage;
pub mod transport;

pub use client::{Session, SessionClient, SessionState};
pub use error::SessionError;
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use transport::{AuthTransport, HttpAuthTransport};
