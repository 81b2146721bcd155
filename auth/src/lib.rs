//! # ChainGo Sessions
//!
//! Wallet-based authentication and stateless bearer sessions.
//!
//! ## Features
//!
//! - **Wallet login**: a registered wallet address is the credential
//! - **Signed sessions**: HMAC-SHA256 signed JWT compact tokens (`HS256`)
//! - **Live identity**: validation re-reads the user, so deleted accounts lose access immediately
//! - **Testable**: time comes from an injected [`Clock`](chaingo_core::Clock)
//!
//! ## Flow
//!
//! ```text
//! authenticate(wallet) ──▶ IdentityStore::find_by_wallet
//!                          ├─ miss ─▶ Ok(None)            (not registered)
//!                          └─ hit  ─▶ touch_login ─▶ sign ─▶ AuthenticatedSession
//!
//! validate(token) ──▶ verify signature + expiry ──▶ IdentityStore::find_by_id
//!                                                   ├─ miss ─▶ UserNotFound
//!                                                   └─ hit  ─▶ SessionIdentity
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use chaingo_auth::{SessionConfig, SessionIssuer};
//!
//! let config = SessionConfig::new(secret_from_env)?;
//! let issuer = SessionIssuer::new(identity_store, clock, &config);
//!
//! if let Some(session) = issuer.authenticate("SP2J6ZY48GV1").await? {
//!     let identity = issuer.validate(&session.token).await?;
//!     identity.ensure_acts_as("alice")?;
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod config;
pub mod session;
pub mod token;

pub use config::{SessionConfig, SessionConfigError};
pub use session::{AuthenticatedSession, SessionIdentity, SessionIssuer};
pub use token::{Claims, TokenCodec};
