//! # ChainGo Marketplace
//!
//! HTTP service for a wallet-login marketplace: users register a wallet
//! address, list items with images, and buy each other's listings.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ server: Router, CORS, body limit, correlation id, /metrics   │
//! ├──────────────────────────────────────────────────────────────┤
//! │ api: JSON / multipart handlers      auth: SessionUser        │
//! ├──────────────────────────────────────────────────────────────┤
//! │ app: IdentityService  ListingService  PurchaseCoordinator    │
//! │      ListingQueryService                                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │ stores: PostgreSQL (chaingo-postgres) | memory (chaingo-testing)
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Listing lifecycle
//!
//! ```text
//! create ──▶ Active ──complete_purchase──▶ Sold (terminal)
//!              │
//!              └──delete (owner only)──▶ gone
//! ```
//!
//! Every mutation requires a bearer session whose username matches the
//! user being acted for; reads are public.

#![forbid(unsafe_code)]

pub mod api;
pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod metrics;
pub mod server;
pub mod uploads;

pub use config::{Config, ConfigError};
pub use server::{AppState, build_router};
