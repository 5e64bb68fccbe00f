//! Autoparty: Habitica looking-for-party auto-inviter.
//!
//! A long-running daemon that polls the Habitica v3 API for users flagged
//! "looking for party", filters them against configurable criteria plus a
//! persisted invite ledger, and invites the qualifying subset in one batch
//! call per cycle:
//!
//! fetch → filter → log → invite → persist
//!
//! Previously-invited users are skipped for a 36-hour cooldown, tracked in
//! a JSON ledger rewritten atomically after every successful batch.

pub mod api;
pub mod config;
pub mod driver;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod logs;

pub use api::ApiClient;
pub use config::AppConfig;
pub use driver::Driver;
pub use error::{InviteError, Result};
pub use ledger::Ledger;
