//! Identity correlation and event filtering for the hookline relay.
//!
//! This crate holds the directory of linked GitLab/Slack identities and the
//! rules that turn a webhook event into a notification decision. It is free
//! of HTTP dependencies; transport and API clients plug in through the traits
//! in [`ports`].

pub mod decision;
pub mod directory;
pub mod error;
pub mod event;
pub mod identity;
pub mod ports;
pub mod recipients;

pub use error::{Error, Result};
