//! Bluesky transport for the Bluejay bot engine.
//!
//! [`BlueskyClient`] speaks XRPC to an AT Protocol PDS and implements
//! [`bluejay_interface::Transport`]. [`DryRunTransport`] wraps any transport
//! and swallows writes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod dry_run;
mod errors;
mod json_models;
mod uri;

pub use client::{BlueskyClient, BlueskyConfig, DEFAULT_SERVICE};
pub use dry_run::DryRunTransport;
pub use errors::classify_xrpc_error;
pub use uri::{BskyAppPostUrl, parse_bsky_app_url};
