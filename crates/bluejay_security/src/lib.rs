//! Policy decisions for the Bluejay bot engine.
//!
//! - [`FilterPolicy`] decides whether an unprompted search result may be
//!   answered at all (political/NSFW heuristics plus allow/block rules).
//! - [`ApprovalPolicy`] resolves whether a bot's replies need a human to
//!   approve them first.
//!
//! Both are pure: they take every input explicitly and touch no storage.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod approval;
mod filter;

pub use approval::{ApprovalMode, ApprovalPolicy, approval_required};
pub use filter::{
    FilterDecision, FilterPolicy, NSFW_KEYWORDS, POLITICAL_KEYWORDS, RejectReason, allow_post,
    extract_hashtags,
};
