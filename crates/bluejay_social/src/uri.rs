//! Web URL to AT URI helpers.

use regex::Regex;
use std::sync::LazyLock;

static BSKY_APP_POST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/profile/([^/]+)/post/([^/?#]+)").expect("Valid bsky.app post regex")
});

/// The parts of a `https://bsky.app/profile/<actor>/post/<rkey>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BskyAppPostUrl {
    /// Handle or DID of the author
    pub actor: String,
    /// Record key of the post
    pub rkey: String,
}

impl BskyAppPostUrl {
    /// AT URI once the actor is known to be (or resolved to) a DID.
    pub fn at_uri(&self, did: &str) -> String {
        format!("at://{}/app.bsky.feed.post/{}", did, self.rkey)
    }

    /// Whether the actor is already a DID.
    pub fn actor_is_did(&self) -> bool {
        self.actor.starts_with("did:")
    }
}

/// Parse a bsky.app post URL. Returns `None` for anything else.
///
/// # Examples
///
/// ```
/// use bluejay_social::parse_bsky_app_url;
///
/// let url =
///     parse_bsky_app_url("https://bsky.app/profile/alice.bsky.social/post/3kabc?ref=x").unwrap();
/// assert_eq!(url.actor, "alice.bsky.social");
/// assert_eq!(url.rkey, "3kabc");
/// assert!(parse_bsky_app_url("at://did:plc:x/app.bsky.feed.post/1").is_none());
/// ```
pub fn parse_bsky_app_url(input: &str) -> Option<BskyAppPostUrl> {
    let input = input.trim();
    if !input.contains("bsky.app/profile/") {
        return None;
    }
    let caps = BSKY_APP_POST.captures(input)?;
    Some(BskyAppPostUrl {
        actor: caps.get(1)?.as_str().to_string(),
        rkey: caps.get(2)?.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_actor_converts_directly() {
        let url = parse_bsky_app_url("https://bsky.app/profile/did:plc:abc123/post/3kxyz").unwrap();
        assert!(url.actor_is_did());
        assert_eq!(url.at_uri(&url.actor), "at://did:plc:abc123/app.bsky.feed.post/3kxyz");
    }

    #[test]
    fn test_non_post_urls_rejected() {
        assert!(parse_bsky_app_url("https://bsky.app/profile/alice.bsky.social").is_none());
        assert!(parse_bsky_app_url("https://example.com/profile/a/post/b").is_none());
    }
}
