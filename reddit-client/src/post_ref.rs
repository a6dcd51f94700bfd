//! Normalizes the ways a caller can point at a post.
//!
//! Accepted forms:
//! - bare base36 ids, optionally with the `t3_` kind prefix (`1a2b3c4`, `t3_1a2b3c4`)
//! - discussion URLs on any reddit.com host (`www.`, `old.`, `new.`, `np.`, `m.`),
//!   with or without the `/r/<sub>` part and with or without a scheme
//! - short links (`https://redd.it/1a2b3c4`)
//!
//! Share links (`/r/<sub>/s/<token>`) only resolve through a browser redirect
//! and are rejected.

use std::fmt;
use std::str::FromStr;

use stocks_core::ValidationError;
use url::Url;

const MAX_ID_LEN: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(String);

impl PostId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid(input, "post reference is empty"));
        }

        if looks_like_url(trimmed) {
            parse_url(input, trimmed)
        } else {
            parse_bare_id(input, trimmed)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Kind-prefixed name used by the Reddit API (`t3_<id>`).
    pub fn fullname(&self) -> String {
        format!("t3_{}", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PostId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn invalid(input: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidPostReference {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

fn looks_like_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.contains("://")
        || lower.contains('/')
        || lower.starts_with("reddit.com")
        || lower.starts_with("www.")
        || lower.starts_with("redd.it")
}

fn parse_bare_id(input: &str, value: &str) -> Result<PostId, ValidationError> {
    let id = value
        .strip_prefix("t3_")
        .or_else(|| value.strip_prefix("T3_"))
        .unwrap_or(value);
    validate_id(input, id)
}

fn validate_id(input: &str, id: &str) -> Result<PostId, ValidationError> {
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return Err(invalid(input, "post id must be 1 to 13 characters"));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid(input, "post id may only contain letters and digits"));
    }
    Ok(PostId(id.to_ascii_lowercase()))
}

fn parse_url(input: &str, value: &str) -> Result<PostId, ValidationError> {
    let with_scheme = if value.contains("://") {
        value.to_string()
    } else {
        format!("https://{value}")
    };
    let url = Url::parse(&with_scheme).map_err(|_| invalid(input, "not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(input, "only http(s) URLs are supported"));
    }

    let host = url
        .host_str()
        .map(|h| h.to_ascii_lowercase())
        .ok_or_else(|| invalid(input, "URL has no host"))?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if host == "redd.it" {
        let id = segments
            .first()
            .ok_or_else(|| invalid(input, "short link has no post id"))?;
        return validate_id(input, id);
    }

    if host != "reddit.com" && !host.ends_with(".reddit.com") {
        return Err(invalid(input, "not a Reddit URL"));
    }

    if let Some(position) = segments.iter().position(|s| s.eq_ignore_ascii_case("comments")) {
        let id = segments
            .get(position + 1)
            .ok_or_else(|| invalid(input, "URL has no post id after 'comments'"))?;
        return validate_id(input, id);
    }

    if matches!(segments.as_slice(), ["r", _, "s", _]) {
        return Err(invalid(
            input,
            "share links cannot be resolved; open the link and pass the resulting /comments/ URL",
        ));
    }

    Err(invalid(input, "URL does not point to a post"))
}
