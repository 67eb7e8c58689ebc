// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Strip everything but ASCII word characters and whitespace from a remote URI.
///
/// ```
/// use pipe_transforming::repository::sanitize_uri;
///
/// assert_eq!(
///     sanitize_uri("https://git.example.org/data_team/scripts.git"),
///     "httpsgitexampleorgdata_teamscriptsgit"
/// );
/// ```
pub fn sanitize_uri(uri: &str) -> String {
    uri.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_ascii_whitespace())
        .collect()
}

/// Deterministic location of the working copy for `uri` at `branch`.
pub fn working_copy_path(root: &Path, uri: &str, branch: &str) -> PathBuf {
    root.join(sanitize_uri(uri)).join(branch)
}

/// Username/token pair for authenticated remotes.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub token: String,
}

impl Credentials {
    /// Credentials are only used when a token is present.
    pub fn from_parts(username: Option<&str>, token: Option<&str>) -> Option<Self> {
        token.filter(|t| !t.is_empty()).map(|token| Self {
            username: username.filter(|u| !u.is_empty()).map(str::to_string),
            token: token.to_string(),
        })
    }

    /// `uri` with the credentials embedded as userinfo.
    ///
    /// Only `http`/`https` remotes carry userinfo; any other URI (ssh, file, local
    /// path) is returned unchanged. Without a username the token alone is used.
    pub fn authenticated_uri(&self, uri: &str) -> String {
        let Some((scheme, rest)) = uri.split_once("://") else {
            return uri.to_string();
        };
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return uri.to_string();
        }

        // Replace any userinfo already present in the authority.
        let authority_end = rest.find('/').unwrap_or(rest.len());
        let host_and_path = match rest[..authority_end].rfind('@') {
            Some(at) => &rest[at + 1..],
            None => rest,
        };

        let userinfo = match &self.username {
            Some(username) => format!(
                "{}:{}",
                percent_encode(username),
                percent_encode(&self.token)
            ),
            None => percent_encode(&self.token),
        };
        format!("{}://{}@{}", scheme, userinfo, host_and_path)
    }

    /// Replace every occurrence of the secret in `text`, e.g. client error output.
    pub fn redact(&self, text: &str) -> String {
        text.replace(&percent_encode(&self.token), "<redacted>")
            .replace(&self.token, "<redacted>")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// What a resolve call did to the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Freshly cloned.
    Cloned,
    /// Existing copy pulled successfully.
    Updated,
    /// Pull failed or could not be merged; the existing tree is kept.
    Stale { reason: String },
    /// Clone failed; the path may not exist.
    Failed { reason: String },
}

impl SyncOutcome {
    pub fn is_fresh(&self) -> bool {
        matches!(self, SyncOutcome::Cloned | SyncOutcome::Updated)
    }
}

impl Display for SyncOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOutcome::Cloned => write!(f, "cloned"),
            SyncOutcome::Updated => write!(f, "updated"),
            SyncOutcome::Stale { reason } => write!(f, "stale ({})", reason),
            SyncOutcome::Failed { reason } => write!(f, "failed ({})", reason),
        }
    }
}

/// A resolved working copy and how it got into its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    pub path: PathBuf,
    pub outcome: SyncOutcome,
}

impl WorkingCopy {
    /// Path of `relative` inside the working copy.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.path.join(relative)
    }
}
