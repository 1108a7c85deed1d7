//! Resource addresses - path-like names for cached collections and records
//!
//! Format: `content://<authority>/<segment>/<segment>` or the bare path
//! `<segment>/<segment>`. Segments are percent-encoded, so a category id that
//! contains `/` stays a single segment.
//!
//! Examples:
//! - `feeds`
//! - `content://feedly.cache/entries/42`
//! - `feeds_by_category/user%2F42%2Fcategory%2Ftech`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scheme prefix of fully qualified addresses.
pub const SCHEME: &str = "content://";

/// A parsed resource address.
///
/// Segments are stored decoded; encoding happens again when the address is
/// rendered, so `parse(to_uri_string())` yields the same address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddress {
    /// Provider authority, `None` for bare paths
    authority: Option<String>,
    /// Decoded path segments, empty for the root address
    segments: Vec<String>,
}

impl ResourceAddress {
    /// Create a bare-path address from decoded segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authority: None,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Qualify this address with a provider authority
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    /// Address of the feeds filed under `category_id`
    pub fn feeds_by_category(category_id: impl Into<String>) -> Self {
        Self::new([
            crate::contract::feeds_by_category::VIEW.to_string(),
            category_id.into(),
        ])
    }

    /// Parse an address string
    pub fn parse(address: &str) -> Result<Self> {
        let (authority, path) = if let Some(rest) = address.strip_prefix(SCHEME) {
            let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
            if authority.is_empty() {
                return Err(Error::InvalidAddress(format!(
                    "missing authority in {}",
                    address
                )));
            }
            (Some(authority.to_string()), path)
        } else if address.contains("://") {
            return Err(Error::InvalidAddress(format!(
                "address must be a path or start with {}: {}",
                SCHEME, address
            )));
        } else {
            (None, address)
        };

        let path = path.trim_matches('/');
        let mut segments = Vec::new();
        if !path.is_empty() {
            for raw in path.split('/') {
                if raw.is_empty() {
                    return Err(Error::InvalidAddress(format!(
                        "empty path segment in {}",
                        address
                    )));
                }
                let decoded = urlencoding::decode(raw).map_err(|e| {
                    Error::InvalidAddress(format!("bad percent-encoding in {}: {}", raw, e))
                })?;
                segments.push(decoded.into_owned());
            }
        }

        Ok(Self { authority, segments })
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// True when the address names no path at all
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Same address with one more segment at the end
    pub fn with_appended_segment(&self, segment: impl Into<String>) -> Self {
        let mut appended = self.clone();
        appended.segments.push(segment.into());
        appended
    }

    /// Same address with a row identifier as the last segment
    pub fn with_appended_id(&self, row_id: i64) -> Self {
        self.with_appended_segment(row_id.to_string())
    }

    /// Render the address, percent-encoding each segment
    pub fn to_uri_string(&self) -> String {
        let path = self
            .segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        match &self.authority {
            Some(authority) => format!("{}{}/{}", SCHEME, authority, path),
            None => path,
        }
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri_string())
    }
}

impl FromStr for ResourceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ResourceAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_uri_string())
    }
}

impl<'de> Deserialize<'de> for ResourceAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}
