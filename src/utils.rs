//! Parameter coercion helpers shared by the request builders

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const KIB: i64 = 1024;

/// A memory amount given either as a byte count or a string like `"128m"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ByteSize {
    Bytes(i64),
    Text(String),
}

impl ByteSize {
    pub fn to_bytes(&self) -> Result<i64> {
        match self {
            ByteSize::Bytes(n) => Ok(*n),
            ByteSize::Text(s) => parse_bytes(s),
        }
    }
}

impl From<i64> for ByteSize {
    fn from(n: i64) -> Self {
        ByteSize::Bytes(n)
    }
}

impl From<&str> for ByteSize {
    fn from(s: &str) -> Self {
        ByteSize::Text(s.to_string())
    }
}

impl From<String> for ByteSize {
    fn from(s: String) -> Self {
        ByteSize::Text(s)
    }
}

/// Parse `"1g"`, `"128m"`, `"4k"`, `"100000b"`, `"1gb"` or a bare integer
pub fn parse_bytes(s: &str) -> Result<i64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0);
    }

    let chars: Vec<char> = s.chars().collect();
    let mut end = chars.len();
    // "1gb" / "10MB": drop the trailing b when preceded by another unit letter
    if end >= 2 && chars[end - 1].is_ascii_alphabetic() && chars[end - 2].is_ascii_alphabetic() {
        if chars[end - 1].eq_ignore_ascii_case(&'b') {
            end -= 1;
        }
    }

    let last = chars[end - 1];
    let (digits, multiplier) = if last.is_ascii_digit() {
        (&chars[..end], 1)
    } else {
        let multiplier = match last.to_ascii_lowercase() {
            'b' => 1,
            'k' => KIB,
            'm' => KIB * KIB,
            'g' => KIB * KIB * KIB,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "the specified value for memory ({}) should specify the units; \
                     the postfix should be one of the `b` `k` `m` `g` characters",
                    s
                )))
            }
        };
        (&chars[..end - 1], multiplier)
    };

    let digits: String = digits.iter().collect();
    let value: i64 = digits.parse().map_err(|_| {
        Error::InvalidArgument(format!(
            "failed converting the string value for memory ({}) to an integer",
            digits
        ))
    })?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| Error::InvalidArgument(format!("memory value out of range: {}", s)))
}

/// Point in time accepted by `since`/`until` style parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Unix(i64),
    DateTime(DateTime<Utc>),
}

impl Timestamp {
    pub fn as_unix(&self) -> i64 {
        match self {
            Timestamp::Unix(t) => *t,
            Timestamp::DateTime(dt) => dt.timestamp(),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(t: i64) -> Self {
        Timestamp::Unix(t)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::DateTime(dt)
    }
}

/// Split `name[:tag]` or `name@digest`, leaving registry ports intact
pub fn parse_repository_tag(name: &str) -> (String, Option<String>) {
    if let Some((repo, digest)) = name.rsplit_once('@') {
        return (repo.to_string(), Some(digest.to_string()));
    }
    match name.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => (repo.to_string(), Some(tag.to_string())),
        _ => (name.to_string(), None),
    }
}

/// Split a shell-style command line into argv
pub fn split_command(command: &str) -> Result<Vec<String>> {
    shlex::split(command)
        .ok_or_else(|| Error::InvalidArgument(format!("unbalanced quotes in command: {}", command)))
}

/// URL-safe base64 JSON, as used by `X-Registry-Auth`
pub fn encode_json_header(value: &serde_json::Value) -> Result<String> {
    Ok(URL_SAFE.encode(serde_json::to_vec(value)?))
}

/// Decode a base64 JSON header such as `X-Docker-Container-Path-Stat`
pub fn decode_json_header(header: &str) -> Result<serde_json::Value> {
    let raw = STANDARD
        .decode(header.trim())
        .or_else(|_| URL_SAFE.decode(header.trim()))
        .map_err(|e| Error::InvalidArgument(format!("invalid base64 header: {}", e)))?;
    Ok(serde_json::from_slice(&raw)?)
}
