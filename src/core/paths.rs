//! Shared request-path manipulation utilities.

use std::path::{Path, PathBuf};

/// Normalize a slash-separated request path into a rooted, clean form.
///
/// `.` segments and empty segments are dropped, `..` pops the previous
/// segment and never climbs above the root. The result always starts with
/// `/` and never ends with one (except for the root itself).
#[must_use]
pub fn clean_request_path(name: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut out = String::with_capacity(name.len() + 1);
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}

/// Resolve a request path to a location under `root` on disk.
///
/// The request path is cleaned first, so the result can never escape `root`.
#[must_use]
pub fn resolve_under_root(root: &Path, name: &str) -> PathBuf {
    let cleaned = clean_request_path(name);
    let mut path = root.to_path_buf();
    for segment in cleaned.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

/// Join a directory request path and a child name with exactly one `/`.
#[must_use]
pub fn join_request_path(dir: &str, child: &str) -> String {
    let dir = dir.strip_suffix('/').unwrap_or(dir);
    format!("{dir}/{child}")
}

/// Decode `%XX` escapes in a URI path. Malformed escapes are kept literally;
/// a result that is not UTF-8 falls back to the raw path.
#[must_use]
pub fn percent_decode(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(byte) = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| path.to_string())
}

/// Escape a decoded path for use in a URI. Unreserved characters, `/` and
/// the sub-delimiters allowed in path segments pass through; every other
/// byte becomes `%XX`.
#[must_use]
pub fn percent_encode_path(path: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(path.len());
    for &byte in path.as_bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~/!$&'()*+,;=:@".contains(&byte) {
            out.push(char::from(byte));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(byte >> 4)]));
            out.push(char::from(HEX[usize::from(byte & 0x0f)]));
        }
    }
    out
}
