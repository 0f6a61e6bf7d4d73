// src/bookmarks/parser.rs
// =============================================================================
// Decodes a Chromium-family "Bookmarks" file into a BookmarkNode tree.
//
// The file is JSON shaped roughly like this:
//
//   {
//     "checksum": "...",
//     "roots": {
//       "bookmark_bar": { "type": "folder", "name": "Bookmarks bar", "children": [...] },
//       "other":        { "type": "folder", "name": "Other bookmarks", "children": [...] },
//       "synced":       { "type": "folder", "name": "Mobile bookmarks", "children": [...] }
//     },
//     "version": 1
//   }
//
// Every node carries a "type" of "folder" or "url". Browsers add new fields
// (guid, meta_info, date_last_used, ...) over time, so anything we don't know
// about is ignored instead of rejected.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::BookmarkNode;

/// The store format version this tool was written against
pub const SUPPORTED_VERSION: u64 = 1;

/// Microseconds between 1601-01-01 (WebKit epoch) and 1970-01-01 (Unix epoch)
const WEBKIT_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

/// Everything that can go wrong while reading the bookmark store
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read bookmark file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bookmark file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bookmark file has no \"roots\" object")]
    MissingRoots,

    #[error("invalid bookmark node under root \"{root}\": {source}")]
    InvalidNode {
        root: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A decoded bookmark store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkStore {
    pub version: Option<u64>,
    pub checksum: Option<String>,
    /// Synthetic, unnamed folder holding the store's root folders
    pub root: BookmarkNode,
}

// Top-level document. Only the fields we use are listed; serde skips the rest.
#[derive(Deserialize)]
struct RawStore {
    #[serde(default)]
    checksum: Option<String>,
    #[serde(default)]
    roots: Option<Map<String, Value>>,
    #[serde(default)]
    version: Option<u64>,
}

// One node as it appears on disk. `type` picks the variant; unknown types
// land in `Other` and are dropped during conversion.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawNode {
    Folder {
        #[serde(default)]
        name: String,
        children: Vec<RawNode>,
    },
    Url {
        #[serde(default)]
        name: String,
        #[serde(default)]
        url: String,
        #[serde(default)]
        date_added: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// Reads and decodes the bookmark store at `path`
pub fn read_bookmarks(path: &Path) -> Result<BookmarkStore, ParseError> {
    let bytes = fs::read(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bookmarks(&bytes)
}

/// Decodes the raw bytes of a bookmark store
///
/// Fails on invalid UTF-8/JSON, a missing `roots` object, or nodes that lack
/// required fields (`type`, or `children` on a folder).
pub fn parse_bookmarks(bytes: &[u8]) -> Result<BookmarkStore, ParseError> {
    let raw: RawStore = serde_json::from_slice(bytes)?;
    let roots = raw.roots.ok_or(ParseError::MissingRoots)?;

    match raw.version {
        Some(SUPPORTED_VERSION) => {}
        Some(other) => log::warn!(
            "bookmark file version is {}, this tool was written for version {}; continuing anyway",
            other,
            SUPPORTED_VERSION
        ),
        None => log::warn!("bookmark file has no version field; continuing anyway"),
    }

    let mut top_level = Vec::with_capacity(roots.len());
    for (key, value) in roots {
        // Older stores keep bookkeeping strings next to the root folders
        if !value.is_object() {
            log::debug!("skipping non-folder root entry \"{}\"", key);
            continue;
        }

        let node = RawNode::deserialize(value)
            .map_err(|source| ParseError::InvalidNode { root: key.clone(), source })?;

        match convert(node) {
            Some(BookmarkNode::Folder { name, children }) if name.is_empty() => {
                top_level.push(BookmarkNode::Folder { name: key, children });
            }
            Some(node) => top_level.push(node),
            None => log::debug!("skipping root \"{}\" of unknown type", key),
        }
    }

    Ok(BookmarkStore {
        version: raw.version,
        checksum: raw.checksum,
        root: BookmarkNode::folder("", top_level),
    })
}

// Turns the on-disk shape into our strict tree, dropping unknown node types
fn convert(node: RawNode) -> Option<BookmarkNode> {
    match node {
        RawNode::Folder { name, children } => Some(BookmarkNode::Folder {
            name,
            children: children.into_iter().filter_map(convert).collect(),
        }),
        RawNode::Url { name, url, date_added } => Some(BookmarkNode::Entry {
            name,
            url,
            date_added: date_added.as_deref().and_then(webkit_timestamp),
        }),
        RawNode::Other => None,
    }
}

/// Converts a WebKit timestamp (microseconds since 1601-01-01, as a decimal
/// string) into a UTC date. "0" and garbage both mean "unknown".
pub(crate) fn webkit_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let micros: i64 = raw.trim().parse().ok()?;
    if micros <= 0 {
        return None;
    }
    let unix_micros = micros - WEBKIT_EPOCH_OFFSET_MICROS;
    let secs = unix_micros.div_euclid(1_000_000);
    let nanos = (unix_micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos)
}
