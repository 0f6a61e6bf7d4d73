// src/bookmarks/mod.rs
// =============================================================================
// This module turns a browser's bookmark store into a flat list of records.
//
// Submodules:
// - parser: decodes the JSON bookmark store into a tree of folders and entries
// - flatten: walks that tree and produces one FlatRecord per bookmark
//
// The types shared by both halves (and by the checker and exporter) live here.
// =============================================================================

mod flatten;
mod parser;

use chrono::{DateTime, Utc};

use crate::checker::StatusResult;

pub use flatten::{flatten, sort_by_folder};
pub use parser::read_bookmarks;

/// Separator used when joining folder names into a display path
pub const FOLDER_SEPARATOR: &str = "/";

/// One node of the bookmark tree
///
/// Folders own their children exclusively, so the tree can't contain cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkNode {
    Folder {
        name: String,
        children: Vec<BookmarkNode>,
    },
    Entry {
        name: String,
        url: String,
        date_added: Option<DateTime<Utc>>,
    },
}

impl BookmarkNode {
    /// Builds a folder node
    pub fn folder(name: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        BookmarkNode::Folder {
            name: name.into(),
            children,
        }
    }

    /// Builds a bookmark entry with no creation date
    #[cfg(test)]
    pub fn entry(name: impl Into<String>, url: impl Into<String>) -> Self {
        BookmarkNode::Entry {
            name: name.into(),
            url: url.into(),
            date_added: None,
        }
    }

    /// Counts the bookmark entries below (and including) this node
    pub fn entry_count(&self) -> usize {
        match self {
            BookmarkNode::Folder { children, .. } => {
                children.iter().map(BookmarkNode::entry_count).sum()
            }
            BookmarkNode::Entry { .. } => 1,
        }
    }
}

/// A single bookmark after flattening
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    pub name: String,
    pub url: String,
    /// Ancestor folder names from the top level down to the direct parent
    pub folder_path: Vec<String>,
    pub date_added: Option<DateTime<Utc>>,
    /// Filled in by the status checker, None until then
    pub status: Option<StatusResult>,
}

impl FlatRecord {
    /// The folder path joined for display, e.g. "Bookmarks bar/Work"
    pub fn folder(&self) -> String {
        self.folder_path.join(FOLDER_SEPARATOR)
    }

    /// Creation date formatted for export, empty when unknown
    pub fn date_added_display(&self) -> String {
        self.date_added
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}
