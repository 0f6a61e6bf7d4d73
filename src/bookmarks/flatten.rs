// src/bookmarks/flatten.rs
// =============================================================================
// Walks a bookmark tree and produces one FlatRecord per bookmark entry.
//
// Traversal is depth-first, pre-order, visiting children in the order the
// browser stored them. A folder that appears before an entry in its parent's
// child list has all of its bookmarks emitted before that entry.
//
// Example:
//   (root)
//   ├── Work/
//   │   └── Docs   http://example.com/docs
//   └── Home       http://example.com
//
// flattens to:
//   Docs  http://example.com/docs  "Work"
//   Home  http://example.com       ""
// =============================================================================

use super::{BookmarkNode, FlatRecord};

/// Flattens the tree below `root` into records in traversal order
///
/// `root` itself is treated as the synthetic store root: its name never
/// appears in any folder path.
pub fn flatten(root: &BookmarkNode) -> Vec<FlatRecord> {
    let mut records = Vec::with_capacity(root.entry_count());
    let mut path = Vec::new();

    match root {
        BookmarkNode::Folder { children, .. } => {
            for child in children {
                visit(child, &mut path, &mut records);
            }
        }
        // A bare entry as root has no folders above it
        entry @ BookmarkNode::Entry { .. } => visit(entry, &mut path, &mut records),
    }

    records
}

// Recursive step. `path` holds the folder names between the root and `node`;
// each folder pushes its name on the way down and pops it on the way back up,
// so siblings always see the same path.
fn visit(node: &BookmarkNode, path: &mut Vec<String>, records: &mut Vec<FlatRecord>) {
    match node {
        BookmarkNode::Folder { name, children } => {
            path.push(name.clone());
            for child in children {
                visit(child, path, records);
            }
            path.pop();
        }
        BookmarkNode::Entry {
            name,
            url,
            date_added,
        } => records.push(FlatRecord {
            name: name.clone(),
            url: url.clone(),
            folder_path: path.clone(),
            date_added: *date_added,
            status: None,
        }),
    }
}

/// Stable sort by folder path, keeping traversal order inside each folder
pub fn sort_by_folder(records: &mut [FlatRecord]) {
    records.sort_by(|a, b| a.folder_path.cmp(&b.folder_path));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(records: &[FlatRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_folder_before_entry_is_emitted_first() {
        let root = BookmarkNode::folder(
            "",
            vec![
                BookmarkNode::folder("Work", vec![BookmarkNode::entry("Docs", "http://example.com/docs")]),
                BookmarkNode::entry("Home", "http://example.com"),
            ],
        );

        let records = flatten(&root);

        assert_eq!(names(&records), vec!["Docs", "Home"]);
        assert_eq!(records[0].url, "http://example.com/docs");
        assert_eq!(records[0].folder(), "Work");
        assert_eq!(records[1].url, "http://example.com");
        assert_eq!(records[1].folder(), "");
        assert!(records.iter().all(|r| r.status.is_none() && r.date_added.is_none()));
    }

    #[test]
    fn test_entry_before_folder_keeps_child_order() {
        let root = BookmarkNode::folder(
            "",
            vec![
                BookmarkNode::entry("Home", "http://example.com"),
                BookmarkNode::folder("Work", vec![BookmarkNode::entry("Docs", "http://example.com/docs")]),
            ],
        );
        assert_eq!(names(&flatten(&root)), vec!["Home", "Docs"]);
    }

    #[test]
    fn test_nested_paths_and_empty_folders() {
        let root = BookmarkNode::folder(
            "",
            vec![BookmarkNode::folder(
                "Bookmarks bar",
                vec![
                    BookmarkNode::folder("Empty", vec![]),
                    BookmarkNode::folder(
                        "Dev",
                        vec![
                            BookmarkNode::folder("Rust", vec![BookmarkNode::entry("Book", "https://doc.rust-lang.org/book/")]),
                            BookmarkNode::entry("Crates", "https://crates.io"),
                        ],
                    ),
                    BookmarkNode::folder("Also empty", vec![BookmarkNode::folder("Deeper", vec![])]),
                    BookmarkNode::entry("Blank", ""),
                ],
            )],
        );

        let records = flatten(&root);

        assert_eq!(names(&records), vec!["Book", "Crates", "Blank"]);
        assert_eq!(records[0].folder_path, vec!["Bookmarks bar", "Dev", "Rust"]);
        assert_eq!(records[1].folder(), "Bookmarks bar/Dev");
        // Empty folders before it must not leak into the path
        assert_eq!(records[2].folder(), "Bookmarks bar");
        assert_eq!(records[2].url, "");
    }

    #[test]
    fn test_record_count_matches_entry_count() {
        let root = BookmarkNode::folder(
            "",
            (0..5)
                .map(|i| {
                    BookmarkNode::folder(
                        format!("F{}", i),
                        (0..i).map(|j| BookmarkNode::entry(format!("E{}-{}", i, j), "http://x.test")).collect(),
                    )
                })
                .collect(),
        );
        assert_eq!(flatten(&root).len(), root.entry_count());
        assert_eq!(root.entry_count(), 10);
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let root = BookmarkNode::folder(
            "",
            vec![
                BookmarkNode::folder("B", vec![BookmarkNode::entry("1", "http://1"), BookmarkNode::entry("2", "http://2")]),
                BookmarkNode::folder("A", vec![BookmarkNode::entry("3", "http://3")]),
            ],
        );
        assert_eq!(flatten(&root), flatten(&root));
    }

    #[test]
    fn test_empty_tree() {
        assert!(flatten(&BookmarkNode::folder("", vec![])).is_empty());
    }

    #[test]
    fn test_sort_by_folder_is_stable() {
        let root = BookmarkNode::folder(
            "",
            vec![
                BookmarkNode::folder("Work", vec![BookmarkNode::entry("w1", "http://w1"), BookmarkNode::entry("w2", "http://w2")]),
                BookmarkNode::entry("top", "http://top"),
                BookmarkNode::folder("Home", vec![BookmarkNode::entry("h1", "http://h1")]),
            ],
        );
        let mut records = flatten(&root);
        sort_by_folder(&mut records);
        assert_eq!(names(&records), vec!["top", "h1", "w1", "w2"]);
    }
}
