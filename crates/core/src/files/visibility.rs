//! Visibility rules over a file list.

use serde_json::{Map, Value};

use super::types::FileEntry;

/// Whether `file` is displayed: heads always are, older versions only while
/// the head of their key has its children expanded.
#[must_use]
pub fn show_item(files: &[FileEntry], file: &FileEntry) -> bool {
    file.is_head
        || files
            .iter()
            .any(|f| f.is_head && f.key == file.key && f.show_children)
}

/// Whether `file` is a head with at least one older version.
#[must_use]
pub fn has_children(files: &[FileEntry], file: &FileEntry) -> bool {
    file.is_head && files.iter().filter(|f| f.key == file.key).count() > 1
}

/// Metadata shown in the information panel of `file`.
///
/// Empty when the file carries no metadata.
#[must_use]
pub fn info_fields(file: &FileEntry, excluded: &[String]) -> Map<String, Value> {
    file.metadata
        .iter()
        .flatten()
        .filter(|(name, _)| !excluded.iter().any(|e| e == *name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Flips `show_children` on the head entry of `key`. Returns `false` if no head exists.
pub(crate) fn toggle_children(files: &mut [FileEntry], key: &str) -> bool {
    match files.iter_mut().find(|f| f.is_head && f.key == key) {
        Some(head) => {
            head.show_children = !head.show_children;
            true
        }
        None => false,
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::entry;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_head_is_always_shown() {
        let files = vec![entry("a.pdf", "v2", true), entry("a.pdf", "v1", false)];
        assert!(show_item(&files, &files[0]));
        assert!(!show_item(&files, &files[1]));
    }

    #[test]
    fn test_older_version_shown_when_expanded() {
        let mut files = vec![entry("a.pdf", "v2", true), entry("a.pdf", "v1", false)];
        assert!(toggle_children(&mut files, "a.pdf"));

        assert!(files[0].show_children);
        assert!(show_item(&files, &files[1]));

        toggle_children(&mut files, "a.pdf");
        assert!(!show_item(&files, &files[1]));
    }

    #[test]
    fn test_toggle_unknown_key() {
        let mut files = vec![entry("a.pdf", "v1", true)];
        assert!(!toggle_children(&mut files, "b.pdf"));
    }

    #[test]
    fn test_has_children() {
        let files = vec![
            entry("a.pdf", "v2", true),
            entry("a.pdf", "v1", false),
            entry("b.pdf", "v1", true),
        ];
        assert!(has_children(&files, &files[0]));
        assert!(!has_children(&files, &files[1]));
        assert!(!has_children(&files, &files[2]));
    }

    #[test]
    fn test_info_fields_excludes_fields() {
        let mut file = entry("a.pdf", "v1", true);
        file.metadata = json!({ "key": "a.pdf", "label": "Cover", "order": 1 })
            .as_object()
            .cloned();

        let fields = info_fields(&file, &["key".to_string(), "order".to_string()]);

        assert_eq!(Value::Object(fields), json!({ "label": "Cover" }));
    }

    #[test]
    fn test_info_fields_without_metadata() {
        let file = entry("a.pdf", "v1", true);
        assert!(info_fields(&file, &[]).is_empty());
    }
}
