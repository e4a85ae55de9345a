//! Property-based tests for the visibility rules and empty value removal.

use proptest::prelude::*;
use serde_json::Value;

use super::types::FileEntry;
use super::visibility::{self, fixtures::entry};
use crate::record::remove_empty_values;

/// Version chains as a well-formed store returns them: head first per key.
fn file_list() -> impl Strategy<Value = Vec<FileEntry>> {
    prop::collection::vec((1usize..4, any::<bool>()), 1..6).prop_map(|chains| {
        chains
            .into_iter()
            .enumerate()
            .flat_map(|(k, (versions, expanded))| {
                (0..versions).map(move |v| {
                    let mut file = entry(&format!("file-{k}.pdf"), &format!("v{}", versions - v), v == 0);
                    file.show_children = v == 0 && expanded;
                    file
                })
            })
            .collect()
    })
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z]{0,3}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn has_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty() || items.iter().any(has_empty),
        Value::Object(map) => map.is_empty() || map.values().any(has_empty),
        _ => false,
    }
}

proptest! {
    #[test]
    fn prop_has_children_iff_head_with_siblings(files in file_list()) {
        for file in &files {
            let siblings = files.iter().filter(|f| f.key == file.key).count();
            prop_assert_eq!(
                visibility::has_children(&files, file),
                file.is_head && siblings > 1
            );
        }
    }

    #[test]
    fn prop_show_item_follows_head(files in file_list()) {
        for file in &files {
            let shown = visibility::show_item(&files, file);
            if file.is_head {
                prop_assert!(shown);
            } else {
                let head = files.iter().find(|f| f.key == file.key && f.is_head).unwrap();
                prop_assert_eq!(shown, head.show_children);
            }
        }
    }

    #[test]
    fn prop_toggle_twice_restores(files in file_list(), index in any::<prop::sample::Index>()) {
        let key = files[index.index(files.len())].key.clone();
        let mut toggled = files.clone();

        prop_assert!(visibility::toggle_children(&mut toggled, &key));
        prop_assert!(visibility::toggle_children(&mut toggled, &key));
        prop_assert_eq!(toggled, files);
    }

    #[test]
    fn prop_cleaned_value_has_no_empty_members(value in json_value()) {
        if let Some(cleaned) = remove_empty_values(&value) {
            prop_assert!(!has_empty(&cleaned));
            prop_assert_eq!(remove_empty_values(&cleaned), Some(cleaned.clone()));
        } else {
            prop_assert!(has_empty(&value));
        }
    }
}
