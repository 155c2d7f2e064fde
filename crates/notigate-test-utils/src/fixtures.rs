// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Corpus fixtures: builders for rule and approved-template documents in the
//! shape the ingestion job writes them.

use serde_json::{Map, Value};

use notigate_core::types::StoredDocument;

/// Build a rule document with the given scalar metadata entries.
pub fn rule_doc(id: &str, content: &str, metadata: &[(&str, Value)]) -> StoredDocument {
    let mut map = Map::new();
    for (key, value) in metadata {
        map.insert((*key).to_string(), value.clone());
    }
    StoredDocument {
        id: id.to_string(),
        text: content.to_string(),
        metadata: map,
    }
}

/// Build an approved-template document tagged with its category pair.
pub fn approved_template_doc(
    id: &str,
    text: &str,
    category_main: &str,
    category_sub: &str,
) -> StoredDocument {
    let mut map = Map::new();
    map.insert("category_main".into(), Value::from(category_main));
    map.insert("category_sub".into(), Value::from(category_sub));
    StoredDocument {
        id: id.to_string(),
        text: text.to_string(),
        metadata: map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_doc_carries_metadata() {
        let doc = rule_doc(
            "len-1",
            "본문은 1000자 이내",
            &[("type", Value::from("constraint")), ("max_length", Value::from(1000))],
        );
        assert_eq!(doc.meta_str("type"), Some("constraint"));
        assert_eq!(doc.meta_u64("max_length"), Some(1000));
    }

    #[test]
    fn approved_doc_is_category_tagged() {
        let doc = approved_template_doc("apv-1", "주문이 완료되었습니다", "주문", "주문/예약");
        assert_eq!(doc.meta_str("category_main"), Some("주문"));
        assert_eq!(doc.meta_str("category_sub"), Some("주문/예약"));
    }
}
