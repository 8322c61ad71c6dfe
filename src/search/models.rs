use serde::{Deserialize, Serialize};

/// Field patch applied to an index document. Both fields are always written
/// so re-applying a patch converges on the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentPatch {
    pub created_at: i64,
    pub deleted_at: i64,
}

impl DocumentPatch {
    /// Synthetic values for documents with no row in the source of record.
    pub const DEFAULTS: DocumentPatch = DocumentPatch {
        created_at: 0,
        deleted_at: 0,
    };
}

/// A search index document. Only the id is needed to reconcile against the
/// source of record.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDocument {
    pub id: String,
}

/// Typesense search response envelope.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    pub document: IndexDocument,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_patch_is_all_zero() {
        assert_eq!(DocumentPatch::DEFAULTS.created_at, 0);
        assert_eq!(DocumentPatch::DEFAULTS.deleted_at, 0);
    }

    #[test]
    fn search_response_parses_hits() {
        let body = r#"{"found":2,"hits":[{"document":{"id":"17","product_name":"Drill"}},{"document":{"id":"18"}}]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[0].document.id, "17");
    }

    #[test]
    fn search_response_without_hits_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"found":0}"#).unwrap();
        assert!(response.hits.is_empty());
    }
}
