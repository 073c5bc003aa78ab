//! OpenSearch document ids and response parsing.
//!
//! OpenSearch has no per-type namespace inside an index, so the document type
//! is folded into the document id and split back out of search hits.

use serde_json::Value;
use tracing::warn;

use crate::errors::BackendError;
use crate::types::BulkItemOutcome;
use search_index_shared::{SearchHit, SearchResponse};

/// Separates the document type from the caller's id in OpenSearch `_id`s.
///
/// Document types must not contain it, so the split is unambiguous.
pub const TYPE_SEPARATOR: char = '#';

/// Error type OpenSearch reports when the target index is missing.
pub(crate) const INDEX_NOT_FOUND: &str = "index_not_found_exception";

/// Error type OpenSearch reports when creating an index that exists.
pub(crate) const RESOURCE_ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// Error types OpenSearch reports for a mapping it cannot parse.
const MAPPING_PARSE_ERRORS: [&str; 2] = ["mapper_parsing_exception", "parse_exception"];

/// Generate the OpenSearch `_id` for a typed document.
///
/// Uses format: `{doc_type}#{id}`.
pub(crate) fn document_id(doc_type: &str, id: &str) -> String {
    format!("{}{}{}", doc_type, TYPE_SEPARATOR, id)
}

/// Split an OpenSearch `_id` into document type and id.
///
/// Ids written by other tools carry no type and are returned whole.
pub(crate) fn split_document_id(raw: &str) -> (Option<String>, String) {
    match raw.split_once(TYPE_SEPARATOR) {
        Some((doc_type, id)) if !doc_type.is_empty() => (Some(doc_type.to_string()), id.to_string()),
        _ => (None, raw.to_string()),
    }
}

/// Strip a top-level wrapper named after the document type.
///
/// Mapping resources are commonly written as `{"rule": {"properties": ...}}`;
/// OpenSearch expects the inner object.
pub(crate) fn unwrap_type_mapping(doc_type: &str, mapping: Value) -> Value {
    if let Value::Object(ref fields) = mapping {
        if fields.len() == 1 {
            if let Some(inner @ Value::Object(_)) = fields.get(doc_type) {
                return inner.clone();
            }
        }
    }
    mapping
}

/// The `error.type` of an OpenSearch error body, if any.
pub(crate) fn error_type(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["type"].as_str().map(str::to_string)
}

/// The `error.reason` of an OpenSearch error body, falling back to the body.
pub(crate) fn error_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value["error"]["reason"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Classify a rejected put-mapping request.
///
/// Only parse errors mean the mapping itself is invalid; other rejections,
/// such as an invalid index name, are reported as mapping errors.
pub(crate) fn mapping_failure(
    index: &str,
    doc_type: &str,
    status: u16,
    kind: Option<&str>,
    reason: String,
) -> BackendError {
    match kind {
        Some(INDEX_NOT_FOUND) => BackendError::IndexNotFound(index.to_string()),
        Some(kind) if MAPPING_PARSE_ERRORS.contains(&kind) => BackendError::mapping_parse(reason),
        _ if status == 404 => BackendError::IndexNotFound(index.to_string()),
        _ => BackendError::mapping(format!(
            "Put mapping for {}/{} failed with status {}: {}",
            index, doc_type, status, reason
        )),
    }
}

/// Whether a cluster health body reports a usable cluster.
pub(crate) fn is_healthy(body: &Value) -> bool {
    matches!(body["status"].as_str(), Some("green") | Some("yellow"))
}

/// Turn the `items` of a bulk response into per-item outcomes.
///
/// `sent` maps the offset of each item in the request to its position in the
/// caller's batch; request items and response items are aligned.
pub(crate) fn parse_bulk_items(
    body: &Value,
    sent: &[usize],
) -> Result<Vec<BulkItemOutcome>, BackendError> {
    let items = body["items"]
        .as_array()
        .ok_or_else(|| BackendError::parse("Bulk response has no items array"))?;

    if items.len() > sent.len() {
        warn!(
            sent = sent.len(),
            received = items.len(),
            "Bulk response has more items than were sent"
        );
    }

    Ok(items
        .iter()
        .zip(sent)
        .map(|(item, &position)| parse_bulk_item(item, position))
        .collect())
}

fn parse_bulk_item(item: &Value, position: usize) -> BulkItemOutcome {
    // Each item is keyed by its action: {"index": {...}}
    let result = match item.as_object().and_then(|action| action.values().next()) {
        Some(result) => result,
        None => return BulkItemOutcome::failure(position, "malformed bulk response item"),
    };

    if let Some(error) = result.get("error") {
        let reason = error["reason"]
            .as_str()
            .or_else(|| error["type"].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return BulkItemOutcome::failure(position, reason);
    }

    match result["status"].as_u64() {
        Some(status) if status >= 300 => {
            BulkItemOutcome::failure(position, format!("status {}", status))
        }
        _ => BulkItemOutcome::success(position),
    }
}

/// Parse a search response body.
pub(crate) fn parse_search_response(body: &Value) -> Result<SearchResponse, BackendError> {
    let hits = body["hits"]["hits"]
        .as_array()
        .ok_or_else(|| BackendError::parse("Search response has no hits array"))?;

    let total = body["hits"]["total"]["value"]
        .as_u64()
        .or_else(|| body["hits"]["total"].as_u64())
        .unwrap_or(hits.len() as u64);

    Ok(SearchResponse {
        total,
        took_ms: body["took"].as_u64().unwrap_or(0),
        hits: hits.iter().filter_map(parse_hit).collect(),
    })
}

/// Parse a single search hit; hits without `_index` or `_id` are skipped.
fn parse_hit(hit: &Value) -> Option<SearchHit> {
    let index = hit["_index"].as_str()?;
    let (doc_type, id) = split_document_id(hit["_id"].as_str()?);

    Some(SearchHit {
        index: index.to_string(),
        doc_type,
        id,
        score: hit["_score"].as_f64(),
        source: hit.get("_source").cloned().unwrap_or(Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id() {
        assert_eq!(document_id("rule", "squid:S1234"), "rule#squid:S1234");
    }

    #[test]
    fn test_split_document_id() {
        assert_eq!(
            split_document_id("rule#squid:S1234"),
            (Some("rule".to_string()), "squid:S1234".to_string())
        );
        assert_eq!(split_document_id("plain"), (None, "plain".to_string()));
        assert_eq!(split_document_id("#odd"), (None, "#odd".to_string()));
    }

    #[test]
    fn test_document_id_round_trip() {
        let raw = document_id("rule", "repo#key");
        assert_eq!(
            split_document_id(&raw),
            (Some("rule".to_string()), "repo#key".to_string())
        );
    }

    #[test]
    fn test_mapping_failure_classification() {
        let parse = mapping_failure(
            "rules",
            "rule",
            400,
            Some("mapper_parsing_exception"),
            "No handler for type [strnig]".to_string(),
        );
        assert_eq!(parse, BackendError::mapping_parse("No handler for type [strnig]"));

        let bad_name = mapping_failure(
            "Rules",
            "rule",
            400,
            Some("invalid_index_name_exception"),
            "must be lowercase".to_string(),
        );
        assert!(matches!(bad_name, BackendError::MappingError(_)));

        let missing = mapping_failure("rules", "rule", 404, Some(INDEX_NOT_FOUND), String::new());
        assert!(missing.is_index_not_found());

        let unavailable = mapping_failure("rules", "rule", 503, None, "Bad Gateway".to_string());
        assert!(matches!(unavailable, BackendError::MappingError(_)));
    }

    #[test]
    fn test_unwrap_type_mapping() {
        let wrapped = json!({"rule": {"properties": {"key": {"type": "keyword"}}}});
        let unwrapped = unwrap_type_mapping("rule", wrapped);
        assert_eq!(unwrapped["properties"]["key"]["type"], "keyword");

        let bare = json!({"properties": {"key": {"type": "keyword"}}});
        assert_eq!(unwrap_type_mapping("rule", bare.clone()), bare);

        // Wrapper named after another type is left alone
        let other = json!({"param": {"properties": {}}});
        assert_eq!(unwrap_type_mapping("rule", other.clone()), other);
    }

    #[test]
    fn test_error_type_and_reason() {
        let body = r#"{"error": {"type": "resource_already_exists_exception", "reason": "index [rules/abc] already exists"}, "status": 400}"#;

        assert_eq!(error_type(body).as_deref(), Some(RESOURCE_ALREADY_EXISTS));
        assert_eq!(error_reason(body), "index [rules/abc] already exists");

        assert_eq!(error_type("Bad Gateway"), None);
        assert_eq!(error_reason("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_is_healthy() {
        assert!(is_healthy(&json!({"status": "green"})));
        assert!(is_healthy(&json!({"status": "yellow"})));
        assert!(!is_healthy(&json!({"status": "red"})));
        assert!(!is_healthy(&json!({})));
    }

    #[test]
    fn test_parse_bulk_items_mixed() {
        let body = json!({
            "took": 3,
            "errors": true,
            "items": [
                { "index": { "_id": "rule#r0", "status": 201 } },
                { "index": { "_id": "rule#r1", "status": 429, "error": {
                    "type": "es_rejected_execution_exception",
                    "reason": "rejected execution"
                } } },
                { "index": { "_id": "rule#r2", "status": 200 } }
            ]
        });

        let outcomes = parse_bulk_items(&body, &[0, 1, 2]).unwrap();

        assert_eq!(
            outcomes,
            vec![
                BulkItemOutcome::success(0),
                BulkItemOutcome::failure(1, "rejected execution"),
                BulkItemOutcome::success(2),
            ]
        );
    }

    #[test]
    fn test_parse_bulk_items_maps_sent_positions() {
        // Position 1 was never sent, so the response covers positions 0 and 2
        let body = json!({
            "items": [
                { "index": { "status": 201 } },
                { "index": { "status": 500 } }
            ]
        });

        let outcomes = parse_bulk_items(&body, &[0, 2]).unwrap();

        assert_eq!(
            outcomes,
            vec![
                BulkItemOutcome::success(0),
                BulkItemOutcome::failure(2, "status 500"),
            ]
        );
    }

    #[test]
    fn test_parse_bulk_items_missing_items() {
        let result = parse_bulk_items(&json!({"errors": false}), &[0]);
        assert!(matches!(result, Err(BackendError::ParseError(_))));
    }

    #[test]
    fn test_parse_search_response() {
        let body = json!({
            "took": 4,
            "hits": {
                "total": { "value": 12, "relation": "eq" },
                "hits": [
                    {
                        "_index": "rules",
                        "_id": "rule#r1",
                        "_score": 1.5,
                        "_source": { "key": "r1" }
                    },
                    {
                        "_index": "rules",
                        "_id": "external",
                        "_score": null,
                        "_source": { "key": "x" }
                    },
                    { "_score": 0.2 }
                ]
            }
        });

        let response = parse_search_response(&body).unwrap();

        assert_eq!(response.total, 12);
        assert_eq!(response.took_ms, 4);
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[0].doc_type.as_deref(), Some("rule"));
        assert_eq!(response.hits[0].id, "r1");
        assert_eq!(response.hits[0].score, Some(1.5));
        assert_eq!(response.hits[0].source["key"], "r1");
        assert_eq!(response.hits[1].doc_type, None);
        assert_eq!(response.hits[1].score, None);
    }

    #[test]
    fn test_parse_search_response_invalid() {
        let result = parse_search_response(&json!({"took": 1}));
        assert!(matches!(result, Err(BackendError::ParseError(_))));
    }
}
