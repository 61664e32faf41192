use page_harvest::{extract_html, ExtractionResult};
use serde_json::Value;

use crate::news_page::{NEWS_PAGE, NEWS_URL};

#[test]
fn payload_uses_camel_case_keys() {
    let json = serde_json::to_value(extract_html(NEWS_PAGE, Some(NEWS_URL))).unwrap();

    assert_eq!(json["success"], Value::Bool(true));
    assert!(json.get("error").is_none());
    for key in [
        "totalWords",
        "totalChunks",
        "averageWordsPerChunk",
        "suitable",
        "quality",
        "ragAssessment",
        "extraction",
        "metadata",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["metadata"]["contentType"], "news");
    assert!(json["metadata"]["processingTimeMs"].is_u64());
    assert!(json["quality"]["isContentRich"].as_bool().unwrap());
    assert!(json["ragAssessment"]["qualityScore"].is_u64());
    assert_eq!(json["extraction"]["fallbackNodesUsed"], 0);
    assert_eq!(json["extraction"]["structureType"], "headings");
}

#[test]
fn chunks_serialize_with_type_and_importance() {
    let json = serde_json::to_value(extract_html(NEWS_PAGE, Some(NEWS_URL))).unwrap();
    let first = &json["chunks"][0];
    assert_eq!(first["type"], "h1");
    assert_eq!(first["importance"], "high");
    assert!(first["wordCount"].is_u64());
    assert!(first.get("chunkIndex").is_none());
    assert_eq!(json["chunks"][2]["type"], "p");
    assert_eq!(json["chunks"][2]["importance"], "medium");
}

#[test]
fn payload_round_trips() {
    let result = extract_html(NEWS_PAGE, Some(NEWS_URL));
    let text = serde_json::to_string(&result).unwrap();
    let back: ExtractionResult = serde_json::from_str(&text).unwrap();
    assert_eq!(back, result);
}

#[test]
fn failure_payload_is_minimal() {
    let json = serde_json::to_value(ExtractionResult::failure("Document has no body element")).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Document has no body element");
    assert_eq!(json["chunks"], Value::Array(Vec::new()));
    assert!(json.get("metadata").is_none());
    assert!(json.get("ragAssessment").is_none());
}
