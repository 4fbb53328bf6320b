//! Qdrant REST client.
//!
//! A thin client over the collection/points HTTP API. The collection is
//! keyed by name with a fixed vector dimension and cosine distance; payload
//! fields are `document_id`, `document_name`, `chunk_index`, `page_number`,
//! `content`.

use async_trait::async_trait;
use docrag_core::{
    ConfigError, IndexConfig, IndexError, IndexHit, IndexPoint, SearchParams, VectorIndex,
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one Qdrant collection.
pub struct QdrantIndex {
    client: reqwest::Client,
    base_url: String,
    collection: String,
}

impl QdrantIndex {
    pub fn new(config: &IndexConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self, dimension: usize) -> Result<(), IndexError> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(collection = %self.collection, dimension, "creating collection");
                let body = json!({
                    "vectors": {
                        "size": dimension,
                        "distance": "Cosine",
                    },
                });
                let response = self
                    .client
                    .put(self.collection_url())
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| IndexError::Unavailable(e.to_string()))?;
                expect_success(response).await.map(|_| ())
            }
            status => Err(IndexError::Response(format!(
                "collection lookup failed: {status}"
            ))),
        }
    }

    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        if points.is_empty() {
            return Ok(());
        }

        let body = json!({
            "points": points
                .iter()
                .map(|p| {
                    json!({
                        "id": p.id.to_string(),
                        "vector": p.vector,
                        "payload": p.payload,
                    })
                })
                .collect::<Vec<_>>(),
        });

        debug!(count = points.len(), collection = %self.collection, "upserting points");
        let response = self
            .client
            .put(format!("{}/points?wait=true", self.collection_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;
        expect_success(response).await.map(|_| ())
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<IndexHit>, IndexError> {
        let body = build_search_body(params);

        let response = self
            .client
            .post(format!("{}/points/search", self.collection_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;
        let text = expect_success(response).await?;

        parse_search_response(&text)
    }

    async fn delete_by_document(&self, document_id: &str) -> Result<(), IndexError> {
        let body = json!({
            "filter": {
                "must": [
                    {"key": "document_id", "match": {"value": document_id}},
                ],
            },
        });

        debug!(document_id, collection = %self.collection, "deleting points by document");
        let response = self
            .client
            .post(format!("{}/points/delete?wait=true", self.collection_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;
        expect_success(response).await.map(|_| ())
    }

    async fn count(&self) -> Result<u64, IndexError> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;
        let text = expect_success(response).await?;

        parse_points_count(&text)
    }
}

async fn expect_success(response: reqwest::Response) -> Result<String, IndexError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| IndexError::Unavailable(e.to_string()))?;
    if !status.is_success() {
        return Err(IndexError::Request(format!("{status}: {text}")));
    }
    Ok(text)
}

/// Build the search request body.
///
/// Multi-document filters become `should` clauses: a point matches when its
/// `document_id` equals any listed id (logical OR). A `must` list here would
/// require every id at once and silently break multi-document scoping.
fn build_search_body(params: &SearchParams) -> Value {
    let mut body = json!({
        "vector": params.vector,
        "limit": params.top_k,
        "score_threshold": params.score_threshold,
        "with_payload": true,
    });

    if let Some(ids) = &params.document_filter {
        let clauses: Vec<Value> = ids
            .iter()
            .map(|id| json!({"key": "document_id", "match": {"value": id}}))
            .collect();
        body["filter"] = json!({"should": clauses});
    }

    body
}

#[derive(Deserialize)]
struct SearchResponse {
    result: Vec<SearchResponseHit>,
}

#[derive(Deserialize)]
struct SearchResponseHit {
    id: Value,
    score: f32,
    payload: docrag_core::ChunkPayload,
}

fn parse_search_response(body: &str) -> Result<Vec<IndexHit>, IndexError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| IndexError::Response(e.to_string()))?;

    Ok(response
        .result
        .into_iter()
        .map(|hit| IndexHit {
            // Point ids may come back as strings or integers.
            id: match hit.id {
                Value::String(s) => s,
                other => other.to_string(),
            },
            score: hit.score,
            payload: hit.payload,
        })
        .collect())
}

#[derive(Deserialize)]
struct CollectionInfoResponse {
    result: CollectionInfo,
}

#[derive(Deserialize)]
struct CollectionInfo {
    points_count: Option<u64>,
}

fn parse_points_count(body: &str) -> Result<u64, IndexError> {
    let response: CollectionInfoResponse =
        serde_json::from_str(body).map_err(|e| IndexError::Response(e.to_string()))?;
    Ok(response.result.points_count.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_with_filter(filter: Option<Vec<String>>) -> SearchParams {
        SearchParams {
            vector: vec![0.1, 0.2],
            top_k: 5,
            score_threshold: 0.7,
            document_filter: filter,
        }
    }

    #[test]
    fn test_build_search_body_without_filter() {
        let body = build_search_body(&params_with_filter(None));

        assert_eq!(body["limit"], 5);
        assert!((body["score_threshold"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["with_payload"], true);
        assert!(body.get("filter").is_none());
    }

    #[test]
    fn test_build_search_body_filter_uses_should_clauses() {
        let body = build_search_body(&params_with_filter(Some(vec![
            "doc-a".to_string(),
            "doc-b".to_string(),
        ])));

        let clauses = body["filter"]["should"].as_array().unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0]["key"], "document_id");
        assert_eq!(clauses[0]["match"]["value"], "doc-a");
        assert_eq!(clauses[1]["match"]["value"], "doc-b");
        // OR semantics: no `must` list is emitted for the document filter.
        assert!(body["filter"].get("must").is_none());
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "result": [
                {
                    "id": "6f1c0f5e-0000-0000-0000-000000000001",
                    "score": 0.91,
                    "payload": {
                        "document_id": "doc-a",
                        "document_name": "a.txt",
                        "chunk_index": 2,
                        "page_number": null,
                        "content": "hello"
                    }
                }
            ],
            "status": "ok",
            "time": 0.001
        }"#;

        let hits = parse_search_response(body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload.document_id, "doc-a");
        assert_eq!(hits[0].payload.chunk_index, 2);
        assert!((hits[0].score - 0.91).abs() < 1e-6);
    }

    #[test]
    fn test_parse_search_response_integer_id() {
        let body = r#"{
            "result": [
                {
                    "id": 42,
                    "score": 0.5,
                    "payload": {
                        "document_id": "doc-a",
                        "document_name": "a.txt",
                        "chunk_index": 0,
                        "page_number": 3,
                        "content": "x"
                    }
                }
            ]
        }"#;

        let hits = parse_search_response(body).unwrap();
        assert_eq!(hits[0].id, "42");
        assert_eq!(hits[0].payload.page_number, Some(3));
    }

    #[test]
    fn test_parse_search_response_malformed_is_error() {
        assert!(matches!(
            parse_search_response("not json"),
            Err(IndexError::Response(_))
        ));
    }

    #[test]
    fn test_parse_points_count() {
        let body = r#"{"result": {"status": "green", "points_count": 1234}}"#;
        assert_eq!(parse_points_count(body).unwrap(), 1234);
    }

    #[test]
    fn test_parse_points_count_missing_defaults_zero() {
        let body = r#"{"result": {"status": "green"}}"#;
        assert_eq!(parse_points_count(body).unwrap(), 0);
    }
}
