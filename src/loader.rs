use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use spdlog::{error, info, warn};

use crate::config::Fields;
use crate::error::LoadError;
use crate::record::Record;
use crate::snapshot::{LoadOutcome, Snapshot, SnapshotStore};

/// Fetches the record list from the proxy.
pub struct RecordLoader {
    client: reqwest::Client,
    proxy_url: String,
    fields: Fields,
}

impl RecordLoader {
    pub fn new(proxy_url: &str, fields: Fields, timeout_secs: Option<u64>) -> reqwest::Result<RecordLoader> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(RecordLoader {
            client: builder.build()?,
            proxy_url: proxy_url.to_string(),
            fields,
        })
    }

    pub async fn load(&self) -> Result<Snapshot, LoadError> {
        let response = self.client.get(&self.proxy_url)
            .send()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        let body = response.bytes()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;
        parse_snapshot(&body, &self.fields)
    }

    /// Loads and stores the outcome, success or failure.
    pub async fn refresh(&self, store: &SnapshotStore) -> LoadOutcome {
        let outcome = match self.load().await {
            Ok(snapshot) => {
                info!("Loaded {} records from {} at {}", snapshot.records().len(), self.proxy_url, snapshot.fetched_at());
                LoadOutcome::Loaded(Arc::new(snapshot))
            }
            Err(e) => {
                error!("Error loading records from {}: {}", self.proxy_url, e);
                LoadOutcome::Failed(e.to_string())
            }
        };
        store.store(outcome)
    }
}

pub fn parse_snapshot(body: &[u8], fields: &Fields) -> Result<Snapshot, LoadError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| LoadError::Json(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(LoadError::NotAnArray);
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items.iter() {
        match Record::from_value(item, fields) {
            Some(record) => records.push(record),
            None => warn!("Skipping record without fields or id: {}", item),
        }
    }

    Ok(Snapshot::new(records, Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot() {
        let body = r#"[
            {"record_id": "a", "fields": {"分类": "博客", "发布时间": 200}},
            {"record_id": "b"},
            {"id": "c", "fields": {"分类": "作品集"}}
        ]"#;
        let snapshot = parse_snapshot(body.as_bytes(), &Fields::default()).unwrap();
        let ids: Vec<_> = snapshot.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn test_empty_array() {
        let snapshot = parse_snapshot(b"[]", &Fields::default()).unwrap();
        assert!(snapshot.records().is_empty());
    }

    #[test]
    fn test_not_an_array() {
        let res = parse_snapshot(br#"{"error": "Missing environment variables"}"#, &Fields::default());
        assert!(matches!(res, Err(LoadError::NotAnArray)));
    }

    #[test]
    fn test_invalid_json() {
        let res = parse_snapshot(b"<html>", &Fields::default());
        assert!(matches!(res, Err(LoadError::Json(_))));
    }

    fn proxy_mock() -> ntex::web::test::TestServer {
        use ntex::web;

        web::test::server(|| {
            web::App::new()
                .service(web::resource("/ok").route(web::get().to(|| async {
                    web::HttpResponse::Ok().json(&serde_json::json!([
                        {"record_id": "a", "fields": {"分类": "博客", "标题": "Hello", "发布时间": 1700000000000i64}},
                        {"record_id": "b"}
                    ]))
                })))
                .service(web::resource("/fail").route(web::get().to(|| async {
                    web::HttpResponse::InternalServerError()
                        .json(&serde_json::json!({"error": "Failed to get access token: code 10003"}))
                })))
        })
    }

    #[ntex::test]
    async fn test_load_over_http() {
        let srv = proxy_mock();
        let loader = RecordLoader::new(&format!("http://{}/ok", srv.addr()), Fields::default(), Some(5)).unwrap();
        let snapshot = loader.load().await.unwrap();
        assert_eq!(snapshot.records().len(), 1);
        assert_eq!(snapshot.records()[0].title.as_deref(), Some("Hello"));
        assert_eq!(snapshot.records()[0].published, 1700000000000);
    }

    #[ntex::test]
    async fn test_load_error_status() {
        let srv = proxy_mock();
        let loader = RecordLoader::new(&format!("http://{}/fail", srv.addr()), Fields::default(), Some(5)).unwrap();
        let res = loader.load().await;
        assert!(matches!(res, Err(LoadError::Status(500))));

        let store = SnapshotStore::new(crate::snapshot::Expire::Never);
        let outcome = loader.refresh(&store).await;
        assert!(matches!(outcome, LoadOutcome::Failed(ref msg) if msg == "HTTP error: 500"));
    }

    #[ntex::test]
    async fn test_refresh_stores_failure() {
        // Nothing listens on the discard port
        let loader = RecordLoader::new("http://127.0.0.1:9/", Fields::default(), Some(2)).unwrap();
        let store = SnapshotStore::new(crate::snapshot::Expire::Never);
        let outcome = loader.refresh(&store).await;
        assert!(matches!(outcome, LoadOutcome::Failed(ref msg) if msg.starts_with("Network error")));
        assert!(matches!(store.get(), Some(LoadOutcome::Failed(_))));
    }
}
