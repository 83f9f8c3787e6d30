use std::time::Duration;

use crate::config::Upstream;
use crate::error::ProxyError;

pub mod table;
pub mod token;

pub use table::{fetch_records, TablePage, TableRef};

/// The two upstream calls the proxy makes. Implemented by `FeishuClient`,
/// and by in-process fakes in tests.
#[allow(async_fn_in_trait)]
pub trait UpstreamApi {
    async fn app_access_token(&self, app_id: &str, app_secret: &str) -> Result<String, ProxyError>;

    async fn table_page(&self, access_token: &str, table: &TableRef, page_token: Option<&str>) -> Result<TablePage, ProxyError>;
}

pub struct FeishuClient {
    client: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl FeishuClient {
    pub fn new(upstream: &Upstream) -> reqwest::Result<FeishuClient> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = upstream.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(FeishuClient {
            client: builder.build()?,
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            page_size: upstream.page_size,
        })
    }
}

impl UpstreamApi for FeishuClient {
    async fn app_access_token(&self, app_id: &str, app_secret: &str) -> Result<String, ProxyError> {
        token::request_token(&self.client, &self.base_url, app_id, app_secret).await
    }

    async fn table_page(&self, access_token: &str, table: &TableRef, page_token: Option<&str>) -> Result<TablePage, ProxyError> {
        table::request_page(&self.client, &self.base_url, access_token, table, self.page_size, page_token).await
    }
}

#[cfg(test)]
mod tests {
    use ntex::web;
    use ntex::web::HttpRequest;
    use serde_json::{json, Value};

    use super::*;

    // Answers the token call with "<app_id>:<app_secret>" and every table page with
    // one record whose id is "<authorization header>|<query string>".
    fn feishu_mock() -> web::test::TestServer {
        web::test::server(|| {
            web::App::new()
                .service(web::resource(token::TOKEN_PATH).route(web::post().to(
                    |body: web::types::Json<Value>| async move {
                        let token = format!("{}:{}", body["app_id"].as_str().unwrap_or_default(),
                                            body["app_secret"].as_str().unwrap_or_default());
                        web::HttpResponse::Ok().json(&json!({"code": 0, "msg": "ok", "app_access_token": token}))
                    })))
                .service(web::resource("/open-apis/bitable/v1/apps/app/tables/tbl/records").route(web::get().to(
                    |req: HttpRequest| async move {
                        let auth = req.headers().get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        let query = req.query_string().to_string();
                        let more = !query.contains("page_token");
                        let mut data = json!({"items": [{"record_id": format!("{}|{}", auth, query)}], "has_more": more});
                        if more {
                            data["page_token"] = json!("p2");
                        }
                        web::HttpResponse::Ok().json(&json!({"code": 0, "data": data}))
                    })))
                .service(web::resource("/open-apis/bitable/v1/apps/app/tables/broken/records").route(web::get().to(
                    || async { web::HttpResponse::InternalServerError().body("upstream down") })))
        })
    }

    fn client(srv: &web::test::TestServer) -> FeishuClient {
        let upstream = Upstream {
            base_url: format!("http://{}/", srv.addr()),
            page_size: 2,
            timeout_secs: Some(5),
            ..Default::default()
        };
        FeishuClient::new(&upstream).unwrap()
    }

    fn table(table_id: &str) -> TableRef {
        TableRef { app_token: "app".to_string(), table_id: table_id.to_string() }
    }

    #[ntex::test]
    async fn test_token_request() {
        let srv = feishu_mock();
        let token = client(&srv).app_access_token("cli_a", "secret").await.unwrap();
        assert_eq!(token, "cli_a:secret");
    }

    #[ntex::test]
    async fn test_token_request_http_error() {
        let srv = feishu_mock();
        let upstream = Upstream {
            base_url: format!("http://{}/missing", srv.addr()),
            ..Default::default()
        };
        let err = FeishuClient::new(&upstream).unwrap()
            .app_access_token("cli_a", "secret").await.unwrap_err();
        assert!(matches!(err, ProxyError::TokenExchange(ref msg) if msg.starts_with("HTTP 404")));
    }

    #[ntex::test]
    async fn test_table_pages_over_http() {
        let srv = feishu_mock();
        let records = fetch_records(&client(&srv), "t-1", &table("tbl"), 20).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r["record_id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["Bearer t-1|page_size=2", "Bearer t-1|page_size=2&page_token=p2"]);
    }

    #[ntex::test]
    async fn test_table_http_error() {
        let srv = feishu_mock();
        let err = client(&srv).table_page("t-1", &table("broken"), None).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch table records: HTTP 500 Internal Server Error: upstream down");
    }
}
