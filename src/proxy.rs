use std::env;
use std::io;
use std::sync::Arc;

use ntex::web;
use serde_json::{json, Value};
use spdlog::{error, info};

use crate::config::{Server, Upstream};
use crate::error::ProxyError;
use crate::upstream::{fetch_records, FeishuClient, TableRef, UpstreamApi};

pub const APP_ID_VAR: &str = "FEISHU_APP_ID";
pub const APP_SECRET_VAR: &str = "FEISHU_APP_SECRET";
pub const APP_TOKEN_VAR: &str = "FEISHU_APP_TOKEN";
pub const TABLE_ID_VAR: &str = "FEISHU_TABLE_ID";

pub type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

#[derive(Debug, PartialEq)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
    pub table: TableRef,
}

impl Credentials {
    /// Environment first, then the `[upstream]` section. Empty values count as missing.
    pub fn resolve(upstream: &Upstream, lookup: &dyn Fn(&str) -> Option<String>) -> Result<Credentials, ProxyError> {
        let mut missing = vec![];
        let mut get = |name: &'static str, fallback: &Option<String>| -> String {
            let value = lookup(name)
                .filter(|v| !v.is_empty())
                .or_else(|| fallback.clone().filter(|v| !v.is_empty()));
            match value {
                Some(v) => v,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let app_id = get(APP_ID_VAR, &upstream.app_id);
        let app_secret = get(APP_SECRET_VAR, &upstream.app_secret);
        let app_token = get(APP_TOKEN_VAR, &upstream.app_token);
        let table_id = get(TABLE_ID_VAR, &upstream.table_id);

        if !missing.is_empty() {
            return Err(ProxyError::MissingConfig(missing));
        }

        Ok(Credentials {
            app_id,
            app_secret,
            table: TableRef { app_token, table_id },
        })
    }
}

pub struct ProxyState<U> {
    pub upstream: Upstream,
    pub api: U,
    pub lookup: EnvLookup,
}

impl<U: UpstreamApi> ProxyState<U> {
    pub fn new(upstream: Upstream, api: U, lookup: EnvLookup) -> Self {
        ProxyState { upstream, api, lookup }
    }

    /// Token exchange followed by the table read. The first failing step ends the request.
    pub async fn load_records(&self) -> Result<Vec<Value>, ProxyError> {
        let credentials = Credentials::resolve(&self.upstream, &*self.lookup)?;
        let token = self.api.app_access_token(&credentials.app_id, &credentials.app_secret).await?;
        fetch_records(&self.api, &token, &credentials.table, self.upstream.max_pages).await
    }
}

fn json_response(mut builder: web::HttpResponseBuilder, body: &Value) -> web::HttpResponse {
    builder
        .content_type("application/json")
        .body(body.to_string())
}

pub async fn records<U: UpstreamApi + 'static>(state: web::types::State<Arc<ProxyState<U>>>) -> web::HttpResponse {
    let state: &ProxyState<U> = &state;
    match state.load_records().await {
        Ok(records) => {
            info!("Returning {} records", records.len());
            json_response(web::HttpResponse::Ok(), &Value::Array(records))
        }
        Err(e) => {
            error!("Error loading records: {}", e);
            json_response(web::HttpResponse::InternalServerError(), &json!({ "error": e.to_string() }))
        }
    }
}

pub async fn proxy_run(server: &Server, upstream: Upstream) -> io::Result<()> {
    let api = FeishuClient::new(&upstream)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Error creating HTTP client: {}", e)))?;
    let lookup: EnvLookup = Box::new(|name: &str| env::var(name).ok());
    let state = Arc::new(ProxyState::new(upstream, api, lookup));

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .service(web::resource("/").route(web::get().to(records::<FeishuClient>)))
    })
        .bind((server.address.clone(), server.port))?
        .run()
        .await
}
