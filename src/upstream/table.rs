use serde::Deserialize;
use serde_json::Value;
use spdlog::{debug, warn};

use crate::error::ProxyError;
use crate::upstream::UpstreamApi;

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub app_token: String,
    pub table_id: String,
}

impl TableRef {
    pub fn records_path(&self) -> String {
        format!("/open-apis/bitable/v1/apps/{}/tables/{}/records", self.app_token, self.table_id)
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct TablePage {
    pub records: Vec<Value>,
    pub has_more: bool,
    pub page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TableData {
    #[serde(alias = "items")]
    records: Option<Vec<Value>>,
    has_more: Option<bool>,
    page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct TableResponse {
    code: Option<i64>,
    msg: Option<String>,
    data: Option<TableData>,
}

impl TableResponse {
    pub fn into_page(self) -> Result<TablePage, ProxyError> {
        if let Some(code) = self.code.filter(|code| *code != 0) {
            return Err(ProxyError::TableFetch(
                format!("code {}: {}", code, self.msg.unwrap_or_default())));
        }

        let Some(data) = self.data else {
            return Ok(TablePage::default());
        };

        Ok(TablePage {
            records: data.records.unwrap_or_default(),
            has_more: data.has_more.unwrap_or(false),
            page_token: data.page_token.filter(|token| !token.is_empty()),
        })
    }
}

pub(crate) async fn request_page(client: &reqwest::Client, base_url: &str, access_token: &str,
                                 table: &TableRef, page_size: u32, page_token: Option<&str>) -> Result<TablePage, ProxyError> {
    let url = format!("{}{}", base_url, table.records_path());
    let page_size = page_size.to_string();
    let mut query = vec![("page_size", page_size.as_str())];
    if let Some(page_token) = page_token {
        query.push(("page_token", page_token));
    }

    let response = client.get(&url)
        .bearer_auth(access_token)
        .query(&query)
        .send()
        .await
        .map_err(|e| ProxyError::TableFetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProxyError::TableFetch(format!("HTTP {}: {}", status, body)));
    }

    let table_response: TableResponse = response.json()
        .await
        .map_err(|e| ProxyError::TableFetch(format!("invalid response: {}", e)))?;
    table_response.into_page()
}

/// Reads the table page by page, following `page_token` while upstream reports
/// `has_more`, up to `max_pages` pages.
pub async fn fetch_records<U: UpstreamApi>(api: &U, access_token: &str, table: &TableRef, max_pages: u32) -> Result<Vec<Value>, ProxyError> {
    let mut records = vec![];
    let mut page_token: Option<String> = None;

    for page_number in 1..=max_pages.max(1) {
        let page = api.table_page(access_token, table, page_token.as_deref()).await?;
        debug!("Table page {}: {} records, has_more={}", page_number, page.records.len(), page.has_more);
        records.extend(page.records);

        match page.page_token {
            Some(next) if page.has_more => page_token = Some(next),
            _ => return Ok(records),
        }
    }

    warn!("Stopped reading table {} after {} pages, more records are available", table.table_id, max_pages);
    Ok(records)
}
