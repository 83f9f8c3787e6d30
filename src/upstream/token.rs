use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

pub const TOKEN_PATH: &str = "/open-apis/auth/v3/app_access_token/internal";

#[derive(Serialize)]
struct TokenRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
}

#[derive(Deserialize, Debug, Default)]
pub struct TokenResponse {
    pub code: Option<i64>,
    pub msg: Option<String>,
    pub app_access_token: Option<String>,
}

impl TokenResponse {
    pub fn into_token(self) -> Result<String, ProxyError> {
        if let Some(code) = self.code.filter(|code| *code != 0) {
            return Err(ProxyError::TokenExchange(
                format!("code {}: {}", code, self.msg.unwrap_or_default())));
        }

        match self.app_access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ProxyError::TokenExchange("response has no app_access_token".to_string())),
        }
    }
}

pub(crate) async fn request_token(client: &reqwest::Client, base_url: &str,
                                  app_id: &str, app_secret: &str) -> Result<String, ProxyError> {
    let url = format!("{}{}", base_url, TOKEN_PATH);
    let response = client.post(&url)
        .json(&TokenRequest { app_id, app_secret })
        .send()
        .await
        .map_err(|e| ProxyError::TokenExchange(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProxyError::TokenExchange(format!("HTTP {}: {}", status, body)));
    }

    let token_response: TokenResponse = response.json()
        .await
        .map_err(|e| ProxyError::TokenExchange(format!("invalid response: {}", e)))?;
    token_response.into_token()
}
