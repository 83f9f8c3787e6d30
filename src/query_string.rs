use std::collections::HashMap;

/// Query parameters of a site request.
#[derive(PartialEq, Debug, Default)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        QueryString {
            items: vs.into_iter().collect(),
        }
    }

    pub fn from_optional(buf: Option<&str>) -> Self {
        buf.map(Self::from).unwrap_or_default()
    }

    /// Requested page, 1 when absent or invalid.
    pub fn page(&self) -> u32 {
        match self.items.get("page").and_then(|val| val.parse::<u32>().ok()) {
            Some(0) | None => 1,
            Some(page) => page,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.items.get("id").map(String::as_str).filter(|id| !id.is_empty())
    }

    /// Set by the retry link of the error message
    pub fn reload(&self) -> bool {
        matches!(self.items.get("reload").map(String::as_str), Some("1") | Some("true"))
    }
}
