use std::io;
use std::io::ErrorKind;

use markdown::Options;

use crate::card::{Cover, UNTITLED};
use crate::record::Record;
use crate::text_utils::format_timestamp;

/// Full view of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub date: String,
    pub cover: Option<Cover>,
    pub content: String,
}

impl Article {
    pub fn from_record(record: &Record, utc_offset_minutes: i32) -> io::Result<Article> {
        Ok(Article {
            id: record.id.clone(),
            title: record.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
            date: format_timestamp(record.published, utc_offset_minutes).unwrap_or_default(),
            cover: Cover::from_record(record),
            content: render_markdown(record.body.as_deref().unwrap_or_default())?,
        })
    }
}

/// Markdown body to HTML. Raw HTML in the body is escaped.
pub fn render_markdown(md_text: &str) -> io::Result<String> {
    match markdown::to_html_with_options(md_text, &Options::gfm()) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.to_string())),
    }
}
