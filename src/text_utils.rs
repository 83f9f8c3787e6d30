use chrono::{DateTime, FixedOffset, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

pub const PREVIEW_LEN: usize = 100;
pub const ELLIPSIS: &str = "...";

/// Plain text preview of a markdown body, at most `PREVIEW_LEN` characters plus `ELLIPSIS`.
pub fn preview_text(body: &str) -> String {
    lazy_static! {
        static ref IMAGE_REGEX: Regex = Regex::new(r"!\[.*?\]\(.*?\)").unwrap();
        static ref LINK_REGEX: Regex = Regex::new(r"\[.*?\]\(.*?\)").unwrap();
        static ref MARKER_REGEX: Regex = Regex::new(r"[#*`>~\-+]").unwrap();
        static ref NEWLINE_REGEX: Regex = Regex::new(r"\n+").unwrap();
    }

    let text = IMAGE_REGEX.replace_all(body, "");
    let text = LINK_REGEX.replace_all(&text, "");
    let text = MARKER_REGEX.replace_all(&text, "");
    let text = NEWLINE_REGEX.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() > PREVIEW_LEN {
        let mut preview: String = text.chars().take(PREVIEW_LEN).collect();
        preview.push_str(ELLIPSIS);
        preview
    } else {
        text.to_string()
    }
}

/// Local date of an epoch-milliseconds timestamp, as `YYYY-MM-DD`.
pub fn format_timestamp(millis: i64, utc_offset_minutes: i32) -> Option<String> {
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60)?;
    let date_time = DateTime::from_timestamp_millis(millis)?.with_timezone(&offset);
    let (date, _time) = format_date_time(&date_time.naive_local());
    Some(date)
}

pub fn format_date_time(date_time: &NaiveDateTime) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}
