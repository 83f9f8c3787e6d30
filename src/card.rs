use crate::record::Record;
use crate::text_utils::{format_timestamp, preview_text};

pub const UNTITLED: &str = "Untitled";
pub const COVER_ALT: &str = "Cover";

#[derive(Debug, Clone, PartialEq)]
pub struct Cover {
    pub url: String,
    pub alt: String,
}

impl Cover {
    /// First cover image of the record, if it has a usable URL.
    pub fn from_record(record: &Record) -> Option<Cover> {
        let url = record.covers.first()?.best_url()?;
        Some(Cover {
            url: url.to_string(),
            alt: record.title.clone().unwrap_or_else(|| COVER_ALT.to_string()),
        })
    }
}

/// Everything a card shows, computed from one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub category: String,
    pub date: String,
    pub preview: String,
    pub cover: Option<Cover>,
    pub detail_link: String,
}

impl Card {
    pub fn from_record(record: &Record, utc_offset_minutes: i32) -> Card {
        Card {
            id: record.id.clone(),
            title: record.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
            category: record.category.clone(),
            date: format_timestamp(record.published, utc_offset_minutes).unwrap_or_default(),
            preview: record.body.as_deref().map(preview_text).unwrap_or_default(),
            cover: Cover::from_record(record),
            detail_link: detail_link(&record.id),
        }
    }
}

pub fn detail_link(id: &str) -> String {
    match serde_urlencoded::to_string([("id", id)]) {
        Ok(query) => format!("/article?{}", query),
        Err(_) => format!("/article?id={}", id),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardView {
    Cards(Vec<Card>),
    /// Nothing matched, the message is shown instead of an empty list
    Empty(String),
    Failed(String),
}

impl CardView {
    pub fn from_records(records: &[&Record], utc_offset_minutes: i32, no_content_message: &str) -> CardView {
        if records.is_empty() {
            return CardView::Empty(no_content_message.to_string());
        }

        let cards = records.iter()
            .map(|record| Card::from_record(record, utc_offset_minutes))
            .collect();
        CardView::Cards(cards)
    }
}

#[cfg(test)]
mod tests {
    use crate::record::CoverImage;

    use super::*;

    fn sample() -> Record {
        Record {
            id: "rec 1".to_string(),
            category: "blog".to_string(),
            title: Some("Hello".to_string()),
            body: Some("**Hi** there".to_string()),
            published: 1700000000000,
            covers: vec![
                CoverImage { url: Some("https://x/1.png".to_string()), tmp_url: None },
                CoverImage { url: Some("https://x/2.png".to_string()), tmp_url: Some("https://x/2t.png".to_string()) },
            ],
        }
    }

    #[test]
    fn test_card_from_record() {
        let card = Card::from_record(&sample(), 480);
        assert_eq!(card.title, "Hello");
        assert_eq!(card.category, "blog");
        assert_eq!(card.date, "2023-11-15");
        assert_eq!(card.preview, "Hi there");
        assert_eq!(card.detail_link, "/article?id=rec+1");
        assert_eq!(card.cover, Some(Cover { url: "https://x/1.png".to_string(), alt: "Hello".to_string() }));
    }

    #[test]
    fn test_placeholders() {
        let record = Record { id: "r".to_string(), ..Default::default() };
        let card = Card::from_record(&record, 0);
        assert_eq!(card.title, UNTITLED);
        assert_eq!(card.preview, "");
        assert_eq!(card.date, "1970-01-01");
        assert!(card.cover.is_none());
    }

    #[test]
    fn test_empty_title_cell() {
        let raw = serde_json::json!({"record_id": "r1", "fields": {"标题": ""}});
        let record = Record::from_value(&raw, &crate::config::Fields::default()).unwrap();
        assert_eq!(Card::from_record(&record, 0).title, UNTITLED);
    }

    #[test]
    fn test_cover_without_urls() {
        let record = Record {
            id: "r".to_string(),
            covers: vec![CoverImage::default()],
            ..Default::default()
        };
        assert!(Card::from_record(&record, 0).cover.is_none());
    }

    #[test]
    fn test_empty_view() {
        let view = CardView::from_records(&[], 0, "Nothing here");
        assert_eq!(view, CardView::Empty("Nothing here".to_string()));

        let record = sample();
        match CardView::from_records(&[&record], 0, "Nothing here") {
            CardView::Cards(cards) => assert_eq!(cards.len(), 1),
            other => panic!("unexpected view {:?}", other),
        }
    }
}
