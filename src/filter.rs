use crate::record::Record;

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryFilter {
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => record.category == *category,
        }
    }
}

/// Records matching `filter`, newest first. Equal timestamps keep their input order.
pub fn filter_and_sort<'a>(records: &'a [Record], filter: &CategoryFilter) -> Vec<&'a Record> {
    let mut selected: Vec<&Record> = records.iter()
        .filter(|record| filter.matches(record))
        .collect();

    // sort_by is stable
    selected.sort_by(|a, b| b.published.cmp(&a.published));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, category: &str, published: i64) -> Record {
        Record {
            id: id.to_string(),
            category: category.to_string(),
            published,
            ..Default::default()
        }
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_filter_blog() {
        let records = vec![
            record("1", "blog", 200),
            record("2", "blog", 100),
            record("3", "art", 300),
        ];
        let res = filter_and_sort(&records, &CategoryFilter::Only("blog".to_string()));
        assert_eq!(ids(&res), ["1", "2"]);
    }

    #[test]
    fn test_sorted_descending() {
        let records = vec![
            record("a", "blog", 5),
            record("b", "blog", 50),
            record("c", "art", 7),
            record("d", "blog", 20),
            record("e", "blog", 50),
        ];
        let res = filter_and_sort(&records, &CategoryFilter::Only("blog".to_string()));
        assert!(res.iter().all(|r| r.category == "blog"));
        assert!(res.windows(2).all(|w| w[0].published >= w[1].published));
        // ties keep the input order
        assert_eq!(ids(&res), ["b", "e", "d", "a"]);
    }

    #[test]
    fn test_all() {
        let records = vec![record("1", "blog", 1), record("2", "art", 2)];
        let res = filter_and_sort(&records, &CategoryFilter::All);
        assert_eq!(ids(&res), ["2", "1"]);
    }

    #[test]
    fn test_no_match() {
        let records = vec![record("1", "blog", 1)];
        assert!(filter_and_sort(&records, &CategoryFilter::Only("music".to_string())).is_empty());
        assert!(filter_and_sort(&[], &CategoryFilter::All).is_empty());
    }
}
