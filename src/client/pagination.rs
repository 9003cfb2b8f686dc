use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Page size the management API accepts at most
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Query contract for paginated listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
}

impl Pagination {
    pub fn new(page: u32) -> Self {
        Self {
            page,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }

    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search = search.filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("pagesize".to_string(), self.page_size.to_string()),
        ];

        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }

        query
    }
}

/// Listing envelope: `{"totalPages": "N", "list": [...]}`
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListPage<T> {
    #[serde(rename = "totalPages", default, deserialize_with = "lenient_u64")]
    pub total_pages: Option<u64>,
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

impl<T> ListPage<T> {
    /// Pages reported by the server; at least one when anything was listed
    pub fn page_count(&self) -> u64 {
        match self.total_pages {
            Some(pages) => pages,
            None if self.list.is_empty() => 0,
            None => 1,
        }
    }
}

/// Accept numbers encoded either as JSON numbers or as strings
pub fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected unsigned integer, got {}", n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected numeric string, got '{}'", s))),
        Some(other) => Err(de::Error::custom(format!(
            "expected number or string, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    #[test]
    fn test_total_pages_as_string() {
        let page: ListPage<Item> =
            serde_json::from_str(r#"{"totalPages":"3","list":[{"name":"a"}]}"#).unwrap();

        assert_eq!(page.total_pages, Some(3));
        assert_eq!(page.list.len(), 1);
    }

    #[test]
    fn test_total_pages_as_number_and_missing_list() {
        let page: ListPage<Item> = serde_json::from_str(r#"{"totalPages":2}"#).unwrap();

        assert_eq!(page.page_count(), 2);
        assert!(page.list.is_empty());
    }

    #[test]
    fn test_page_count_without_total() {
        let empty: ListPage<Item> = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.page_count(), 0);

        let one: ListPage<Item> = serde_json::from_str(r#"{"list":[{"name":"a"}]}"#).unwrap();
        assert_eq!(one.page_count(), 1);
    }

    #[test]
    fn test_query_skips_empty_search() {
        let query = Pagination::new(1).with_search(Some("")).to_query();
        assert_eq!(query.len(), 2);

        let query = Pagination::new(2).with_search(Some("ctrl")).to_query();
        assert!(query.contains(&("page".to_string(), "2".to_string())));
        assert!(query.contains(&("pagesize".to_string(), "500".to_string())));
        assert!(query.contains(&("search".to_string(), "ctrl".to_string())));
    }
}
