use crate::data_sync::source::JsonSource;
use crate::error::{Result, SyncError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;

/// Offset-paginated walk over one table of the results API.
///
/// Pages are requested lazily with `offset += page_size` until a page comes back empty.
/// Pacing is left to the source; see `ThrottledSource`.
pub struct Paginator<'a, T> {
    source: &'a dyn JsonSource,
    endpoint: String,
    pointer: &'static str,
    page_size: u32,
    offset: u32,
    requests: usize,
    exhausted: bool,
    _record: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> Paginator<'a, T> {
    /// `endpoint` is the full URL without pagination parameters, `pointer` the JSON pointer to the record array.
    pub fn new(
        source: &'a dyn JsonSource,
        endpoint: impl Into<String>,
        pointer: &'static str,
        page_size: u32,
    ) -> Self {
        Self {
            source,
            endpoint: endpoint.into(),
            pointer,
            page_size: page_size.max(1),
            offset: 0,
            requests: 0,
            exhausted: false,
            _record: PhantomData,
        }
    }

    pub fn page_url(&self, offset: u32) -> String {
        page_url(&self.endpoint, self.page_size, offset)
    }

    /// Fetch the next page, or `None` once an empty page has been seen.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.exhausted {
            return Ok(None);
        }

        let url = self.page_url(self.offset);
        self.requests += 1;
        let body = self.source.get_json(&url).await?;
        let records = extract_records::<T>(&url, &body, self.pointer)?;

        debug!("{}: {} records at offset {}", self.endpoint, records.len(), self.offset);

        if records.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        self.offset += self.page_size;
        Ok(Some(records))
    }

    /// Drain every page into one vector.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page);
        }
        Ok(all)
    }

    pub fn requests_made(&self) -> usize {
        self.requests
    }
}

pub fn page_url(endpoint: &str, limit: u32, offset: u32) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}limit={}&offset={}", endpoint, separator, limit, offset)
}

/// Every results API response is wrapped in `MRData`; a missing table inside it counts as an empty page.
fn extract_records<T: DeserializeOwned>(url: &str, body: &Value, pointer: &str) -> Result<Vec<T>> {
    if body.get("MRData").is_none() {
        return Err(SyncError::payload(url, "missing MRData envelope"));
    }

    match body.pointer(pointer) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| serde_json::from_value(item.clone()).map_err(|e| SyncError::payload(url, e)))
            .collect(),
        Some(other) => Err(SyncError::payload(url, format!("{} is not an array: {}", pointer, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sync::source::ThrottledSource;
    use crate::test_support::{StaticSource, ergast_envelope};
    use std::sync::Arc;
    use std::time::Duration;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Season {
        season: String,
    }

    const POINTER: &str = "/MRData/SeasonTable/Seasons";
    const ENDPOINT: &str = "https://ergast.test/f1/seasons/?format=json";

    fn seasons_page(years: &[&str]) -> Value {
        let seasons: Vec<Value> = years.iter().map(|y| json!({"season": y})).collect();
        ergast_envelope(json!({"SeasonTable": {"Seasons": seasons}}))
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page_url(ENDPOINT, 30, 60), "https://ergast.test/f1/seasons/?format=json&limit=30&offset=60");
        assert_eq!(page_url("https://ergast.test/f1/2023/races/", 30, 0), "https://ergast.test/f1/2023/races/?limit=30&offset=0");
    }

    #[tokio::test]
    async fn test_walks_until_empty_page() {
        let source = StaticSource::new()
            .with(&page_url(ENDPOINT, 2, 0), seasons_page(&["1950", "1951"]))
            .with(&page_url(ENDPOINT, 2, 2), seasons_page(&["1952"]))
            .with(&page_url(ENDPOINT, 2, 4), seasons_page(&[]));

        let paginator = Paginator::<Season>::new(&source, ENDPOINT, POINTER, 2);
        let seasons = paginator.collect_all().await.unwrap();

        let years: Vec<&str> = seasons.iter().map(|s| s.season.as_str()).collect();
        assert_eq!(years, vec!["1950", "1951", "1952"]);
        assert_eq!(source.request_count(), 3);
    }

    #[tokio::test]
    async fn test_stops_after_exhaustion() {
        let source = StaticSource::new().with(&page_url(ENDPOINT, 30, 0), seasons_page(&[]));

        let mut paginator = Paginator::<Season>::new(&source, ENDPOINT, POINTER, 30);
        assert!(paginator.next_page().await.unwrap().is_none());
        assert!(paginator.next_page().await.unwrap().is_none());
        assert_eq!(paginator.requests_made(), 1);
    }

    #[tokio::test]
    async fn test_http_failure_is_fatal() {
        let source = StaticSource::new().with(&page_url(ENDPOINT, 30, 0), seasons_page(&["2023"]));

        let paginator = Paginator::<Season>::new(&source, ENDPOINT, POINTER, 30);
        let err = paginator.collect_all().await.unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_missing_envelope_is_payload_error() {
        let source = StaticSource::new().with(&page_url(ENDPOINT, 30, 0), json!({"error": "oops"}));

        let paginator = Paginator::<Season>::new(&source, ENDPOINT, POINTER, 30);
        let err = paginator.collect_all().await.unwrap_err();
        assert!(matches!(err, SyncError::Payload { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_spans_paginators() {
        let source = Arc::new(
            StaticSource::new()
                .with(&page_url(ENDPOINT, 1, 0), seasons_page(&["1950"]))
                .with(&page_url(ENDPOINT, 1, 1), seasons_page(&[])),
        );
        let throttled = ThrottledSource::new(source.clone(), Duration::from_secs(3));

        let start = tokio::time::Instant::now();
        Paginator::<Season>::new(&throttled, ENDPOINT, POINTER, 1).collect_all().await.unwrap();
        Paginator::<Season>::new(&throttled, ENDPOINT, POINTER, 1).collect_all().await.unwrap();

        // four requests, three pauses
        assert_eq!(source.request_count(), 4);
        assert!(start.elapsed() >= Duration::from_secs(9));
    }
}
