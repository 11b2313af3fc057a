//! Page fetching: the transport abstraction and its HTTP implementation.
//!
//! The [`PageFetcher`] trait is the worker's only view of the network, which
//! keeps the pipeline testable without a live server. The production
//! implementation wraps a shared `reqwest` client configured with the crawl
//! timeout and a browser-identifying User-Agent.

use crate::config::CrawlConfig;
use crate::error::{FetchError, Result};
use regex::Regex;

/// Abstraction over fetching one page, enabling testability.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the decoded page body.
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Production [`PageFetcher`] backed by an HTTP client.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    meta_charset: Regex,
}

impl HttpPageFetcher {
    /// Build a client from the crawl configuration (timeout, User-Agent).
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            meta_charset: Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9._-]+)"#)?,
        })
    }

    /// Decode a response body: charset from the Content-Type header if
    /// declared, else a meta-tag sniff over the head of the body, else UTF-8
    /// with replacement.
    fn decode_body(&self, bytes: &[u8], content_type: Option<&str>) -> String {
        let declared = content_type.and_then(|ct| {
            ct.split(';')
                .find_map(|part| part.trim().strip_prefix("charset="))
                .map(|label| label.trim_matches('"').to_string())
        });

        let sniffed = declared.or_else(|| {
            let head = &bytes[..bytes.len().min(1024)];
            let head = String::from_utf8_lossy(head);
            self.meta_charset
                .captures(&head)
                .map(|caps| caps[1].to_string())
        });

        if let Some(label) = sniffed
            && let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes())
        {
            let (text, _, _) = encoding.decode(bytes);
            return text.into_owned();
        }

        String::from_utf8_lossy(bytes).into_owned()
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await.map_err(FetchError::from)?;

        Ok(self.decode_body(&bytes, content_type.as_deref()))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpPageFetcher {
        HttpPageFetcher::new(&CrawlConfig::default()).unwrap()
    }

    fn fast_fetcher(timeout_secs: f64) -> HttpPageFetcher {
        let config = CrawlConfig {
            timeout_secs,
            ..CrawlConfig::default()
        };
        HttpPageFetcher::new(&config).unwrap()
    }

    #[test]
    fn decode_prefers_header_charset() {
        let gbk = encoding_rs::GBK.encode("斗气大陆").0;
        let text = fetcher().decode_body(&gbk, Some("text/html; charset=gbk"));
        assert_eq!(text, "斗气大陆");
    }

    #[test]
    fn decode_sniffs_meta_charset() {
        let mut page = b"<html><head><meta charset=\"gbk\"></head><body>".to_vec();
        page.extend_from_slice(&encoding_rs::GBK.encode("萧炎").0);
        page.extend_from_slice(b"</body></html>");
        let text = fetcher().decode_body(&page, None);
        assert!(text.contains("萧炎"));
    }

    #[test]
    fn decode_falls_back_to_utf8() {
        let text = fetcher().decode_body("plain utf-8 text".as_bytes(), None);
        assert_eq!(text, "plain utf-8 text");
    }

    #[test]
    fn decode_survives_unknown_label() {
        let text = fetcher().decode_body(b"abc", Some("text/html; charset=bogus-enc"));
        assert_eq!(text, "abc");
    }

    #[tokio::test]
    async fn fetch_sends_the_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chapter.html"))
            .and(header("User-Agent", CrawlConfig::default().user_agent))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let body = fetcher()
            .fetch(&format!("{}/chapter.html", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn non_success_status_maps_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher().fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(404)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = fast_fetcher(0.05).fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_connection_error() {
        // Port 9 (discard) is closed on any sane test machine.
        let err = fast_fetcher(0.5)
            .fetch("http://127.0.0.1:9/absent.html")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Connection(_) | FetchError::Timeout
        ));
    }
}
