use super::queries;
use super::record::RemoteProduct;
use crate::config::SanityConfig;
use crate::error::CatalogError;
use crate::model::ProductKey;
use crate::source::CatalogSource;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("cycle-catalog/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the content store's query endpoint.
pub struct SanityClient {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

impl SanityClient {
    pub fn new(config: &SanityConfig, timeout: Duration) -> Result<Self, CatalogError> {
        let endpoint = Url::parse(&config.query_url())?;
        Self::with_endpoint(endpoint, timeout, config.token.clone())
    }

    /// Client for an explicit query endpoint, e.g. a local mirror.
    pub fn with_endpoint(
        endpoint: Url,
        timeout: Duration,
        token: Option<String>,
    ) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    /// Full request URL for a query and its `$`-prefixed parameters.
    /// Parameter values are JSON-encoded, as the query API expects.
    fn query_url(&self, query: &str, params: &[(&str, &str)]) -> Result<Url, CatalogError> {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (name, value) in params {
                pairs.append_pair(&format!("${}", name), &serde_json::to_string(value)?);
            }
        }
        Ok(url)
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, CatalogError> {
        let url = self.query_url(query, params)?;
        tracing::debug!("GET {}", url);

        let mut request = self.http.get(url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        let parsed: QueryResponse<T> = serde_json::from_str(&body)?;
        Ok(parsed.result)
    }
}

#[async_trait]
impl CatalogSource for SanityClient {
    async fn fetch_product(&self, key: &ProductKey) -> Result<Option<RemoteProduct>, CatalogError> {
        match key {
            ProductKey::Id(id) => self.query(queries::PRODUCT_BY_ID, &[("id", id.as_str())]).await,
            ProductKey::Slug(slug) => {
                self.query(queries::PRODUCT_BY_SLUG, &[("slug", slug.as_str())]).await
            }
        }
    }

    async fn list_products(&self) -> Result<Vec<RemoteProduct>, CatalogError> {
        let products: Option<Vec<RemoteProduct>> = self.query(queries::PRODUCTS, &[]).await?;
        Ok(products.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config() -> SanityConfig {
        SanityConfig {
            project_id: "lnk8ymnf".into(),
            dataset: "production".into(),
            api_version: "2024-01-01".into(),
            use_cdn: true,
            token: None,
        }
    }

    #[test]
    fn query_url_encodes_params_as_json() {
        let client = SanityClient::new(&config(), Duration::from_secs(1)).unwrap();
        let url = client
            .query_url(queries::PRODUCT_BY_ID, &[("id", "1")])
            .unwrap();

        assert_eq!(url.host_str(), Some("lnk8ymnf.apicdn.sanity.io"));
        assert_eq!(url.path(), "/v2024-01-01/data/query/production");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0].0, "query");
        assert_eq!(pairs[0].1, queries::PRODUCT_BY_ID);
        assert_eq!(pairs[1], ("$id".to_string(), "\"1\"".to_string()));
    }

    #[test]
    fn null_result_is_no_record() {
        let parsed: QueryResponse<RemoteProduct> =
            serde_json::from_str(r#"{"ms": 3, "query": "...", "result": null}"#).unwrap();
        assert!(parsed.result.is_none());
    }

    #[test]
    fn listing_result_decodes() {
        let parsed: QueryResponse<Vec<RemoteProduct>> = serde_json::from_str(
            r#"{"result": [{"_id": "a", "name": "A"}, {"_id": "b", "price": 10}]}"#,
        )
        .unwrap();
        let products = parsed.result.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].price, Some(10.0));
    }

    /// Serves one canned HTTP response and returns a client pointed at it.
    async fn serve_once(status: &str, body: &str) -> SanityClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let endpoint = Url::parse(&format!("http://{}/v2024-01-01/data/query/production", addr)).unwrap();
        let mut client = SanityClient::with_endpoint(endpoint, Duration::from_secs(2), None).unwrap();
        // Loopback must not be routed through a proxy from the environment.
        client.http = reqwest::Client::builder().no_proxy().build().unwrap();
        client
    }

    #[tokio::test]
    async fn server_errors_are_failures_not_missing_records() {
        let client = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let result = client.fetch_product(&ProductKey::Id("1".into())).await;
        assert!(matches!(result, Err(CatalogError::Network(_))));

        let client = serve_once("404 Not Found", "").await;
        let result = client.fetch_product(&ProductKey::Id("1".into())).await;
        assert!(matches!(result, Err(CatalogError::Network(_))));
    }

    #[tokio::test]
    async fn non_json_body_is_a_failure() {
        let client = serve_once("200 OK", "<html>maintenance</html>").await;
        let result = client.fetch_product(&ProductKey::Id("1".into())).await;
        assert!(matches!(result, Err(CatalogError::Json(_))));
    }

    #[tokio::test]
    async fn null_result_over_http_is_no_record() {
        let client = serve_once("200 OK", r#"{"ms":2,"result":null}"#).await;
        let result = client.fetch_product(&ProductKey::Slug("nope".into())).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn record_over_http_is_decoded() {
        let client = serve_once("200 OK", r#"{"result":{"_id":"5","name":"Gravel One","price":1899}}"#).await;
        let record = client
            .fetch_product(&ProductKey::Id("5".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.id.as_deref(), Some("5"));
        assert_eq!(record.name.as_deref(), Some("Gravel One"));
        assert_eq!(record.price, Some(1899.0));
    }
}
