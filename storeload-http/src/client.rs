use bytes::Bytes;
use http_body_util::{BodyExt as _, Full};
use hyper::Request;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use storeload_core::{PurchaseRequest, PurchaseTransport, TargetAddr, TransportError, format_date};

use super::types::{DEFAULT_BASE_PATH, PurchaseBody, TransportTimeouts};
use super::util::{base_url, host_header_value};
use super::{Error, Result};

/// HTTP/1.1 purchase client. Connections are pooled and shared by every store worker.
#[derive(Debug, Clone)]
pub struct HttpPurchaseTransport {
    inner: Client<HttpConnector, Full<Bytes>>,
    base: url::Url,
    base_path: String,
    host: String,
    timeouts: TransportTimeouts,
}

impl HttpPurchaseTransport {
    pub fn new(
        target: &TargetAddr,
        base_path: Option<&str>,
        timeouts: TransportTimeouts,
    ) -> Result<Self> {
        let base = base_url(target)?;
        let host = host_header_value(&base).ok_or_else(|| Error::InvalidUrl(base.to_string()))?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeouts.connect));
        connector.set_nodelay(true);

        let inner = Client::builder(TokioExecutor::new()).build(connector);
        tracing::debug!(
            base = %base,
            connect_timeout = ?timeouts.connect,
            request_timeout = ?timeouts.request,
            "http purchase transport ready"
        );

        Ok(Self {
            inner,
            base,
            base_path: base_path
                .unwrap_or(DEFAULT_BASE_PATH)
                .trim_matches('/')
                .to_string(),
            host,
            timeouts,
        })
    }

    #[must_use]
    pub fn timeouts(&self) -> TransportTimeouts {
        self.timeouts
    }

    /// Full URL for one purchase: `/{base}/purchase/{store}/customer/{customer}/date/{YYYYMMDD}`.
    pub fn purchase_url(&self, purchase: &PurchaseRequest) -> Result<url::Url> {
        let mut path = String::new();
        if !self.base_path.is_empty() {
            path.push('/');
            path.push_str(&self.base_path);
        }
        path.push_str(&format!(
            "/purchase/{}/customer/{}/date/{}",
            purchase.store_id,
            purchase.customer_id,
            format_date(purchase.date)
        ));

        self.base
            .join(&path)
            .map_err(|_| Error::InvalidUrl(format!("{}{path}", self.base)))
    }

    /// Sends one purchase and returns the response status. The body is drained but not inspected.
    pub async fn post_purchase(&self, purchase: &PurchaseRequest) -> Result<u16> {
        let url = self.purchase_url(purchase)?;
        let uri: hyper::Uri = url
            .as_str()
            .parse()
            .map_err(|_| Error::InvalidUrl(url.to_string()))?;
        let body = serde_json::to_vec(&PurchaseBody::from(purchase))?;

        let req: Request<Full<Bytes>> = Request::builder()
            .method(http::Method::POST)
            .uri(uri)
            .header(http::header::HOST, self.host.as_str())
            .header(http::header::CONTENT_TYPE, "application/json")
            .header(http::header::CONTENT_LENGTH, body.len())
            .body(Full::new(Bytes::from(body)))?;

        let exchange = async {
            let res = self.inner.request(req).await?;
            let status = res.status().as_u16();
            res.into_body().collect().await?;
            Ok::<_, Error>(status)
        };

        match tokio::time::timeout(self.timeouts.request, exchange).await {
            Ok(res) => res,
            Err(_) => Err(Error::Timeout(self.timeouts.request)),
        }
    }
}

impl PurchaseTransport for HttpPurchaseTransport {
    async fn send_purchase(
        &self,
        purchase: &PurchaseRequest,
    ) -> std::result::Result<u16, TransportError> {
        self.post_purchase(purchase).await.map_err(TransportError::from)
    }
}
