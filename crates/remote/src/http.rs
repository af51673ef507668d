use super::{OrderApi, RemoteError};
use async_trait::async_trait;
use courier_core::Order;
use std::sync::Arc;
use std::time::Duration;

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// JSON-over-HTTP client for the orders backend.
#[derive(Clone)]
pub struct HttpOrderApi {
    pub base_url: String,
    auth_token: Option<String>,
    http_client: reqwest::Client,
}

impl HttpOrderApi {
    pub fn new(
        base_url: String,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Arc<Self>, RemoteError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Unreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Arc::new(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            http_client,
        }))
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

async fn reject_unless_success(resp: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(RemoteError::ServerRejected { status, body })
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn list_orders(&self) -> Result<Vec<Order>, RemoteError> {
        let resp = self
            .authorize(self.http_client.get(self.orders_url()))
            .send()
            .await?;
        let resp = reject_unless_success(resp).await?;

        let orders: Vec<Order> = resp
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        tracing::debug!(count = orders.len(), "Fetched remote orders");
        Ok(orders)
    }

    async fn create_order(&self, order: &Order) -> Result<Order, RemoteError> {
        let resp = self
            .authorize(self.http_client.post(self.orders_url()))
            .header(IDEMPOTENCY_HEADER, order.client_ref.to_string())
            .json(order)
            .send()
            .await?;
        let resp = reject_unless_success(resp).await?;

        let created: Order = resp
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        tracing::info!(
            order_id = %created.id,
            client_ref = %order.client_ref,
            "Order created on remote"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one canned response and hands back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: String,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if request_complete(&buf) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    fn request_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        buf.len() >= header_end + 4 + content_length
    }

    #[tokio::test]
    async fn test_create_order_sends_idempotency_key_and_decodes_response() {
        let order = Order::new("Me", "Alice", "123 Main St", "+1 555-0101");
        let mut created = order.clone();
        created.id = "srv-42".into();
        let body = serde_json::to_string(&created).unwrap();
        let (base_url, server) = serve_once("201 Created", body).await;

        let api =
            HttpOrderApi::new(base_url, Some("secret".into()), Duration::from_secs(5)).unwrap();
        let result = api.create_order(&order).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(result.id, "srv-42");
        assert!(request.starts_with("POST /orders"));
        let lower = request.to_lowercase();
        assert!(lower.contains(&format!("idempotency-key: {}", order.client_ref)));
        assert!(lower.contains("authorization: bearer secret"));
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_server_rejected() {
        let body = r#"{"error":"bad"}"#.to_string();
        let (base_url, server) = serve_once("422 Unprocessable Entity", body).await;

        let api = HttpOrderApi::new(base_url, None, Duration::from_secs(5)).unwrap();
        let err = api.list_orders().await.unwrap_err();
        server.await.unwrap();

        match err {
            RemoteError::ServerRejected { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("bad"));
            }
            other => panic!("Expected ServerRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refused_connection_maps_to_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api =
            HttpOrderApi::new(format!("http://{addr}"), None, Duration::from_secs(5)).unwrap();
        let err = api.list_orders().await.unwrap_err();
        assert!(matches!(err, RemoteError::Unreachable(_)));
    }
}
