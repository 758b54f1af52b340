//! Legacy HTTP transport for bucket-properties operations.
//!
//! Only two operations ride this path: storing extended bucket properties
//! as JSON and resetting a bucket's properties to defaults. Everything
//! else uses the binary protocol.

use reqwest::StatusCode;
use riak_core::{Result, RiakError};

use crate::config::NodeConfig;

/// HTTP client for one node's REST interface.
///
/// Shares the result envelope with the binary path: unexpected statuses
/// surface as [`RiakError::InvalidResponse`], transport failures as
/// [`RiakError::Communication`].
#[derive(Debug, Clone)]
pub struct RestTransport {
    base_url: String,
    http: reqwest::Client,
}

impl RestTransport {
    /// Creates a transport for the given node.
    pub fn new(config: &NodeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .build()
            .map_err(|e| {
                RiakError::Communication(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url: config.http_base_url(),
            http,
        })
    }

    fn props_url(&self, bucket_type: Option<&str>, bucket: &str) -> String {
        match bucket_type {
            Some(t) => format!("{}/types/{}/buckets/{}/props", self.base_url, t, bucket),
            None => format!("{}/buckets/{}/props", self.base_url, bucket),
        }
    }

    /// Stores bucket properties as JSON. The server acknowledges with
    /// `204 No Content`.
    pub async fn put_bucket_props(
        &self,
        bucket_type: Option<&str>,
        bucket: &str,
        props: &serde_json::Value,
    ) -> Result<()> {
        let url = self.props_url(bucket_type, bucket);
        let body = serde_json::json!({ "props": props });

        let response = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RiakError::Communication(format!("HTTP PUT {} failed: {}", url, e)))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            status => Err(RiakError::InvalidResponse(format!(
                "unexpected status {} storing bucket properties",
                status
            ))),
        }
    }

    /// Resets a bucket's properties to defaults. `404` maps to
    /// [`RiakError::NotFound`].
    pub async fn delete_bucket_props(
        &self,
        bucket_type: Option<&str>,
        bucket: &str,
    ) -> Result<()> {
        let url = self.props_url(bucket_type, bucket);

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| RiakError::Communication(format!("HTTP DELETE {} failed: {}", url, e)))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(RiakError::NotFound),
            status => Err(RiakError::InvalidResponse(format!(
                "unexpected status {} resetting bucket properties",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_one_response(status_line: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!("{}\r\ncontent-length: 0\r\n\r\n", status_line);
            let _ = socket.write_all(response.as_bytes()).await;
        });

        port
    }

    fn transport_for(port: u16) -> RestTransport {
        let config = NodeConfig::builder("127.0.0.1")
            .http_port(port)
            .connect_timeout(Duration::from_secs(1))
            .read_timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        RestTransport::new(&config).unwrap()
    }

    #[test]
    fn test_props_url_without_type() {
        let transport = transport_for(8098);
        assert_eq!(
            transport.props_url(None, "users"),
            "http://127.0.0.1:8098/buckets/users/props"
        );
    }

    #[test]
    fn test_props_url_with_type() {
        let transport = transport_for(8098);
        assert_eq!(
            transport.props_url(Some("maps"), "users"),
            "http://127.0.0.1:8098/types/maps/buckets/users/props"
        );
    }

    #[tokio::test]
    async fn test_put_props_no_content() {
        let port = serve_one_response("HTTP/1.1 204 No Content").await;
        let transport = transport_for(port);

        let props = serde_json::json!({ "allow_mult": true });
        transport
            .put_bucket_props(None, "b", &props)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_put_props_unexpected_status() {
        let port = serve_one_response("HTTP/1.1 500 Internal Server Error").await;
        let transport = transport_for(port);

        let props = serde_json::json!({});
        let err = transport
            .put_bucket_props(None, "b", &props)
            .await
            .unwrap_err();
        assert!(matches!(err, RiakError::InvalidResponse(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_reset_props_not_found() {
        let port = serve_one_response("HTTP/1.1 404 Not Found").await;
        let transport = transport_for(port);

        let err = transport
            .delete_bucket_props(None, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, RiakError::NotFound));
    }

    #[tokio::test]
    async fn test_reset_props_success() {
        let port = serve_one_response("HTTP/1.1 204 No Content").await;
        let transport = transport_for(port);

        transport.delete_bucket_props(Some("t"), "b").await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_communication() {
        let transport = transport_for(1);

        let err = transport.delete_bucket_props(None, "b").await.unwrap_err();
        assert!(matches!(err, RiakError::Communication(_)));
    }
}
