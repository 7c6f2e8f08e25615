//! Request plumbing shared by the resource clients.

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::error::{RequestError, Result};
use crate::stream::RunStream;

use super::{Client, REQUEST_ID_HEADER};

impl Client {
    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request, retrying retryable failures per the configured policy.
    ///
    /// Returns the response only when its status is a success.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        event_stream: bool,
    ) -> std::result::Result<Response, RequestError> {
        let policy = &self.inner.retry;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request_id = Uuid::new_v4();
            tracing::debug!(
                %method,
                path = url.path(),
                %request_id,
                attempt,
                "sending request"
            );

            let mut request = self
                .inner
                .http
                .request(method.clone(), url.clone())
                .header(REQUEST_ID_HEADER, request_id.to_string());
            if let Some(body) = body {
                request = request.json(body);
            }
            if event_stream {
                request = request.header(ACCEPT, "text/event-stream");
            } else if let Some(timeout) = self.inner.timeout {
                request = request.timeout(timeout);
            }

            let error = match self.send(request, event_stream).await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let text = response.text().await.unwrap_or_default();
                    RequestError::from_body(status, &text)
                }
                Err(err) => err,
            };

            if !(error.is_retryable() && policy.should_retry(attempt)) {
                tracing::debug!(%method, path = url.path(), %request_id, %error, "request failed");
                return Err(error);
            }

            let delay = policy.delay_for(attempt);
            tracing::warn!(
                %method,
                path = url.path(),
                attempt,
                ?delay,
                %error,
                "request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Send one attempt.
    ///
    /// A stream response only has to arrive within the timeout; its body is
    /// read for as long as the run lasts.
    async fn send(
        &self,
        request: RequestBuilder,
        event_stream: bool,
    ) -> std::result::Result<Response, RequestError> {
        match self.inner.timeout {
            Some(timeout) if event_stream => {
                match tokio::time::timeout(timeout, request.send()).await {
                    Ok(sent) => sent.map_err(RequestError::from),
                    Err(_) => Err(RequestError::Timeout),
                }
            }
            _ => request.send().await.map_err(RequestError::from),
        }
    }

    /// Decode a JSON response body.
    async fn decode<T: DeserializeOwned>(response: Response, expected: &str) -> Result<T> {
        let text = response.text().await.map_err(RequestError::from)?;
        serde_json::from_str(&text).map_err(|e| {
            RequestError::decode(expected, format!("parse error: {e}, response: {text}")).into()
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url, expected: &str) -> Result<T> {
        let response = self.execute(Method::GET, url, None, false).await?;
        Self::decode(response, expected).await
    }

    pub(crate) async fn post_json<B, T>(&self, url: Url, body: &B, expected: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, url, Some(&body), false).await?;
        Self::decode(response, expected).await
    }

    /// POST without a body, ignoring whatever the service answers.
    pub(crate) async fn post_empty(&self, url: Url) -> Result<()> {
        self.execute(Method::POST, url, None, false).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<()> {
        self.execute(Method::DELETE, url, None, false).await?;
        Ok(())
    }

    /// POST a body and read the response as an event stream.
    ///
    /// Retries only cover opening the stream; once the response headers
    /// arrived the body is handed to [`RunStream`] as is.
    pub(crate) async fn post_stream<B>(&self, url: Url, body: &B) -> Result<RunStream>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, url, Some(&body), true).await?;
        Ok(RunStream::from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use crate::client::Client;
    use crate::config::ClientConfig;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = Client::new(ClientConfig::new("http://localhost:8123")).unwrap();
        assert_eq!(
            client.endpoint(&["threads", "t-1", "runs", "stream"]).as_str(),
            "http://localhost:8123/threads/t-1/runs/stream"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = Client::new(ClientConfig::new("https://example.com/api/")).unwrap();
        assert_eq!(
            client.endpoint(&["assistants"]).as_str(),
            "https://example.com/api/assistants"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let client = Client::new(ClientConfig::default()).unwrap();
        assert_eq!(
            client.endpoint(&["threads", "a/b c"]).as_str(),
            "http://localhost:8123/threads/a%2Fb%20c"
        );
    }
}
