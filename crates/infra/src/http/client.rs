use std::time::Duration;

use marketlink_core::request::headers::RequestHeaders;
use marketlink_core::RawResponse;
use marketlink_domain::{
    ErrorRecord, FormPart, HttpMethod, MarketlinkError, MultipartForm, RequestBody,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder};
use tracing::debug;

use crate::errors::{transport_error, InfraError};

/// One fully prepared transport call.
#[derive(Debug, Clone)]
pub struct TransportRequest<'a> {
    pub method: HttpMethod,
    pub url: &'a str,
    pub headers: &'a RequestHeaders,
    pub body: &'a RequestBody,
}

/// HTTP transport with a per-call cancellation guard.
///
/// A single call covers sending the request and reading the whole body. No
/// retries happen here; the request executor owns the attempt loop.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Cancellation guard applied to every attempt.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute one call, aborting it once the timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns a timeout record (408) when the guard fires and a network
    /// record (500) when the transport fails before a response arrives.
    pub async fn send(&self, request: TransportRequest<'_>) -> Result<RawResponse, ErrorRecord> {
        let builder = self.prepare(&request)?;

        match tokio::time::timeout(self.timeout, Self::dispatch(builder)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(method = %request.method, url = %request.url, timeout = ?self.timeout, "HTTP request aborted by timeout");
                Err(ErrorRecord::timeout())
            }
        }
    }

    fn prepare(&self, request: &TransportRequest<'_>) -> Result<RequestBuilder, ErrorRecord> {
        let mut builder = self.client.request(to_method(request.method), request.url);

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(
                serde_json::to_vec(value).map_err(|err| ErrorRecord::from(MarketlinkError::from(err)))?,
            ),
            RequestBody::Multipart(form) => builder.multipart(to_form(form)?),
        };

        Ok(builder)
    }

    async fn dispatch(builder: RequestBuilder) -> Result<RawResponse, ErrorRecord> {
        let response = builder.send().await.map_err(|err| {
            debug!(error = %err, "HTTP request failed");
            transport_error(&err)
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|err| transport_error(&err))?;

        debug!(status, bytes = body.len(), "received HTTP response");
        Ok(RawResponse { status, content_type, body: body.to_vec() })
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn to_form(form: &MultipartForm) -> Result<Form, ErrorRecord> {
    let mut multipart = Form::new();
    for part in form.parts() {
        multipart = match part {
            FormPart::Text { name, value } => multipart.text(name.clone(), value.clone()),
            FormPart::File { name, file_name, mime_type, bytes } => {
                let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime_type {
                    file = file.mime_str(mime).map_err(|err| {
                        ErrorRecord::internal(format!("invalid MIME type for {name}: {err}"))
                    })?;
                }
                multipart.part(name.clone(), file)
            }
        };
    }
    Ok(multipart)
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None }
    }
}

impl HttpClientBuilder {
    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `User-Agent` header
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the HTTP client
    ///
    /// # Errors
    ///
    /// Returns error if the underlying reqwest client cannot be created
    pub fn build(self) -> Result<HttpClient, MarketlinkError> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            MarketlinkError::from(infra)
        })?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use marketlink_core::build_headers;
    use marketlink_domain::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(timeout: Duration) -> HttpClient {
        HttpClient::builder().timeout(timeout).build().expect("http client")
    }

    #[tokio::test]
    async fn returns_raw_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ads/"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"title": "Bike"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let body = RequestBody::Json(json!({"title": "Bike"}));
        let headers = build_headers(false, &body, None);
        let url = format!("{}/api/ads/", server.uri());
        let raw = client(Duration::from_secs(5))
            .send(TransportRequest { method: HttpMethod::Post, url: &url, headers: &headers, body: &body })
            .await
            .expect("response");

        assert_eq!(raw.status, 201);
        assert!(raw.content_type.unwrap().contains("application/json"));
        assert_eq!(serde_json::from_slice::<serde_json::Value>(&raw.body).unwrap(), json!({"id": 1}));
    }

    #[tokio::test]
    async fn non_success_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let headers = RequestHeaders::default();
        let raw = client(Duration::from_secs(5))
            .send(TransportRequest {
                method: HttpMethod::Get,
                url: &server.uri(),
                headers: &headers,
                body: &RequestBody::Empty,
            })
            .await
            .expect("response");

        assert_eq!(raw.status, 503);
        assert_eq!(raw.body, b"busy");
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let headers = RequestHeaders::default();
        let err = client(Duration::from_millis(50))
            .send(TransportRequest {
                method: HttpMethod::Get,
                url: &server.uri(),
                headers: &headers,
                body: &RequestBody::Empty,
            })
            .await
            .unwrap_err();

        assert_eq!(err.status, 408);
        assert_eq!(err.message, "Request timeout");
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED
        let url = format!("http://{addr}");

        let headers = RequestHeaders::default();
        let err = client(Duration::from_secs(5))
            .send(TransportRequest {
                method: HttpMethod::Get,
                url: &url,
                headers: &headers,
                body: &RequestBody::Empty,
            })
            .await
            .unwrap_err();

        assert_eq!(err.status, 500);
        assert_eq!(err.kind, ErrorKind::Network);
    }

    #[tokio::test]
    async fn multipart_sets_boundary_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(|req: &wiremock::Request| -> ResponseTemplate {
                let content_type = req
                    .headers
                    .get("content-type")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                ResponseTemplate::new(200).set_body_string(content_type)
            })
            .mount(&server)
            .await;

        let body = RequestBody::Multipart(
            MultipartForm::new()
                .text("first_name", "Ada")
                .file("avatar", "me.png", Some("image/png"), vec![1, 2, 3]),
        );
        let headers = build_headers(true, &body, Some("token"));
        let raw = client(Duration::from_secs(5))
            .send(TransportRequest { method: HttpMethod::Put, url: &server.uri(), headers: &headers, body: &body })
            .await
            .expect("response");

        let echoed = String::from_utf8(raw.body).unwrap();
        assert!(echoed.starts_with("multipart/form-data; boundary="));
    }
}
