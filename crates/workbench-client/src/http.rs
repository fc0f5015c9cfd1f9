use crate::error::ApiError;
use crate::transport::{ApiRequest, ApiResponse, Method, MultipartForm, RequestBody, Transport};
use reqwest::blocking::{multipart, Client};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking HTTP transport rooted at a base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// `timeout` of `None` lets requests wait indefinitely.
    pub fn new(base_url: Url, timeout: Option<Duration>, user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::Url(err.to_string()))
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request.path)?;
        debug!(method = request.method.as_str(), %url, "sending request");

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                let body = serde_json::to_vec(value).map_err(ApiError::Encode)?;
                builder.header(CONTENT_TYPE, request.content_type()).body(body)
            }
            // The multipart encoder owns the header so it can add the boundary.
            RequestBody::Multipart(form) => builder.multipart(multipart_form(form)?),
        };

        let response = builder.send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(transport_error)?.to_vec();
        debug!(status, bytes = body.len(), "received response");
        ApiResponse { status, body }.into_result()
    }
}

fn multipart_form(form: &MultipartForm) -> Result<multipart::Form, ApiError> {
    let mut encoded = multipart::Form::new();
    for part in &form.parts {
        let file = multipart::Part::bytes(part.bytes.clone())
            .file_name(part.file_name.clone())
            .mime_str(&part.mime)
            .map_err(transport_error)?;
        encoded = encoded.part(part.field.clone(), file);
    }
    Ok(encoded)
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

// reqwest keeps the useful detail (refused, timed out) in the source chain.
fn transport_error(err: reqwest::Error) -> ApiError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    ApiError::Transport(message)
}

#[cfg(test)]
mod tests {
    use super::{with_trailing_slash, HttpTransport};
    use std::time::Duration;
    use url::Url;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = with_trailing_slash(Url::parse("http://localhost:8080/api").unwrap());
        assert_eq!(url.as_str(), "http://localhost:8080/api/");
        let url = with_trailing_slash(Url::parse("http://localhost:8080/api/").unwrap());
        assert_eq!(url.as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn paths_resolve_under_the_base() {
        let transport = HttpTransport::new(
            Url::parse("http://localhost:8080/api").unwrap(),
            Some(Duration::from_secs(5)),
            "workbench-test",
        )
        .expect("transport");
        assert_eq!(
            transport.url_for("/interactions/42").unwrap().as_str(),
            "http://localhost:8080/api/interactions/42"
        );
        assert_eq!(
            transport.url_for("interactions").unwrap().as_str(),
            "http://localhost:8080/api/interactions"
        );
    }
}
