//! The request primitive: build one HTTP request, send it, normalize the outcome.

use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::envelope::{self, Exchange};
use crate::params::Parameters;
use crate::types::CallOutcome;
use crate::utils::filename_from_content_disposition;

use super::StoreClient;

const ACCEPT_JSON: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// HTTP method of a call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    /// Parameters in the query string
    #[default]
    Get,
    /// Parameters in a form-encoded body
    Post,
    /// JSON body replacing a resource
    Put,
    /// Resource removal
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Raw bytes of a binary response
#[derive(Debug)]
pub(crate) struct BinaryResponse {
    pub(crate) bytes: Vec<u8>,
    /// Filename suggested by Content-Disposition
    pub(crate) filename: Option<String>,
}

impl StoreClient {
    /// Issue one call and wait for its outcome
    ///
    /// Without `url` the call goes to `<store endpoint><call>`; pass a URL to reach the edit,
    /// admin or task endpoints. Parameters travel in the query string for `GET`/`DELETE` and as
    /// a form body for `POST`/`PUT`. The outcome's `item_id` is the `id` parameter.
    ///
    /// Every terminal state (success, server error, transport failure, cancellation) settles
    /// the returned future exactly once with a [`CallOutcome`]; nothing is retried.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use labbcat::{Config, Method, Parameters, StoreClient};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = StoreClient::new(Config::new("https://labbcat.example.org/labbcat"))?;
    /// let outcome = client
    ///     .issue("getLayer", &Parameters::new().with("id", "orthography"), None, Method::Get)
    ///     .await;
    /// match outcome.errors {
    ///     None => println!("layer: {:?}", outcome.result),
    ///     Some(errors) => eprintln!("failed: {:?}", errors),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn issue(
        &self,
        call: &str,
        params: &Parameters,
        url: Option<&str>,
        method: Method,
    ) -> CallOutcome {
        let target = match url {
            Some(url) => url.to_string(),
            None => format!("{}{}", self.config.store_url(), call),
        };
        let item_id = params.item_id();
        let query = params.query_string();

        self.diagnostics
            .emit_with(|| format!("{} {:?} {} {}", call, method, target, query));

        let request = match method {
            Method::Get | Method::Delete => {
                self.request(method, &with_query(&target, &query), ACCEPT_JSON)
            }
            Method::Post | Method::Put => self
                .request(method, &target, ACCEPT_JSON)
                .header(CONTENT_TYPE, FORM_URLENCODED)
                .body(query),
        };

        let exchange = self.exchange(request).await;
        envelope::normalize(call, item_id, exchange, &self.diagnostics)
    }

    /// Issue a call whose body is a JSON document
    pub async fn issue_json(
        &self,
        call: &str,
        url: &str,
        method: Method,
        body: &Value,
    ) -> CallOutcome {
        self.diagnostics
            .emit_with(|| format!("{} {:?} {} {}", call, method, url, body));

        let request = self.request(method, url, ACCEPT_JSON).json(body);
        let exchange = self.exchange(request).await;
        envelope::normalize(call, None, exchange, &self.diagnostics)
    }

    /// Issue a multipart upload
    pub(crate) async fn issue_multipart(
        &self,
        call: &str,
        url: &str,
        form: reqwest::multipart::Form,
        item_id: Option<String>,
    ) -> CallOutcome {
        self.diagnostics
            .emit_with(|| format!("{} POST {} (multipart)", call, url));

        let request = self
            .request(Method::Post, url, ACCEPT_JSON)
            .timeout(self.config.http.transfer_timeout)
            .multipart(form);
        let exchange = self.exchange(request).await;
        envelope::normalize(call, item_id, exchange, &self.diagnostics)
    }

    /// Fetch a binary resource
    ///
    /// Sent as `GET` with `Accept: <accept>`, aborted when `cancel` fires. The error string is
    /// ready to report: it names the HTTP failure, relays server error messages, or says
    /// `cancelled`.
    pub(crate) async fn fetch_binary(
        &self,
        call: &str,
        url: &str,
        params: &Parameters,
        accept: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<BinaryResponse, String> {
        let target = with_query(url, &params.query_string());
        self.diagnostics
            .emit_with(|| format!("{} GET {} ({})", call, target, accept));

        let request = self
            .request(Method::Get, &target, accept)
            .timeout(self.config.http.transfer_timeout);
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err("cancelled".to_string()),
            response = request.send() => response,
        };
        let response = response.map_err(|e| format!("failed: {}", describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            // Error responses may still carry an envelope with the server's reasons
            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err("cancelled".to_string()),
                body = response.text() => body,
            }
            .map_err(|e| format!("failed: HTTP {}: {}", status, describe(&e)))?;
            let outcome = envelope::normalize(
                call,
                None,
                Exchange::Completed {
                    status: status.as_u16(),
                    body,
                },
                &self.diagnostics,
            );
            return Err(outcome
                .errors
                .map(|errors| errors.join("; "))
                .unwrap_or_else(|| format!("failed: HTTP {}", status)));
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition);

        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err("cancelled".to_string()),
            bytes = response.bytes() => bytes,
        }
        .map_err(|e| format!("failed: {}", describe(&e)))?;

        Ok(BinaryResponse {
            bytes: bytes.to_vec(),
            filename,
        })
    }

    /// Request builder with auth and accept headers attached
    pub(crate) fn request(&self, method: Method, url: &str, accept: &str) -> reqwest::RequestBuilder {
        let request = self
            .http
            .request(method.as_reqwest(), url)
            .header(ACCEPT, accept);
        match self.config.active_credentials() {
            Some(credentials) => {
                request.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => request,
        }
    }

    /// Send a request, racing it against the token current when it starts
    async fn exchange(&self, request: reqwest::RequestBuilder) -> Exchange {
        let cancel = self.cancellation_token();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Exchange::Cancelled,
            exchange = complete(request) => exchange,
        }
    }
}

async fn complete(request: reqwest::RequestBuilder) -> Exchange {
    match request.send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            match response.text().await {
                Ok(body) => Exchange::Completed { status, body },
                Err(e) => Exchange::Failed(describe(&e)),
            }
        }
        Err(e) => Exchange::Failed(describe(&e)),
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

fn with_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, query)
    } else {
        format!("{}?{}", url, query)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("http://h/a", ""), "http://h/a");
        assert_eq!(with_query("http://h/a", "x=1"), "http://h/a?x=1");
        assert_eq!(with_query("http://h/a?y=2", "x=1"), "http://h/a?y=2&x=1");
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(Method::default(), Method::Get);
        assert_eq!(Method::Post.as_reqwest(), reqwest::Method::POST);
        assert_eq!(Method::Delete.as_reqwest(), reqwest::Method::DELETE);
    }
}
