// src/checker/http.rs
// =============================================================================
// This module checks if a single URL is alive by making an HTTP request.
//
// Key functionality:
// - Makes an HTTP HEAD request (lightweight, no body download)
// - Falls back to GET if the server answers HEAD with an error status
// - Sorts the outcome into Active / Down / Unknown
//
// Redirects are NOT followed: a 3xx answer already tells us the host is up.
// =============================================================================

use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use super::pool::Probe;
use super::{CheckError, CheckerConfig, LinkState, ProbeMethod, StatusResult};

/// Probes URLs over HTTP(S) with a shared, connection-pooling client
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    method: ProbeMethod,
    get_fallback: bool,
}

impl HttpProbe {
    /// Builds the HTTP client described by `config`
    pub fn new(config: &CheckerConfig) -> Result<Self, CheckError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(!config.verify_tls)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            method: config.method,
            get_fallback: config.get_fallback,
        })
    }

    fn request(&self, method: ProbeMethod, url: &str) -> RequestBuilder {
        match method {
            ProbeMethod::Head => self.client.head(url),
            ProbeMethod::Get => self.client.get(url),
        }
    }

    // One probe: the first request, an optional GET retry if HEAD was
    // refused, then classification. Never returns an error.
    async fn probe_url(&self, url: &str) -> StatusResult {
        let started = Instant::now();
        let first = self.request(self.method, url).send().await;

        let outcome = match first {
            Ok(response)
                if self.method == ProbeMethod::Head
                    && self.get_fallback
                    && rejects_head(response.status()) =>
            {
                log::debug!("{} rejected HEAD ({}), retrying with GET", url, response.status());
                self.request(ProbeMethod::Get, url).send().await
            }
            other => other,
        };

        let elapsed = started.elapsed();
        match outcome {
            Ok(response) => classify_response(&response, elapsed),
            Err(e) => {
                log::debug!("probe of {} failed: {}", url, e);
                classify_error(&e, elapsed)
            }
        }
    }
}

impl Probe for HttpProbe {
    fn probe<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StatusResult> {
        self.probe_url(url).boxed()
    }
}

// Plenty of servers and CDNs answer HEAD with 400/403/404/405/501 while
// serving GET fine, so any error status gets a second look with GET
fn rejects_head(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

fn classify_response(response: &Response, elapsed: Duration) -> StatusResult {
    classify_status(response.status(), elapsed)
}

// HTTP status codes:
// - 200-299: Success      -> Active
// - 300-399: Redirect     -> Active (the host answered)
// - 400-599: Client/server error -> Down
pub(crate) fn classify_status(status: StatusCode, elapsed: Duration) -> StatusResult {
    let state = if status.is_success() || status.is_redirection() {
        LinkState::Active
    } else {
        LinkState::Down
    };
    StatusResult::new(state, Some(status.as_u16()), Some(elapsed))
}

// A timeout is inconclusive; anything else (refused, DNS, TLS, reset) is Down
fn classify_error(error: &reqwest::Error, elapsed: Duration) -> StatusResult {
    let state = if error.is_timeout() {
        LinkState::Unknown
    } else {
        LinkState::Down
    };
    StatusResult::new(state, error.status().map(|s| s.as_u16()), Some(elapsed))
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why return a BoxFuture from the Probe trait?
//    - Traits can't easily name the type of an async fn's future
//    - Boxing it gives every implementation the same return type, so the pool
//      can work with HttpProbe in production and a fake probe in tests
//
// 2. Why one shared Client?
//    - Client keeps a connection pool internally
//    - Building it once means bookmarks on the same host reuse connections
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // How the local test server answers
    #[derive(Debug, Clone, Copy)]
    enum Reply {
        Status(u16),
        /// 405 for HEAD, 200 for anything else
        NoHead,
        /// 403 for HEAD, 200 for anything else (bot filters, CDNs)
        ForbidHead,
        /// 404 for HEAD, 500 for anything else
        HeadMissingGetBroken,
        /// Accept the connection and never answer
        Silent,
    }

    // Starts a tiny HTTP/1.1 server on localhost and returns its base URL
    async fn serve(reply: Reply) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();

                    let status = match reply {
                        Reply::Status(code) => code,
                        Reply::NoHead if request.starts_with("HEAD") => 405,
                        Reply::NoHead => 200,
                        Reply::ForbidHead if request.starts_with("HEAD") => 403,
                        Reply::ForbidHead => 200,
                        Reply::HeadMissingGetBroken if request.starts_with("HEAD") => 404,
                        Reply::HeadMissingGetBroken => 500,
                        Reply::Silent => {
                            tokio::time::sleep(Duration::from_secs(30)).await;
                            return;
                        }
                    };

                    let response = format!(
                        "HTTP/1.1 {} Test\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                        status
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}/", addr)
    }

    fn probe_with(config: CheckerConfig) -> HttpProbe {
        HttpProbe::new(&config).unwrap()
    }

    fn quick_config() -> CheckerConfig {
        CheckerConfig {
            timeout: Duration::from_millis(500),
            ..CheckerConfig::default()
        }
    }

    #[rstest]
    #[case(200, LinkState::Active)]
    #[case(204, LinkState::Active)]
    #[case(301, LinkState::Active)]
    #[case(404, LinkState::Down)]
    #[case(410, LinkState::Down)]
    #[case(503, LinkState::Down)]
    #[tokio::test]
    async fn test_status_codes_are_classified(#[case] code: u16, #[case] expected: LinkState) {
        let url = serve(Reply::Status(code)).await;
        let result = probe_with(quick_config()).probe(&url).await;
        assert_eq!(result.state, expected);
        assert_eq!(result.code, Some(code));
        assert!(result.elapsed.is_some());
    }

    #[tokio::test]
    async fn test_head_rejection_falls_back_to_get() {
        let url = serve(Reply::NoHead).await;
        let result = probe_with(quick_config()).probe(&url).await;
        assert_eq!(result.state, LinkState::Active);
        assert_eq!(result.code, Some(200));
    }

    #[tokio::test]
    async fn test_forbidden_head_falls_back_to_get() {
        let url = serve(Reply::ForbidHead).await;
        let result = probe_with(quick_config()).probe(&url).await;
        assert_eq!(result.state, LinkState::Active);
        assert_eq!(result.code, Some(200));
    }

    #[tokio::test]
    async fn test_fallback_classifies_on_the_get_answer() {
        let url = serve(Reply::HeadMissingGetBroken).await;
        let result = probe_with(quick_config()).probe(&url).await;
        assert_eq!(result.state, LinkState::Down);
        assert_eq!(result.code, Some(500));
    }

    #[tokio::test]
    async fn test_forbidden_head_without_fallback_is_down() {
        let url = serve(Reply::ForbidHead).await;
        let config = CheckerConfig {
            get_fallback: false,
            ..quick_config()
        };
        let result = probe_with(config).probe(&url).await;
        assert_eq!(result.state, LinkState::Down);
        assert_eq!(result.code, Some(403));
    }

    #[tokio::test]
    async fn test_head_rejection_without_fallback_is_down() {
        let url = serve(Reply::NoHead).await;
        let config = CheckerConfig {
            get_fallback: false,
            ..quick_config()
        };
        let result = probe_with(config).probe(&url).await;
        assert_eq!(result.state, LinkState::Down);
        assert_eq!(result.code, Some(405));
    }

    #[tokio::test]
    async fn test_get_method_skips_head() {
        let url = serve(Reply::NoHead).await;
        let config = CheckerConfig {
            method: ProbeMethod::Get,
            get_fallback: false,
            ..quick_config()
        };
        let result = probe_with(config).probe(&url).await;
        assert_eq!(result.code, Some(200));
    }

    #[tokio::test]
    async fn test_silent_server_times_out_as_unknown() {
        let url = serve(Reply::Silent).await;
        let config = CheckerConfig {
            timeout: Duration::from_millis(200),
            ..CheckerConfig::default()
        };
        let result = probe_with(config).probe(&url).await;
        assert_eq!(result.state, LinkState::Unknown);
        assert_eq!(result.code, None);
    }

    #[tokio::test]
    async fn test_refused_connection_is_down() {
        // Grab a free port, then close it again so nothing is listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/", port);
        let result = probe_with(quick_config()).probe(&url).await;
        assert_eq!(result.state, LinkState::Down);
        assert_eq!(result.code, None);
    }

    #[test]
    fn test_rejects_head() {
        assert!(rejects_head(StatusCode::METHOD_NOT_ALLOWED));
        assert!(rejects_head(StatusCode::NOT_IMPLEMENTED));
        assert!(rejects_head(StatusCode::FORBIDDEN));
        assert!(rejects_head(StatusCode::BAD_REQUEST));
        assert!(rejects_head(StatusCode::NOT_FOUND));
        assert!(!rejects_head(StatusCode::OK));
        assert!(!rejects_head(StatusCode::MOVED_PERMANENTLY));
    }

    #[test]
    fn test_invalid_config_fails_to_build() {
        let config = CheckerConfig {
            concurrency: 0,
            ..CheckerConfig::default()
        };
        assert!(matches!(HttpProbe::new(&config), Err(CheckError::InvalidConcurrency)));
    }
}
