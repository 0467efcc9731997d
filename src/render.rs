//! Rendering service boundary.
//!
//! Headless rendering is an external collaborator. Both operations are
//! best-effort: every failure comes back as an `Unavailable` outcome carrying
//! the reason, never as an error, and the reconciler substitutes the raw
//! snapshot when the JS render is missing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Output of a JavaScript-executed render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsRender {
    /// Serialized DOM after scripts ran.
    pub html: String,
    /// `innerText` of the body.
    #[serde(default)]
    pub visible_text: String,
    /// Console messages logged at error level.
    #[serde(default)]
    pub console_errors: Vec<String>,
    /// Full-page screenshot reference.
    #[serde(default)]
    pub screenshot: Option<String>,
}

/// Result of a JS render request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Render completed.
    Rendered(JsRender),
    /// Render failed or no renderer is configured.
    Unavailable(String),
}

/// Result of a JS-disabled screenshot request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenshotOutcome {
    /// Screenshot reference.
    Captured(String),
    /// Capture failed or no renderer is configured.
    Unavailable(String),
}

impl ScreenshotOutcome {
    /// Reference when captured.
    #[must_use]
    pub fn reference(self) -> Option<String> {
        match self {
            Self::Captured(reference) => Some(reference),
            Self::Unavailable(_) => None,
        }
    }
}

/// Headless rendering collaborator.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Render `url` with JavaScript enabled.
    async fn render_js(&self, url: &Url) -> RenderOutcome;

    /// Capture a full-page screenshot of `url` with JavaScript disabled.
    async fn screenshot_without_js(&self, url: &Url) -> ScreenshotOutcome;
}

/// Renderer for single-render mode: every request is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRenderer;

#[async_trait]
impl RenderService for DisabledRenderer {
    async fn render_js(&self, _url: &Url) -> RenderOutcome {
        RenderOutcome::Unavailable("no rendering service configured".to_string())
    }

    async fn screenshot_without_js(&self, _url: &Url) -> ScreenshotOutcome {
        ScreenshotOutcome::Unavailable("no rendering service configured".to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    url: &'a str,
    javascript: bool,
    timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ScreenshotResponse {
    screenshot: String,
}

/// Remote rendering service reached over HTTP.
///
/// `POST {endpoint}/render` answers a [`JsRender`] JSON body;
/// `POST {endpoint}/screenshot` answers `{"screenshot": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpRenderService {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpRenderService {
    /// Create a service client for `endpoint` with a per-request timeout.
    #[must_use]
    pub fn new(client: Client, endpoint: Url, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    fn route(&self, name: &str) -> Result<Url, String> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{name}")).map_err(|e| format!("invalid render endpoint: {e}"))
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        route: &str,
        url: &Url,
        javascript: bool,
    ) -> Result<T, String> {
        let body = RenderRequest {
            url: url.as_str(),
            javascript,
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        };
        let response = self
            .client
            .post(self.route(route)?)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("render service returned {}", response.status().as_u16()));
        }
        response.json::<T>().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl RenderService for HttpRenderService {
    async fn render_js(&self, url: &Url) -> RenderOutcome {
        match self.post::<JsRender>("render", url, true).await {
            Ok(render) => RenderOutcome::Rendered(render),
            Err(reason) => {
                debug!(url = %url, reason = %reason, "JS render failed");
                RenderOutcome::Unavailable(reason)
            }
        }
    }

    async fn screenshot_without_js(&self, url: &Url) -> ScreenshotOutcome {
        match self.post::<ScreenshotResponse>("screenshot", url, false).await {
            Ok(shot) => ScreenshotOutcome::Captured(shot.screenshot),
            Err(reason) => {
                debug!(url = %url, reason = %reason, "no-JS screenshot failed");
                ScreenshotOutcome::Unavailable(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn target() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[tokio::test]
    async fn disabled_renderer_is_always_unavailable() {
        let renderer = DisabledRenderer;
        assert!(matches!(renderer.render_js(&target()).await, RenderOutcome::Unavailable(_)));
        assert_eq!(renderer.screenshot_without_js(&target()).await.reference(), None);
    }

    #[tokio::test]
    async fn http_service_decodes_render() {
        let server = MockServer::start();
        let render = server.mock(|when, then| {
            when.method(POST)
                .path("/render")
                .json_body_partial(r#"{"url":"https://example.com/page","javascript":true}"#);
            then.status(200).json_body(serde_json::json!({
                "html": "<html><body><h1>Hi</h1></body></html>",
                "visibleText": "Hi",
                "consoleErrors": ["TypeError: x is undefined"],
                "screenshot": "shots/js.png"
            }));
        });

        let endpoint = Url::parse(&server.base_url()).unwrap();
        let service = HttpRenderService::new(Client::new(), endpoint, Duration::from_secs(5));
        let RenderOutcome::Rendered(out) = service.render_js(&target()).await else {
            panic!("expected a render");
        };
        render.assert();
        assert_eq!(out.console_errors, vec!["TypeError: x is undefined"]);
        assert_eq!(out.screenshot.as_deref(), Some("shots/js.png"));
    }

    #[tokio::test]
    async fn http_service_failure_is_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/screenshot");
            then.status(502);
        });
        server.mock(|when, then| {
            when.method(POST).path("/render");
            then.status(200).body("not json");
        });

        let endpoint = Url::parse(&server.base_url()).unwrap();
        let service = HttpRenderService::new(Client::new(), endpoint, Duration::from_secs(5));
        assert!(matches!(
            service.screenshot_without_js(&target()).await,
            ScreenshotOutcome::Unavailable(reason) if reason.contains("502")
        ));
        assert!(matches!(service.render_js(&target()).await, RenderOutcome::Unavailable(_)));
    }
}
