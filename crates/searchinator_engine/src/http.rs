use std::time::Duration;

use engine_logging::{engine_debug, engine_trace, engine_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Selector};
use url::Url;

use crate::decode::decode_page;
use crate::render::{BackendLauncher, RenderBackend, RenderSession};
use crate::{LaunchMode, RenderError, RenderErrorKind};

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 10,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Rendering backend that loads pages over plain HTTP and evaluates selectors
/// against the served HTML. Nothing is executed, so content a search engine
/// injects with script is not seen.
#[derive(Debug, Clone, Default)]
pub struct HttpLauncher {
    settings: HttpSettings,
}

impl HttpLauncher {
    pub fn new(settings: HttpSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl BackendLauncher for HttpLauncher {
    async fn launch(&self, mode: LaunchMode) -> Result<Box<dyn RenderBackend>, RenderError> {
        if mode == LaunchMode::Visible {
            engine_warn!("HTTP backend cannot render visibly; continuing headless");
        }
        // Fails early if the TLS stack cannot be initialised.
        reqwest::Client::builder()
            .build()
            .map_err(|err| RenderError::new(RenderErrorKind::Launch, err.to_string()))?;
        Ok(Box::new(HttpBackend {
            settings: self.settings.clone(),
        }))
    }
}

#[derive(Debug)]
struct HttpBackend {
    settings: HttpSettings,
}

#[async_trait::async_trait]
impl RenderBackend for HttpBackend {
    async fn open_session(&self, identity: &str) -> Result<Box<dyn RenderSession>, RenderError> {
        // A client per session keeps cookie jars apart.
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(identity)
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.settings.redirect_limit))
            .build()
            .map_err(|err| RenderError::new(RenderErrorKind::Session, err.to_string()))?;
        Ok(Box::new(HttpSession {
            client,
            max_bytes: self.settings.max_bytes,
            page: None,
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        Ok(())
    }
}

struct LoadedPage {
    final_url: Url,
    html: String,
}

struct HttpSession {
    client: reqwest::Client,
    max_bytes: u64,
    page: Option<LoadedPage>,
}

impl HttpSession {
    fn loaded(&self) -> Result<&LoadedPage, RenderError> {
        self.page
            .as_ref()
            .ok_or_else(|| RenderError::new(RenderErrorKind::Session, "no page loaded"))
    }

    fn too_large(&self, actual: u64) -> RenderError {
        RenderError::new(
            RenderErrorKind::TooLarge {
                max_bytes: self.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl RenderSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.page = None;
        let parsed = Url::parse(url)
            .map_err(|err| RenderError::new(RenderErrorKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::new(
                RenderErrorKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        engine_trace!("Loaded {} bytes from {}", bytes.len(), final_url);

        let html = decode_page(&bytes, content_type.as_deref())?;
        self.page = Some(LoadedPage { final_url, html });
        Ok(())
    }

    async fn wait_for_marker(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        // A served document never changes, so the marker is either there or not.
        let page = self.loaded()?;
        if matches_any(&page.html, selector)? {
            Ok(())
        } else {
            Err(RenderError::new(
                RenderErrorKind::Timeout,
                format!("{selector:?} not present within {timeout:?}"),
            ))
        }
    }

    async fn extract_links(&mut self, selector: &str) -> Result<Vec<String>, RenderError> {
        let page = self.loaded()?;
        select_links(&page.html, &page.final_url, selector)
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.page = None;
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, RenderError> {
    Selector::parse(selector).map_err(|err| {
        RenderError::new(RenderErrorKind::Selector, format!("{selector:?}: {err:?}"))
    })
}

fn matches_any(html: &str, selector: &str) -> Result<bool, RenderError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let found = document.select(&selector).next().is_some();
    Ok(found)
}

/// Absolute `href` targets of the matching elements, like a browser's
/// `element.href`. Elements without a resolvable `href` are skipped.
fn select_links(html: &str, base: &Url, selector: &str) -> Result<Vec<String>, RenderError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let links = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| match base.join(href.trim()) {
            Ok(url) => Some(unwrap_redirect(url)),
            Err(err) => {
                engine_debug!("Skipping unresolvable href {:?}: {}", href, err);
                None
            }
        })
        .collect();
    Ok(links)
}

/// DuckDuckGo wraps result targets as `//duckduckgo.com/l/?uddg=<target>`.
fn unwrap_redirect(url: Url) -> String {
    let is_redirect = url
        .host_str()
        .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
        && url.path().starts_with("/l/");
    if is_redirect {
        if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
            return target.into_owned();
        }
    }
    url.to_string()
}

fn map_reqwest_error(err: reqwest::Error) -> RenderError {
    if err.is_timeout() {
        return RenderError::new(RenderErrorKind::Timeout, err.to_string());
    }
    RenderError::new(RenderErrorKind::Network, err.to_string())
}
