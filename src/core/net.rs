// src/core/net.rs
//! Blocking HTTP session against the claims site.
//!
//! One cookie jar per session, so a login carries over to every later
//! request. Cheap to clone; clones share the connection pool and cookies.

use std::time::Duration;

use reqwest::{blocking::Client, Url};
use tracing::{debug, info};

use crate::config::consts::{HTTP_TIMEOUT_SECS, LOGIN_PATH};
use crate::core::html;
use crate::error::ScrapeError;

#[derive(Clone)]
pub struct Session {
    http: Client,
    base: Url,
}

impl Session {
    /// `base` is any URL on the site; relative links resolve against it.
    pub fn new(base: &str) -> Result<Self, ScrapeError> {
        let base = Url::parse(base).map_err(|_| ScrapeError::Url(base.to_string()))?;
        let http = Client::builder()
            .user_agent(format!("ptr_claim/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;
        Ok(Self { http, base })
    }

    /// Absolute form of an `href` found on a page.
    pub fn absolute(&self, href: &str) -> Result<String, ScrapeError> {
        self.base
            .join(href.trim())
            .map(String::from)
            .map_err(|_| ScrapeError::Url(href.to_string()))
    }

    pub fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        let url = self.absolute(url)?;
        debug!(%url, "GET");
        let resp = self.http.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Http { status: status.as_u16(), url });
        }
        Ok(resp.text()?)
    }

    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let url = self.absolute(url)?;
        debug!(%url, "GET (bytes)");
        let resp = self.http.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Http { status: status.as_u16(), url });
        }
        Ok(resp.bytes()?.to_vec())
    }

    /// Submit the Drupal login form. Claimant and reviewer fields are only
    /// rendered for members, so an anonymous scrape leaves them empty.
    pub fn login(&self, name: &str, password: &str) -> Result<(), ScrapeError> {
        let form_url = self.absolute(LOGIN_PATH)?;
        let page = self.get_text(&form_url)?;

        // Drupal rejects the post without the per-render form build id.
        let build_id = hidden_input(&page, "form_build_id").ok_or(ScrapeError::Layout {
            url: form_url.clone(),
            what: "login form (form_build_id)",
        })?;

        let form = [
            ("name", name),
            ("pass", password),
            ("form_build_id", build_id.as_str()),
            ("form_id", "user_login"),
            ("op", "Log in"),
        ];
        let resp = self.http.post(&form_url).form(&form).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Http { status: status.as_u16(), url: form_url });
        }
        let body = resp.text()?;
        if !html::to_lower(&body).contains("/user/logout") {
            return Err(ScrapeError::Login(name.to_string()));
        }
        info!(user = name, "Logged in");
        Ok(())
    }
}

/// Value of `<input type="hidden" name="..." value="...">`.
fn hidden_input(doc: &str, name: &str) -> Option<String> {
    let lc = html::to_lower(doc);
    let mut pos = 0usize;
    while let Some(rel) = lc[pos..].find("<input") {
        let at = pos + rel;
        let open = html::open_tag_at(doc, at)?;
        if html::attr(open, "name").as_deref() == Some(name) {
            return html::attr(open, "value");
        }
        pos = at + "<input".len();
    }
    None
}
