//! Content Management API client.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{Collection, EntrySource};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{ContentType, Entry};

/// Management API root.
pub const DEFAULT_BASE_URL: &str = "https://api.contentful.com";

/// Ids per `sys.id[in]` query.
pub const ENTRY_CHUNK_SIZE: usize = 10;

/// Page size for content type listing (the API maximum).
const PAGE_LIMIT: usize = 1000;

/// Request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bytes left unescaped in a URL path segment (RFC 3986 unreserved).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const USER_AGENT: &str = concat!("ctfexport/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    #[serde(default)]
    first_name: String,
}

#[derive(Debug, Deserialize)]
struct Locale {
    code: String,
    #[serde(default)]
    default: bool,
}

/// Blocking client for one space environment.
pub struct ContentfulClient {
    http: Client,
    base_url: String,
    token: String,
    space_id: String,
    env_id: String,
}

impl ContentfulClient {
    /// Create a client for a space environment.
    pub fn new(
        token: impl Into<String>,
        space_id: impl Into<String>,
        env_id: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            space_id: space_id.into(),
            env_id: env_id.into(),
        })
    }

    /// Create a client from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(&config.cma_token, &config.space_id, config.env_id())
    }

    /// Point the client at another API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Check the token by fetching the current user; returns their first name.
    pub fn verify_token(&self) -> Result<String> {
        let url = format!("{}/users/me", self.base_url);
        let user: User = self.get_required(&url, &[])?;
        Ok(user.first_name)
    }

    fn env_url(&self, path: &str) -> String {
        format!(
            "{}/spaces/{}/environments/{}/{}",
            self.base_url, self.space_id, self.env_id, path
        )
    }

    /// URL of a single entry; the id is escaped as one path segment.
    fn entry_url(&self, id: &str) -> String {
        self.env_url(&format!("entries/{}", utf8_percent_encode(id, PATH_SEGMENT)))
    }

    /// GET a JSON document; `Ok(None)` on 404.
    fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<Option<T>> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or_default().to_string();
            let message = response
                .text()
                .ok()
                .filter(|body| !body.is_empty())
                .unwrap_or(reason);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Some(response.json()?))
    }

    fn get_required<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        self.get(url, query)?.ok_or_else(|| Error::Api {
            status: StatusCode::NOT_FOUND.as_u16(),
            message: format!("{} not found", url),
        })
    }
}

impl EntrySource for ContentfulClient {
    fn entry(&self, id: &str) -> Result<Option<Entry>> {
        self.get(&self.entry_url(id), &[])
    }

    fn entries(&self, ids: &[String]) -> Result<Vec<Entry>> {
        let url = self.env_url("entries");
        let mut entries = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(ENTRY_CHUNK_SIZE) {
            let query = [
                ("sys.id[in]", chunk.join(",")),
                ("limit", chunk.len().to_string()),
            ];
            let page: Collection<Entry> = self.get_required(&url, &query)?;
            entries.extend(page.items);
        }
        Ok(entries)
    }

    fn content_types(&self) -> Result<Vec<ContentType>> {
        let url = self.env_url("content_types");
        let mut content_types = Vec::new();
        loop {
            let query = [
                ("limit", PAGE_LIMIT.to_string()),
                ("skip", content_types.len().to_string()),
            ];
            let page: Collection<ContentType> = self.get_required(&url, &query)?;
            let fetched = page.items.len();
            content_types.extend(page.items);
            if fetched == 0 || content_types.len() >= page.total {
                break;
            }
        }
        Ok(content_types)
    }

    fn locales(&self) -> Result<Vec<String>> {
        let page: Collection<Locale> = self.get_required(&self.env_url("locales"), &[])?;
        let mut locales = page.items;
        locales.sort_by_key(|l| !l.default);
        Ok(locales.into_iter().map(|l| l.code).collect())
    }
}
