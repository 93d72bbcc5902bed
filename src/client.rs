use std::collections::HashSet;

use reqwest::{Client, StatusCode, header};

use crate::config::{ReaperConfig, RepositoryRef};
use crate::error::{ReaperError, Result};
use crate::token::BearerToken;
use crate::types::{LoginRequest, LoginResponse, TagPage, TagRecord};

const PAGE_SIZE: u32 = 100;
const MAX_PAGES: usize = 1000;
const USER_AGENT: &str = concat!("tag-reaper/", env!("CARGO_PKG_VERSION"));

/// Thin client over the registry's REST API
pub struct RegistryClient {
    http_client: Client,
    api_url: String,
    repository: RepositoryRef,
}

impl RegistryClient {
    pub fn new(config: &ReaperConfig) -> Result<Self> {
        let mut http_builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            http_builder = http_builder.timeout(timeout);
        }

        Ok(Self {
            http_client: http_builder.build()?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            repository: config.repository.clone(),
        })
    }

    pub fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    fn tags_url(&self) -> String {
        format!(
            "{}/repositories/{}/{}/tags/",
            self.api_url, self.repository.namespace, self.repository.name
        )
    }

    fn tag_url(&self, tag: &str) -> String {
        format!("{}{}/", self.tags_url(), tag)
    }

    /// Exchange a username/password pair for a bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<BearerToken> {
        let response = self
            .http_client
            .post(format!("{}/users/login", self.api_url))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ReaperError::Auth { status, body });
        }

        let login: LoginResponse = response.json().await?;
        Ok(BearerToken::new(login.token))
    }

    /// Fetch every tag of the repository, following `next` links until the
    /// last page. A `next` outside the API base, a repeated page or more than
    /// `MAX_PAGES` pages aborts the listing.
    pub async fn list_tags(&self, token: &BearerToken) -> Result<Vec<TagRecord>> {
        let mut tags = Vec::new();
        let first = self.first_page_url();
        let mut page = self.fetch_page(&first, token).await?;
        let mut visited = HashSet::from([first]);

        loop {
            tags.append(&mut page.results);
            let Some(next) = page.next.take() else {
                break;
            };

            if !next.starts_with(&format!("{}/", self.api_url)) {
                return Err(ReaperError::Pagination(format!(
                    "next page {} is outside {}",
                    next, self.api_url
                )));
            }
            if visited.len() >= MAX_PAGES {
                return Err(ReaperError::Pagination(format!(
                    "more than {} pages",
                    MAX_PAGES
                )));
            }
            if !visited.insert(next.clone()) {
                return Err(ReaperError::Pagination(format!(
                    "next page {} was already fetched",
                    next
                )));
            }

            page = self.fetch_page(&next, token).await?;
        }

        Ok(tags)
    }

    fn first_page_url(&self) -> String {
        format!("{}?page_size={}", self.tags_url(), PAGE_SIZE)
    }

    async fn fetch_page(&self, url: &str, token: &BearerToken) -> Result<TagPage> {
        tracing::debug!("GET {}", url);
        let response = self
            .http_client
            .get(url)
            .header(header::AUTHORIZATION, token.header_value())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ReaperError::List { status, body });
        }

        serde_json::from_str(&body).map_err(|e| ReaperError::List {
            status,
            body: format!("unreadable tag listing: {}", e),
        })
    }

    /// Delete one tag. Only `200 < status < 300` counts as deleted; a plain
    /// 200 is reported as a failure.
    pub async fn delete_tag(&self, tag: &str, token: &BearerToken) -> Result<StatusCode> {
        let response = self
            .http_client
            .delete(self.tag_url(tag))
            .header(header::AUTHORIZATION, token.header_value())
            .send()
            .await?;

        let status = response.status();
        if is_delete_success(status) {
            Ok(status)
        } else {
            Err(ReaperError::Delete {
                tag: tag.to_string(),
                status,
            })
        }
    }
}

pub fn is_delete_success(status: StatusCode) -> bool {
    let code = status.as_u16();
    code > 200 && code < 300
}
