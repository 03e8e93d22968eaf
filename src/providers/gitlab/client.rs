use reqwest::Client;
use url::Url;

use crate::auth::Token;
use crate::error::{RelReportError, Result};

/// GitLab caps `per_page` at 100 for every list endpoint.
const MAX_PAGE_SIZE_LIMIT: usize = 100;

pub struct GitLabClient {
    client: Client,
    api_url: Url,
    token: Token,
    max_page_size: usize,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: Token, max_page_size: usize) -> Result<Self> {
        if max_page_size == 0 || max_page_size > MAX_PAGE_SIZE_LIMIT {
            return Err(RelReportError::Config(format!(
                "per-page must be between 1 and {MAX_PAGE_SIZE_LIMIT}, got {max_page_size}"
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("relreport/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelReportError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| RelReportError::Config(format!("Invalid base URL: {e}")))?
            .join("api/v4/")
            .map_err(|e| RelReportError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
            max_page_size,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    pub fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.token.as_str())
    }

    /// Construct the releases endpoint for a project.
    ///
    /// The id is pushed as a single path segment, so `group/project` paths are
    /// percent-encoded the way GitLab expects (`group%2Fproject`).
    pub fn releases_url(&self, project_id: &str) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| RelReportError::Config(format!("Invalid API base URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(["projects", project_id, "releases"]);
        Ok(url)
    }
}
