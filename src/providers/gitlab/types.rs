use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// A GitLab release as returned by `GET /projects/:id/releases`.
///
/// Only the fields the report needs are decoded; everything else in the
/// payload is ignored.
#[derive(Debug, Deserialize)]
pub struct GitLabRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub commit: Option<GitLabCommit>,
    #[serde(rename = "_links", default)]
    pub links: Option<GitLabReleaseLinks>,
}

#[derive(Debug, Deserialize)]
pub struct GitLabCommit {
    pub short_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GitLabReleaseLinks {
    #[serde(rename = "self")]
    pub self_: Option<String>,
}

/// A release of one project, flattened from the API payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    /// Git tag the release points at (e.g., "v1.4.0")
    pub tag_name: String,
    /// Display name, empty when the release has none
    pub name: String,
    /// Creation time in the offset GitLab recorded it with
    pub created_at: DateTime<FixedOffset>,
    /// Abbreviated SHA of the tagged commit
    pub commit_short_id: String,
    /// Free-text release notes (markdown)
    pub description: String,
    /// Web URL of the release page
    pub self_link: String,
}

impl From<GitLabRelease> for Release {
    fn from(release: GitLabRelease) -> Self {
        Self {
            tag_name: release.tag_name,
            name: release.name.unwrap_or_default(),
            created_at: release.created_at,
            commit_short_id: release.commit.map(|c| c.short_id).unwrap_or_default(),
            description: release.description.unwrap_or_default(),
            self_link: release.links.and_then(|l| l.self_).unwrap_or_default(),
        }
    }
}

/// One response of the paginated releases endpoint.
#[derive(Debug)]
pub struct ReleasePage {
    pub releases: Vec<Release>,
    /// Value of `X-Next-Page`; `None` on the last page
    pub next_page: Option<usize>,
}
