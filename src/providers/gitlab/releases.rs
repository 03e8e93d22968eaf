use log::debug;
use reqwest::header::HeaderMap;

use super::client::GitLabClient;
use super::types::{GitLabRelease, Release, ReleasePage};
use crate::error::{RelReportError, Result};

const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Page number and size of the next releases request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct PageWindow {
    pub page: usize,
    pub per_page: usize,
}

impl PageWindow {
    pub fn first(limit: usize, max_page_size: usize) -> Self {
        Self {
            page: 1,
            per_page: limit.min(max_page_size),
        }
    }

    /// Window for the request after a page that reported `next_page`.
    ///
    /// When fewer than a full page of releases is still needed, the page size
    /// is shrunk to the remainder. GitLab computes the offset as
    /// `(page - 1) * per_page`, so the shrunk window is only valid when the
    /// releases fetched so far line up with it; otherwise the current size is
    /// kept and the caller truncates the surplus.
    pub fn advance(self, next_page: usize, fetched: usize, limit: usize) -> Self {
        let remaining = limit.saturating_sub(fetched);
        let aligned = next_page
            .saturating_sub(1)
            .checked_mul(self.per_page)
            .is_some_and(|offset| offset == fetched);

        if remaining > 0 && remaining < self.per_page && aligned && fetched % remaining == 0 {
            Self {
                page: fetched / remaining + 1,
                per_page: remaining,
            }
        } else {
            Self {
                page: next_page,
                per_page: self.per_page,
            }
        }
    }
}

impl GitLabClient {
    /// Fetch up to `limit` releases of a project, newest first.
    ///
    /// No request is made when `limit` is zero.
    pub async fn fetch_releases(&self, project_id: &str, limit: usize) -> Result<Vec<Release>> {
        let mut releases = Vec::new();
        if limit == 0 {
            return Ok(releases);
        }

        let mut window = PageWindow::first(limit, self.max_page_size());

        loop {
            let page = self.fetch_release_page(project_id, window).await?;
            releases.extend(page.releases);

            let Some(next_page) = page.next_page else {
                break;
            };
            if releases.len() >= limit {
                break;
            }
            if next_page <= window.page {
                return Err(RelReportError::Pagination {
                    header: NEXT_PAGE_HEADER,
                    value: next_page.to_string(),
                });
            }

            window = window.advance(next_page, releases.len(), limit);
        }

        releases.truncate(limit);

        debug!("Fetched {} releases for project {project_id}", releases.len());

        Ok(releases)
    }

    async fn fetch_release_page(&self, project_id: &str, window: PageWindow) -> Result<ReleasePage> {
        let url = self.releases_url(project_id)?;

        debug!(
            "GET {url} page={} per_page={}",
            window.page, window.per_page
        );

        let request = self.auth_request(
            self.client()
                .get(url)
                .query(&[("page", window.page), ("per_page", window.per_page)]),
        );

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(RelReportError::ApiError {
                project: project_id.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let next_page = parse_next_page(response.headers())?;
        let releases: Vec<GitLabRelease> = response.json().await?;

        Ok(ReleasePage {
            releases: releases.into_iter().map(Release::from).collect(),
            next_page,
        })
    }
}

fn parse_next_page(headers: &HeaderMap) -> Result<Option<usize>> {
    let Some(value) = headers.get(NEXT_PAGE_HEADER) else {
        return Ok(None);
    };

    let invalid = || RelReportError::Pagination {
        header: NEXT_PAGE_HEADER,
        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
    };

    let value = value.to_str().map_err(|_| invalid())?.trim();
    if value.is_empty() {
        return Ok(None);
    }

    value.parse().map(Some).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Token;
    use mockito::{Matcher, Server, ServerGuard};
    use reqwest::header::HeaderValue;

    const RELEASES_PATH: &str = "/api/v4/projects/123456/releases";

    fn release_json(index: usize) -> serde_json::Value {
        serde_json::json!({
            "tag_name": format!("v1.0.{index}"),
            "name": format!("Release {index}"),
            "created_at": "2024-03-05T14:07:00.000+01:00",
            "description": format!("Fixes FN-{index}"),
            "commit": { "short_id": format!("c{index:06}") },
            "_links": { "self": format!("https://gitlab.com/group/app/-/releases/v1.0.{index}") }
        })
    }

    fn page_body(range: std::ops::Range<usize>) -> String {
        serde_json::Value::Array(range.map(release_json).collect()).to_string()
    }

    fn page_query(page: usize, per_page: usize) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), page.to_string()),
            Matcher::UrlEncoded("per_page".into(), per_page.to_string()),
        ])
    }

    fn client_for(server: &ServerGuard) -> GitLabClient {
        GitLabClient::new(&server.url(), Token::from("test-token"), 10).unwrap()
    }

    #[test]
    fn test_first_window_caps_page_size() {
        assert_eq!(PageWindow::first(3, 10), PageWindow { page: 1, per_page: 3 });
        assert_eq!(PageWindow::first(25, 10), PageWindow { page: 1, per_page: 10 });
    }

    #[test]
    fn test_advance_keeps_full_pages() {
        let window = PageWindow::first(30, 10).advance(2, 10, 30);
        assert_eq!(window, PageWindow { page: 2, per_page: 10 });
    }

    #[test]
    fn test_advance_shrinks_to_remainder_when_aligned() {
        // 10 fetched, 5 remaining: page 3 of size 5 covers releases 10..15
        let window = PageWindow::first(15, 10).advance(2, 10, 15);
        assert_eq!(window, PageWindow { page: 3, per_page: 5 });
    }

    #[test]
    fn test_advance_keeps_size_when_remainder_does_not_align() {
        // 10 fetched, 3 remaining: no page of size 3 starts at offset 10
        let window = PageWindow::first(13, 10).advance(2, 10, 13);
        assert_eq!(window, PageWindow { page: 2, per_page: 10 });
    }

    #[test]
    fn test_advance_ignores_short_pages() {
        // The first page came back short, so offsets no longer line up
        let window = PageWindow::first(8, 10).advance(2, 5, 8);
        assert_eq!(window, PageWindow { page: 2, per_page: 8 });

        let window = PageWindow::first(20, 10).advance(2, 5, 8);
        assert_eq!(window, PageWindow { page: 2, per_page: 10 });
    }

    #[test]
    fn test_advance_with_huge_next_page_keeps_size() {
        let window = PageWindow::first(15, 10).advance(usize::MAX, 10, 15);
        assert_eq!(window, PageWindow { page: usize::MAX, per_page: 10 });
    }

    #[test]
    fn test_parse_next_page() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_next_page(&headers).unwrap(), None);

        headers.insert(NEXT_PAGE_HEADER, HeaderValue::from_static(""));
        assert_eq!(parse_next_page(&headers).unwrap(), None);

        headers.insert(NEXT_PAGE_HEADER, HeaderValue::from_static("4"));
        assert_eq!(parse_next_page(&headers).unwrap(), Some(4));

        headers.insert(NEXT_PAGE_HEADER, HeaderValue::from_static("four"));
        assert!(matches!(
            parse_next_page(&headers),
            Err(RelReportError::Pagination { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_three_of_many_uses_single_shrunk_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", RELEASES_PATH)
            .match_query(page_query(1, 3))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-next-page", "2")
            .with_body(page_body(0..3))
            .expect(1)
            .create_async()
            .await;

        let releases = client_for(&server)
            .fetch_releases("123456", 3)
            .await
            .unwrap();

        assert_eq!(releases.len(), 3);
        assert_eq!(releases[0].tag_name, "v1.0.0");
        assert_eq!(releases[2].commit_short_id, "c000002");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_paginates_and_shrinks_last_page() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", RELEASES_PATH)
            .match_query(page_query(1, 10))
            .with_status(200)
            .with_header("x-next-page", "2")
            .with_body(page_body(0..10))
            .expect(1)
            .create_async()
            .await;
        let last = server
            .mock("GET", RELEASES_PATH)
            .match_query(page_query(3, 5))
            .with_status(200)
            .with_header("x-next-page", "4")
            .with_body(page_body(10..15))
            .expect(1)
            .create_async()
            .await;

        let releases = client_for(&server)
            .fetch_releases("123456", 15)
            .await
            .unwrap();

        assert_eq!(releases.len(), 15);
        assert_eq!(releases[14].tag_name, "v1.0.14");
        first.assert_async().await;
        last.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_truncates_unaligned_remainder() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", RELEASES_PATH)
            .match_query(page_query(1, 10))
            .with_status(200)
            .with_header("x-next-page", "2")
            .with_body(page_body(0..10))
            .create_async()
            .await;
        server
            .mock("GET", RELEASES_PATH)
            .match_query(page_query(2, 10))
            .with_status(200)
            .with_header("x-next-page", "3")
            .with_body(page_body(10..20))
            .create_async()
            .await;

        let releases = client_for(&server)
            .fetch_releases("123456", 13)
            .await
            .unwrap();

        assert_eq!(releases.len(), 13);
        assert_eq!(releases[12].tag_name, "v1.0.12");
    }

    #[tokio::test]
    async fn test_fetch_huge_next_page_header_does_not_panic() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", RELEASES_PATH)
            .match_query(page_query(1, 10))
            .with_status(200)
            .with_header("x-next-page", &usize::MAX.to_string())
            .with_body(page_body(0..10))
            .create_async()
            .await;
        server
            .mock("GET", RELEASES_PATH)
            .match_query(page_query(usize::MAX, 10))
            .with_status(200)
            .with_header("x-next-page", "")
            .with_body("[]")
            .create_async()
            .await;

        let releases = client_for(&server)
            .fetch_releases("123456", 15)
            .await
            .unwrap();

        assert_eq!(releases.len(), 10);
    }

    #[tokio::test]
    async fn test_fetch_rejects_next_page_that_does_not_advance() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", RELEASES_PATH)
            .match_query(page_query(1, 10))
            .with_status(200)
            .with_header("x-next-page", "1")
            .with_body(page_body(0..10))
            .expect(1)
            .create_async()
            .await;

        let error = client_for(&server)
            .fetch_releases("123456", 30)
            .await
            .unwrap_err();

        assert!(matches!(error, RelReportError::Pagination { .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_stops_on_last_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", RELEASES_PATH)
            .match_query(page_query(1, 10))
            .with_status(200)
            .with_header("x-next-page", "")
            .with_body(page_body(0..4))
            .expect(1)
            .create_async()
            .await;

        let releases = client_for(&server)
            .fetch_releases("123456", 50)
            .await
            .unwrap();

        assert_eq!(releases.len(), 4);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_zero_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let releases = client_for(&server)
            .fetch_releases("123456", 0)
            .await
            .unwrap();

        assert!(releases.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_reports_api_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", RELEASES_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message":"404 Project Not Found"}"#)
            .create_async()
            .await;

        let error = client_for(&server)
            .fetch_releases("123456", 3)
            .await
            .unwrap_err();

        match error {
            RelReportError::ApiError {
                project,
                status,
                message,
            } => {
                assert_eq!(project, "123456");
                assert_eq!(status, 404);
                assert!(message.contains("Project Not Found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
