use futures::future::{join_all, try_join_all};
use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::config::Project;
use crate::error::RelReportError;
use crate::providers::gitlab::{GitLabClient, Release};
use crate::release_count::ReleaseCount;
use crate::tickets::TicketExtractor;

/// `DD.MM.YY - HH:MM`, 24-hour clock.
pub const CREATED_AT_FORMAT: &str = "%d.%m.%y - %H:%M";

const QS_TAG_PREFIX: &str = "QS_";

/// One rendered line of a project's release table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRow {
    pub tag: String,
    pub name: String,
    pub created_at: String,
    pub qs_tag: String,
    pub content: String,
    pub link: String,
}

impl ReleaseRow {
    pub fn from_release(release: &Release, extractor: &TicketExtractor) -> Self {
        Self {
            tag: release.tag_name.clone(),
            name: release.name.clone(),
            created_at: release.created_at.format(CREATED_AT_FORMAT).to_string(),
            qs_tag: format!("{QS_TAG_PREFIX}{}", release.commit_short_id),
            content: extractor.extract(&release.description),
            link: release.self_link.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub project: Project,
    pub releases: Vec<ReleaseRow>,
}

/// A project whose releases could not be collected.
#[derive(Debug, Error)]
#[error("Failed to collect releases for {} ({}): {source}", .project.name, .project.id)]
pub struct ProjectFailure {
    pub project: Project,
    pub source: RelReportError,
}

/// What to do with sibling projects once one of them fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure and drop the in-flight requests
    #[default]
    FailFast,
    /// Let every project finish and report failures alongside the tables
    KeepGoing,
}

/// Reports of the projects that succeeded, in configuration order, plus the
/// failures collected under [`FailurePolicy::KeepGoing`].
#[derive(Debug, Default)]
pub struct ReportRun {
    pub reports: Vec<ProjectReport>,
    pub failures: Vec<ProjectFailure>,
}

pub struct Reporter {
    client: GitLabClient,
    extractor: TicketExtractor,
    count: ReleaseCount,
}

impl Reporter {
    pub fn new(client: GitLabClient, extractor: TicketExtractor, count: ReleaseCount) -> Self {
        Self {
            client,
            extractor,
            count,
        }
    }

    /// Fetch and label the latest releases of one project.
    pub async fn report_project(&self, project: &Project) -> Result<ProjectReport, ProjectFailure> {
        debug!("Collecting releases for {} ({})", project.name, project.id);

        let releases = self
            .client
            .fetch_releases(&project.id, self.count.get())
            .await
            .map_err(|source| ProjectFailure {
                project: project.clone(),
                source,
            })?;

        let releases = releases
            .iter()
            .map(|release| ReleaseRow::from_release(release, &self.extractor))
            .collect();

        Ok(ProjectReport {
            project: project.clone(),
            releases,
        })
    }

    /// Collect reports for all projects concurrently.
    ///
    /// Every project gets its own future, all polled at once. Results come
    /// back in the order of `projects` regardless of completion order.
    pub async fn run(
        &self,
        projects: &[Project],
        policy: FailurePolicy,
    ) -> Result<ReportRun, ProjectFailure> {
        info!(
            "Collecting up to {} releases for {} project(s)",
            self.count,
            projects.len()
        );

        let tasks = projects.iter().map(|project| self.report_project(project));

        match policy {
            FailurePolicy::FailFast => {
                let reports = try_join_all(tasks).await?;
                Ok(ReportRun {
                    reports,
                    failures: Vec::new(),
                })
            }
            FailurePolicy::KeepGoing => {
                let mut run = ReportRun::default();
                for result in join_all(tasks).await {
                    match result {
                        Ok(report) => run.reports.push(report),
                        Err(failure) => run.failures.push(failure),
                    }
                }
                Ok(run)
            }
        }
    }
}
