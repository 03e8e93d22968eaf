use anyhow::{bail, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::{error, info, warn};
use std::path::PathBuf;

use crate::auth::Token;
use crate::config::{Config, OutputFormat, Project};
use crate::output::{export_reports, FetchProgress};
use crate::providers::gitlab::GitLabClient;
use crate::release_count::ReleaseCount;
use crate::report::{FailurePolicy, Reporter};

const TOKEN_ENV: &str = "GITLAB_AUTH_TOKEN";

#[derive(Parser)]
#[command(name = "relreport")]
#[command(author, version, about = "Report recent GitLab releases and the tickets they ship", long_about = None)]
pub struct Cli {
    /// Maximum number of releases per project (integer or decimal, truncated)
    #[arg(allow_negative_numbers = true)]
    count: Option<String>,

    /// GitLab access token
    #[arg(short, long, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// GitLab base URL (overrides the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a relreport.toml/.json/.yaml config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project to report on; repeat to report several (replaces configured projects)
    #[arg(short = 'P', long = "project", value_name = "NAME=ID")]
    projects: Vec<Project>,

    /// Report the projects that succeeded even if others fail
    #[arg(short, long, default_value_t = false)]
    keep_going: bool,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(short, long, default_value_t = false)]
    pretty: bool,
}

impl Cli {
    /// Token from `--token` or the environment, or a usage error (exit code 2).
    fn require_token(&self) -> std::result::Result<Token, clap::Error> {
        self.token.as_deref().and_then(Token::non_empty).ok_or_else(|| {
            Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                format!("a GitLab token is required: export {TOKEN_ENV} or pass --token"),
            )
        })
    }

    fn release_count(&self, config: &Config) -> Result<ReleaseCount> {
        match &self.count {
            Some(count) => Ok(count.parse()?),
            None => Ok(ReleaseCount::from(config.report.default_count)),
        }
    }

    fn failure_policy(&self) -> FailurePolicy {
        if self.keep_going {
            FailurePolicy::KeepGoing
        } else {
            FailurePolicy::FailFast
        }
    }

    /// Validates the token, then loads configuration and builds the client.
    ///
    /// A missing token is returned as a `clap::Error` before anything else is
    /// touched. `Ok(None)` means there are no projects to report.
    fn plan(&self) -> Result<Option<RunPlan>> {
        let token = self.require_token()?;

        let config = Config::load(self.config.as_deref())?;
        let count = self.release_count(&config)?;

        let projects = if self.projects.is_empty() {
            config.projects.clone()
        } else {
            self.projects.clone()
        };
        if projects.is_empty() {
            warn!("No projects configured, nothing to report");
            return Ok(None);
        }

        let base_url = self.url.as_deref().unwrap_or(&config.gitlab.base_url);
        info!("Reporting {} project(s) from {base_url}", projects.len());

        let client = GitLabClient::new(base_url, token, config.gitlab.per_page)?;
        let extractor = config.tickets.extractor()?;

        Ok(Some(RunPlan {
            reporter: Reporter::new(client, extractor, count),
            projects,
            count,
            format: self.format.unwrap_or(config.output.format),
            pretty: self.pretty || config.output.pretty,
        }))
    }

    pub async fn execute(&self) -> Result<()> {
        let plan = match self.plan() {
            Ok(Some(plan)) => plan,
            Ok(None) => return Ok(()),
            Err(err) => match err.downcast::<clap::Error>() {
                Ok(usage) => usage.exit(),
                Err(err) => return Err(err),
            },
        };
        let projects = &plan.projects;

        let progress = FetchProgress::start(projects.len(), plan.count.get());
        let run = match plan.reporter.run(projects, self.failure_policy()).await {
            Ok(run) => run,
            Err(failure) => {
                progress.abandon();
                return Err(failure.into());
            }
        };
        progress.finish(run.reports.len(), run.failures.len());

        let mut stdout = std::io::stdout().lock();
        export_reports(&run.reports, plan.format, plan.pretty, &mut stdout)?;

        for failure in &run.failures {
            error!("{failure}");
        }
        if !run.failures.is_empty() {
            bail!(
                "{} of {} project(s) failed",
                run.failures.len(),
                projects.len()
            );
        }

        Ok(())
    }
}

/// Everything `execute` needs once startup checks have passed.
struct RunPlan {
    reporter: Reporter,
    projects: Vec<Project>,
    count: ReleaseCount,
    format: OutputFormat,
    pretty: bool,
}
