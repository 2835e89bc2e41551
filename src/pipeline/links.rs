// src/pipeline/links.rs

//! Catalog link check.
//!
//! Every URL in the catalog is probed concurrently; redirects and failures
//! are reported with the line they first appear on.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use url::Url;

use crate::error::Result;
use crate::models::LinksConfig;
use crate::services::links::{self, IgnoreList, LinkResult, LinkStatus};
use crate::utils::http::{FetchedResource, Fetcher};
use crate::utils::log;

/// Repository coordinates for linking report lines to the catalog source.
#[derive(Debug, Clone)]
pub struct GithubContext {
    pub server_url: String,
    pub repository: String,
    pub sha: String,
}

impl GithubContext {
    /// Read `GITHUB_SERVER_URL`, `GITHUB_REPOSITORY` and `GITHUB_SHA`.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Some(Self {
            server_url: var("GITHUB_SERVER_URL").unwrap_or_else(|| "https://github.com".into()),
            repository: var("GITHUB_REPOSITORY")?,
            sha: var("GITHUB_SHA")?,
        })
    }

    fn line_link(&self, file: &str, line: usize) -> String {
        format!(
            "[L{line}]({}/{}/blob/{}/{file}?plain=1#L{line})",
            self.server_url, self.repository, self.sha
        )
    }
}

/// Findings of a link check run, in catalog order.
#[derive(Debug, Clone)]
pub struct LinkReport {
    pub catalog_path: String,
    pub results: Vec<LinkResult>,
}

impl LinkReport {
    pub fn redirects(&self) -> impl Iterator<Item = &LinkResult> {
        self.results.iter().filter(|r| r.is_redirect() && !r.ignored)
    }

    pub fn errors(&self) -> impl Iterator<Item = &LinkResult> {
        self.results.iter().filter(|r| r.is_error() && !r.ignored)
    }

    pub fn ignored(&self) -> impl Iterator<Item = &LinkResult> {
        self.results.iter().filter(|r| r.ignored)
    }

    /// Unignored errors always fail; unignored redirects only when asked.
    pub fn should_fail(&self, fail_on_redirect: bool) -> bool {
        self.errors().next().is_some()
            || (fail_on_redirect && self.redirects().next().is_some())
    }

    /// Markdown summary for the CI job page. Empty when nothing was found.
    pub fn step_summary(&self, github: Option<&GithubContext>) -> String {
        let line_ref = |line: usize| match github {
            Some(github) => github.line_link(&self.catalog_path, line),
            None => format!("L{}", line),
        };

        let mut out = String::new();
        let redirects: Vec<_> = self.redirects().collect();
        if !redirects.is_empty() {
            let _ = writeln!(out, "## 🔗 URL Redirects Found ({})\n", redirects.len());
            for result in redirects {
                if let LinkStatus::Redirected { final_url } = &result.status {
                    let _ = writeln!(out, "- Original:\t{}", result.url);
                    let _ = writeln!(out, "  Redirect:\t{}", final_url);
                    let _ = writeln!(out, "  Line: {}", line_ref(result.line));
                }
            }
            out.push('\n');
        }

        let errors: Vec<_> = self.errors().collect();
        if !errors.is_empty() {
            let _ = writeln!(out, "## ❌ Errors Encountered ({})\n", errors.len());
            for result in errors {
                if let LinkStatus::Failed { error } = &result.status {
                    let _ = writeln!(out, "- Error for {}: {}", result.url, error);
                    let _ = writeln!(out, "  Line: {}", line_ref(result.line));
                }
            }
            out.push('\n');
        }
        out
    }

    /// Print the report to the log.
    pub fn print(&self) {
        for result in &self.results {
            ::log::info!("{}. {} (line {})", result.index, result.url, result.line);
            let ignored = if result.ignored { " (ignored)" } else { "" };
            match &result.status {
                LinkStatus::Ok => {}
                LinkStatus::Redirected { final_url } => {
                    log::sub_item(&format!("Redirects to{}: {}", ignored, final_url))
                }
                LinkStatus::Failed { error } => {
                    log::sub_item(&format!("Error{}: {}", ignored, error))
                }
            }
        }

        log::summary(
            "Link check",
            &[
                ("Checked", self.results.len().to_string()),
                ("Redirects", self.redirects().count().to_string()),
                ("Errors", self.errors().count().to_string()),
                ("Ignored", self.ignored().count().to_string()),
            ],
        );
    }
}

/// Probes URLs for redirects and failures.
pub struct LinkChecker {
    fetcher: Arc<dyn Fetcher>,
    timeout: Duration,
    concurrency: usize,
    redirect_ignore: IgnoreList,
    error_ignore: IgnoreList,
}

impl LinkChecker {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &LinksConfig) -> Self {
        Self {
            fetcher,
            timeout: Duration::from_secs(config.timeout_secs),
            concurrency: config.max_concurrent.max(1),
            redirect_ignore: IgnoreList::new(&config.redirect_ignore),
            error_ignore: IgnoreList::new(&config.error_ignore),
        }
    }

    /// HEAD first, GET when HEAD fails or is refused.
    pub async fn check(&self, url: &str) -> LinkStatus {
        if let Ok(head) = self.fetcher.head(url, self.timeout).await {
            if head.is_success() {
                return redirect_status(url, &head);
            }
            ::log::debug!("HEAD {} returned HTTP {}, retrying with GET", url, head.status);
        }

        match self.fetcher.get(url, self.timeout).await {
            Ok(get) if get.is_success() => redirect_status(url, &get),
            Ok(get) => LinkStatus::Failed {
                error: format!("HTTP {}", get.status),
            },
            Err(e) => LinkStatus::Failed {
                error: e.to_string(),
            },
        }
    }

    /// Check every URL in the catalog text.
    pub async fn check_catalog(&self, catalog_path: &str, text: &str) -> LinkReport {
        let urls = links::extract_urls(text);
        ::log::info!("Found {} unique URLs in {}", urls.len(), catalog_path);

        let mut results: Vec<LinkResult> = stream::iter(urls.into_iter().enumerate())
            .map(|(position, url)| async move {
                let status = self.check(&url).await;
                let ignored = match status {
                    LinkStatus::Ok => false,
                    LinkStatus::Redirected { .. } => self.redirect_ignore.matches(&url),
                    LinkStatus::Failed { .. } => self.error_ignore.matches(&url),
                };
                LinkResult {
                    index: position + 1,
                    line: links::line_number(text, &url),
                    url,
                    status,
                    ignored,
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results.sort_by_key(|r| r.index);
        LinkReport {
            catalog_path: catalog_path.to_string(),
            results,
        }
    }
}

fn redirect_status(url: &str, fetched: &FetchedResource) -> LinkStatus {
    // Compare normalized forms so "https://a.test" and "https://a.test/" agree.
    let requested = Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string());
    if fetched.final_url == requested {
        LinkStatus::Ok
    } else {
        LinkStatus::Redirected {
            final_url: fetched.final_url.clone(),
        }
    }
}

/// Check the catalog at `catalog_path` and append findings to the step
/// summary file when one is given.
pub async fn run_link_check(
    config: &LinksConfig,
    fetcher: Arc<dyn Fetcher>,
    catalog_path: &Path,
    step_summary: Option<&Path>,
) -> Result<LinkReport> {
    log::header(&format!("Checking links in {}", catalog_path.display()));

    let text = tokio::fs::read_to_string(catalog_path).await?;
    let checker = LinkChecker::new(fetcher, config);
    let report = checker
        .check_catalog(&catalog_path.display().to_string(), &text)
        .await;
    report.print();

    if let Some(summary_path) = step_summary {
        let summary = report.step_summary(GithubContext::from_env().as_ref());
        if !summary.is_empty() {
            append(summary_path, &summary).await?;
            ::log::info!("Step summary written to {}", summary_path.display());
        }
    }

    Ok(report)
}

async fn append(path: &Path, text: &str) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(text.as_bytes()).await?;
    // tokio hands writes to a blocking thread; wait for them before the file drops.
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;

    /// Scripted responses: `(head, get)` per URL, `None` meaning unreachable.
    #[derive(Default)]
    struct ScriptedFetcher {
        routes: HashMap<String, (Option<FetchedResource>, Option<FetchedResource>)>,
    }

    impl ScriptedFetcher {
        fn route(
            mut self,
            url: &str,
            head: Option<(u16, &str)>,
            get: Option<(u16, &str)>,
        ) -> Self {
            let resource = |(status, final_url): (u16, &str)| FetchedResource {
                final_url: final_url.to_string(),
                status,
                ..FetchedResource::default()
            };
            self.routes
                .insert(url.to_string(), (head.map(resource), get.map(resource)));
            self
        }
    }

    fn refused() -> AppError {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn get(&self, url: &str, _timeout: Duration) -> Result<FetchedResource> {
            self.routes
                .get(url)
                .and_then(|(_, get)| get.clone())
                .ok_or_else(refused)
        }

        async fn head(&self, url: &str, _timeout: Duration) -> Result<FetchedResource> {
            self.routes
                .get(url)
                .and_then(|(head, _)| head.clone())
                .ok_or_else(refused)
        }
    }

    const CATALOG: &str = "# Links\n\
                           - [Ok](https://ok.test/) - Fine.\n\
                           - [Moved](https://moved.test/a) - Redirects.\n\
                           - [Down](https://down.test/) - Unreachable.\n\
                           - [Video](https://youtube.com/watch) - Ignored redirect.\n";

    fn fetcher() -> ScriptedFetcher {
        ScriptedFetcher::default()
            .route("https://ok.test/", Some((200, "https://ok.test/")), None)
            .route(
                "https://moved.test/a",
                Some((200, "https://moved.test/b")),
                None,
            )
            .route(
                "https://youtube.com/watch",
                Some((200, "https://www.youtube.com/watch")),
                None,
            )
    }

    fn config() -> LinksConfig {
        LinksConfig {
            redirect_ignore: vec!["youtube.com".into()],
            max_concurrent: 2,
            ..LinksConfig::default()
        }
    }

    #[tokio::test]
    async fn test_check_catalog_classifies_in_order() {
        let checker = LinkChecker::new(Arc::new(fetcher()), &config());
        let report = checker.check_catalog("README.md", CATALOG).await;

        let urls: Vec<_> = report.results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://ok.test/",
                "https://moved.test/a",
                "https://down.test/",
                "https://youtube.com/watch",
            ]
        );
        assert_eq!(report.results[0].status, LinkStatus::Ok);
        assert_eq!(report.results[1].line, 3);
        assert_eq!(
            report.results[1].status,
            LinkStatus::Redirected {
                final_url: "https://moved.test/b".into()
            }
        );
        assert!(report.results[2].is_error());
        assert!(report.results[3].ignored);

        assert_eq!(report.redirects().count(), 1);
        assert_eq!(report.errors().count(), 1);
        assert!(report.should_fail(false));
    }

    #[tokio::test]
    async fn test_head_refused_falls_back_to_get() {
        let fetcher = ScriptedFetcher::default().route(
            "https://nohead.test/",
            Some((405, "https://nohead.test/")),
            Some((200, "https://nohead.test/")),
        );
        let checker = LinkChecker::new(Arc::new(fetcher), &config());
        assert_eq!(checker.check("https://nohead.test/").await, LinkStatus::Ok);
    }

    #[tokio::test]
    async fn test_get_error_status_is_failure() {
        let fetcher = ScriptedFetcher::default().route(
            "https://gone.test/",
            None,
            Some((404, "https://gone.test/")),
        );
        let checker = LinkChecker::new(Arc::new(fetcher), &config());
        assert_eq!(
            checker.check("https://gone.test/").await,
            LinkStatus::Failed {
                error: "HTTP 404".into()
            }
        );
    }

    #[tokio::test]
    async fn test_trailing_slash_is_not_a_redirect() {
        let fetcher = ScriptedFetcher::default().route(
            "https://a.test",
            Some((200, "https://a.test/")),
            None,
        );
        let checker = LinkChecker::new(Arc::new(fetcher), &config());
        assert_eq!(checker.check("https://a.test").await, LinkStatus::Ok);
    }

    #[tokio::test]
    async fn test_redirects_fail_only_when_asked() {
        let fetcher = ScriptedFetcher::default().route(
            "https://moved.test/a",
            Some((200, "https://moved.test/b")),
            None,
        );
        let checker = LinkChecker::new(Arc::new(fetcher), &config());
        let report = checker
            .check_catalog("README.md", "- [Moved](https://moved.test/a) - Redirects.")
            .await;

        assert!(!report.should_fail(false));
        assert!(report.should_fail(true));
    }

    #[tokio::test]
    async fn test_step_summary_with_line_links() {
        let checker = LinkChecker::new(Arc::new(fetcher()), &config());
        let report = checker.check_catalog("README.md", CATALOG).await;
        let github = GithubContext {
            server_url: "https://github.com".into(),
            repository: "owner/awesome".into(),
            sha: "abc123".into(),
        };

        let summary = report.step_summary(Some(&github));

        assert!(summary.contains("## 🔗 URL Redirects Found (1)"));
        assert!(summary.contains("- Original:\thttps://moved.test/a\n  Redirect:\thttps://moved.test/b\n"));
        assert!(summary.contains(
            "  Line: [L3](https://github.com/owner/awesome/blob/abc123/README.md?plain=1#L3)"
        ));
        assert!(summary.contains("## ❌ Errors Encountered (1)"));
        assert!(summary.contains("- Error for https://down.test/: "));
        assert!(!summary.contains("youtube"));
    }

    #[tokio::test]
    async fn test_run_link_check_appends_summary() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("README.md");
        std::fs::write(&catalog, "- [Moved](https://moved.test/a) - Redirects.\n").unwrap();
        let summary = dir.path().join("summary.md");
        std::fs::write(&summary, "existing\n").unwrap();

        let report = run_link_check(&config(), Arc::new(fetcher()), &catalog, Some(&summary))
            .await
            .unwrap();

        assert_eq!(report.redirects().count(), 1);
        let written = std::fs::read_to_string(&summary).unwrap();
        assert!(written.starts_with("existing\n## 🔗 URL Redirects Found (1)"));
        assert_eq!(
            written,
            format!(
                "existing\n{}",
                report.step_summary(GithubContext::from_env().as_ref())
            )
        );
    }
}
