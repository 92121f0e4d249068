use crate::{
    comparable_key, present_fields, Deduplicator, JobRecord, Launcher, ListingLayout, Navigator,
    PageDriver, RawJob, ScrapeError, Sink,
};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Incomplete,
    Duplicate,
}

/// State owned by a single run: accepted records in first-seen order and
/// the keys seen so far.
#[derive(Debug, Default)]
pub struct RunContext {
    jobs: Vec<JobRecord>,
    dedup: Deduplicator,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incomplete jobs are dropped before their key reaches the seen set.
    pub fn admit(&mut self, raw: RawJob) -> Admission {
        let key = comparable_key(&raw);
        let Some(job) = JobRecord::from_raw(raw) else {
            return Admission::Incomplete;
        };
        if !self.dedup.insert(key) {
            return Admission::Duplicate;
        }
        self.jobs.push(job);
        Admission::Accepted
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn into_jobs(self) -> Vec<JobRecord> {
        self.jobs
    }
}

#[derive(Debug)]
pub struct ScrapeReport {
    pub jobs: Vec<JobRecord>,
    pub pages_visited: usize,
    pub items_visited: usize,
}

/// One end-to-end scrape of a listing, from launch to persistence.
#[derive(Debug, Clone)]
pub struct Scrape {
    pub base_url: String,
    pub layout: ListingLayout,
    pub navigation_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Scrape {
    pub fn new<S: Into<String>>(base_url: S, layout: ListingLayout) -> Self {
        Scrape {
            base_url: base_url.into(),
            layout,
            navigation_timeout: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(30),
        }
    }

    pub async fn run<L, S>(&self, launcher: &L, sink: &S) -> Result<ScrapeReport, ScrapeError>
    where
        L: Launcher + Sync,
        S: Sink + Sync,
    {
        let mut session = launcher.launch().await?;
        info!("Browser session started");

        let result = self.collect(&mut session).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        let report = result?;
        sink.persist(&report.jobs).await?;
        info!(
            "Persisted {} jobs from {} items on {} pages",
            report.jobs.len(),
            report.items_visited,
            report.pages_visited
        );
        Ok(report)
    }

    async fn collect<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Result<ScrapeReport, ScrapeError> {
        info!("Visit {}", self.base_url);
        driver.goto(&self.base_url, self.navigation_timeout).await?;
        driver.wait_for_network_idle(self.idle_timeout).await?;
        driver.click(&self.layout.classic_view).await?;
        driver.wait_for_network_idle(self.idle_timeout).await?;

        let mut ctx = RunContext::new();
        let mut items_visited = 0;
        let mut nav = Navigator::new(driver, &self.layout, self.idle_timeout);

        loop {
            let count = nav.item_count().await?;
            debug!("Page {} has {} items", nav.page(), count);

            for i in 0..count {
                let raw = nav.scrape_item(i).await?;
                items_visited += 1;
                let present = present_fields(&raw);
                match ctx.admit(raw) {
                    Admission::Accepted => {
                        info!("[{}] Accepted job on page {}", ctx.jobs().len(), nav.page());
                        if let Some(job) = ctx.jobs().last() {
                            debug!("\n{}", job);
                        }
                    }
                    admission => trace!(
                        "Dropped item {} on page {} ({:?}), present fields: {:?}",
                        i,
                        nav.page(),
                        admission,
                        present
                    ),
                }
            }

            if !nav.advance().await? {
                break;
            }
        }

        Ok(ScrapeReport {
            pages_visited: nav.page(),
            items_visited,
            jobs: ctx.into_jobs(),
        })
    }
}
