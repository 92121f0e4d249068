use std::time::Duration;

pub mod browser;
pub mod jobserve;

mod dedup;
mod error;
mod extract;
mod locator;
mod navigator;
mod normalizer;
mod orchestrator;

#[cfg(test)]
mod fake;

pub use dedup::Deduplicator;
pub use error::ScrapeError;
pub use extract::{extract_computed, extract_text};
pub use jobserve::{JobField, JobRecord, RawJob};
pub use locator::{Locator, Query, Script};
pub use navigator::{ListingLayout, NavState, Navigator};
pub use normalizer::{comparable_key, present_fields, validate, ComparableKey, REQUIRED_FIELDS};
pub use orchestrator::{Admission, RunContext, Scrape, ScrapeReport};

/// A single browser tab, exclusively owned for the duration of a run.
///
/// Every locator is resolved against the live page on each call.
#[async_trait::async_trait]
pub trait PageDriver: Send {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// Number of elements the locator currently matches.
    async fn count(&mut self, locator: &Locator) -> Result<usize, ScrapeError>;

    /// Text content of the first match, `None` when nothing matches.
    async fn text_content(&mut self, locator: &Locator) -> Result<Option<String>, ScrapeError>;

    /// Runs `script` against the first match. `None` when nothing matches or
    /// the script produced no value.
    async fn evaluate(
        &mut self,
        locator: &Locator,
        script: &Script,
    ) -> Result<Option<String>, ScrapeError>;

    async fn click(&mut self, locator: &Locator) -> Result<(), ScrapeError>;
    async fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), ScrapeError>;
    async fn go_back(&mut self) -> Result<(), ScrapeError>;
    async fn close(&mut self) -> Result<(), ScrapeError>;
}

#[async_trait::async_trait]
pub trait Launcher {
    type Session: PageDriver;

    async fn launch(&self) -> Result<Self::Session, ScrapeError>;
}

#[async_trait::async_trait]
pub trait Sink {
    async fn persist(&self, jobs: &[JobRecord]) -> Result<(), ScrapeError>;
}
