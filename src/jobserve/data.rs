use crate::{JobRecord, ScrapeError, Sink};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

#[derive(Serialize)]
struct JobsFile<'a> {
    jobs: &'a [JobRecord],
}

/// Writes all jobs to one pretty-printed UTF-8 JSON file, `{"jobs": [...]}`.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileSink {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The exact bytes [`Sink::persist`] writes.
    pub fn render(jobs: &[JobRecord]) -> Result<Vec<u8>, ScrapeError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        JobsFile { jobs }.serialize(&mut ser)?;
        Ok(buf)
    }
}

#[async_trait::async_trait]
impl Sink for JsonFileSink {
    async fn persist(&self, jobs: &[JobRecord]) -> Result<(), ScrapeError> {
        let content = Self::render(jobs)?;
        fs::write(&self.path, content).await?;
        debug!("Wrote {} jobs to {}", jobs.len(), self.path.display());
        Ok(())
    }
}
