//! Chrome DevTools driver.
//!
//! Launches a local Chrome/Chromium through `chromiumoxide` and exposes one
//! tab as a [`PageDriver`]. Locators are resolved against the live DOM on
//! every call, so element handles never outlive a navigation.

use crate::{Launcher, Locator, PageDriver, Query, ScrapeError, Script};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::{
    GetNavigationHistoryParams, NavigateToHistoryEntryParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::stream::{self, PollNext};
use futures::StreamExt;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// How long the page must go without an in-flight request to count as idle.
const QUIET_WINDOW: Duration = Duration::from_millis(500);
const IDLE_POLL: Duration = Duration::from_millis(50);

const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

fn find_chrome() -> Option<PathBuf> {
    CHROME_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}

#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    pub headless: bool,
    /// Executable to run; common install locations are searched when unset.
    pub chrome: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for ChromeLauncher {
    fn default() -> Self {
        ChromeLauncher {
            headless: true,
            chrome: None,
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[async_trait::async_trait]
impl Launcher for ChromeLauncher {
    type Session = ChromeDriver;

    async fn launch(&self) -> Result<ChromeDriver, ScrapeError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.request_timeout)
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-gpu");

        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = self.chrome.clone().or_else(find_chrome) {
            info!("Using Chrome at {}", path.display());
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(ScrapeError::Launch)?;
        let (browser, mut handler) = Browser::launch(config).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        let (network, traffic) = track_network(&page).await?;
        Ok(ChromeDriver {
            browser,
            page,
            handler,
            traffic,
            network,
            last_action: Instant::now(),
            navigation_timeout: self.request_timeout,
        })
    }
}

/// Requests the page has sent but not yet finished, as of `changed`.
#[derive(Debug, Clone, Copy)]
struct NetworkState {
    in_flight: usize,
    changed: Instant,
}

enum Traffic {
    Sent(String),
    Settled(String),
}

/// Follows the page's Network events and publishes the in-flight count.
async fn track_network(
    page: &Page,
) -> Result<(watch::Receiver<NetworkState>, JoinHandle<()>), ScrapeError> {
    let sent = page
        .event_listener::<EventRequestWillBeSent>()
        .await?
        .map(|e| Traffic::Sent(e.request_id.inner().clone()));
    let finished = page
        .event_listener::<EventLoadingFinished>()
        .await?
        .map(|e| Traffic::Settled(e.request_id.inner().clone()));
    let failed = page
        .event_listener::<EventLoadingFailed>()
        .await?
        .map(|e| Traffic::Settled(e.request_id.inner().clone()));

    // Sent events are drained first so a request is never settled before it
    // has been seen.
    let mut events =
        stream::select_with_strategy(sent, stream::select(finished, failed), |_: &mut ()| {
            PollNext::Left
        });

    let (tx, rx) = watch::channel(NetworkState {
        in_flight: 0,
        changed: Instant::now(),
    });
    let task = tokio::spawn(async move {
        let mut pending = HashSet::new();
        while let Some(event) = events.next().await {
            match event {
                Traffic::Sent(id) => {
                    pending.insert(id);
                }
                Traffic::Settled(id) => {
                    pending.remove(&id);
                }
            }
            tx.send_replace(NetworkState {
                in_flight: pending.len(),
                changed: Instant::now(),
            });
        }
    });
    Ok((rx, task))
}

pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    traffic: JoinHandle<()>,
    network: watch::Receiver<NetworkState>,
    /// Last click, history step or navigation; idleness is measured from
    /// no earlier than this.
    last_action: Instant,
    navigation_timeout: Duration,
}

impl ChromeDriver {
    async fn resolve(&self, locator: &Locator) -> Result<Vec<Element>, ScrapeError> {
        let roots = match locator.root() {
            Query::Css(selector) => self.page.find_elements(selector.as_str()).await,
            Query::Text(text) => {
                let xpath = Locator::text_xpath(text);
                if self.xpath_count(&xpath).await? == 0 {
                    return Ok(vec![]);
                }
                self.page.find_xpaths(xpath).await
            }
        };
        let roots = match roots {
            Ok(roots) => roots,
            Err(CdpError::NotFound) => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let roots: Vec<Element> = match locator.index() {
            Some(i) => roots.into_iter().nth(i).into_iter().collect(),
            None => roots,
        };

        let Some(descendant) = locator.descendant() else {
            return Ok(roots);
        };
        let mut found = vec![];
        for root in roots {
            match root.find_elements(descendant).await {
                Ok(children) => found.extend(children),
                Err(CdpError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(found)
    }

    async fn xpath_count(&self, xpath: &str) -> Result<usize, ScrapeError> {
        let expr = format!(
            "document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
            serde_json::to_string(xpath)?
        );
        let count: usize = self
            .page
            .evaluate(expr)
            .await?
            .into_value()
            .map_err(|e| ScrapeError::Script(e.to_string()))?;
        Ok(count)
    }

    async fn first(&self, locator: &Locator) -> Result<Option<Element>, ScrapeError> {
        Ok(self.resolve(locator).await?.into_iter().next())
    }

    async fn call(
        &self,
        element: &Element,
        script: &Script,
    ) -> Result<Option<String>, ScrapeError> {
        let returns = element.call_js_fn(script.source(), false).await?;
        if let Some(exception) = returns.exception_details {
            return Err(ScrapeError::Script(exception.text));
        }
        Ok(match returns.result.value {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }

    /// Waits for a navigation started by the last action to load. Returns
    /// at once when the main frame is not navigating.
    async fn await_navigation(&mut self) -> Result<(), ScrapeError> {
        match tokio::time::timeout(self.navigation_timeout, self.page.wait_for_navigation()).await
        {
            Ok(result) => {
                result?;
                self.last_action = Instant::now();
                Ok(())
            }
            Err(_) => Err(ScrapeError::Timeout {
                operation: "navigation",
                after: self.navigation_timeout,
            }),
        }
    }
}

#[async_trait::async_trait]
impl PageDriver for ChromeDriver {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(result) => {
                result?;
                self.last_action = Instant::now();
                Ok(())
            }
            Err(_) => Err(ScrapeError::Timeout {
                operation: "navigation",
                after: timeout,
            }),
        }
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, ScrapeError> {
        Ok(self.resolve(locator).await?.len())
    }

    async fn text_content(&mut self, locator: &Locator) -> Result<Option<String>, ScrapeError> {
        self.evaluate(locator, &Script::TEXT_CONTENT).await
    }

    async fn evaluate(
        &mut self,
        locator: &Locator,
        script: &Script,
    ) -> Result<Option<String>, ScrapeError> {
        match self.first(locator).await? {
            Some(element) => self.call(&element, script).await,
            None => Ok(None),
        }
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), ScrapeError> {
        let element = self
            .first(locator)
            .await?
            .ok_or_else(|| ScrapeError::ElementNotFound {
                locator: locator.to_string(),
            })?;
        debug!("Click {}", locator);
        element.click().await?;
        self.last_action = Instant::now();
        self.await_navigation().await
    }

    async fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), ScrapeError> {
        let deadline = Instant::now() + timeout;

        loop {
            let state = *self.network.borrow();
            let quiet_since = state.changed.max(self.last_action);
            if state.in_flight == 0 && quiet_since.elapsed() >= QUIET_WINDOW {
                return Ok(());
            }
            if Instant::now() >= deadline {
                debug!("{} requests still in flight", state.in_flight);
                return Err(ScrapeError::Timeout {
                    operation: "network idle",
                    after: timeout,
                });
            }
            sleep(IDLE_POLL).await;
        }
    }

    async fn go_back(&mut self) -> Result<(), ScrapeError> {
        let history = self
            .page
            .execute(GetNavigationHistoryParams::default())
            .await?;
        let previous = usize::try_from(history.result.current_index - 1)
            .ok()
            .and_then(|i| history.result.entries.get(i))
            .ok_or(ScrapeError::NoHistory)?;

        debug!("Back to {}", previous.url);
        self.page
            .execute(NavigateToHistoryEntryParams::new(previous.id))
            .await?;
        self.last_action = Instant::now();
        self.await_navigation().await
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        self.traffic.abort();
        self.browser.close().await?;
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        info!("Browser session closed");
        Ok(())
    }
}
