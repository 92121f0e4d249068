//! Scripted in-memory job board used by the unit tests.

use crate::{jobserve, Launcher, ListingLayout, Locator, PageDriver, Query, ScrapeError, Script};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Detail {
    fields: HashMap<String, String>,
}

impl Detail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Element `selector` exists with the given (already computed) value.
    pub fn with(mut self, selector: &str, value: &str) -> Self {
        self.fields.insert(selector.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Goto(String),
    ClassicView,
    Open(usize, usize),
    Back,
    NextPage,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Blank,
    Landing,
    Listing(usize),
    Detail(usize, usize),
}

#[derive(Debug, Clone)]
pub struct FakeSite {
    pages: Vec<Vec<Detail>>,
    layout: ListingLayout,
    location: Location,
    actions: Arc<Mutex<Vec<Action>>>,
    idle_waits: usize,
    fail_idle_after: Option<usize>,
}

impl FakeSite {
    pub fn new(pages: Vec<Vec<Detail>>) -> Self {
        FakeSite {
            pages,
            layout: jobserve::listing_layout(),
            location: Location::Blank,
            actions: Arc::new(Mutex::new(vec![])),
            idle_waits: 0,
            fail_idle_after: None,
        }
    }

    pub fn on_detail(detail: Detail) -> Self {
        let mut site = FakeSite::new(vec![vec![detail]]);
        site.location = Location::Detail(0, 0);
        site
    }

    pub fn enter_listing(&mut self) {
        self.location = Location::Listing(0);
    }

    /// Every idleness wait after the first `n` times out.
    pub fn fail_idle_after(&mut self, n: usize) {
        self.fail_idle_after = Some(n);
    }

    /// Actions of this site and of every session launched from it.
    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }

    fn is_item_link(&self, locator: &Locator) -> Option<usize> {
        match locator.index() {
            Some(i)
                if locator.root() == self.layout.items.root()
                    && locator.descendant() == Some(self.layout.item_link.as_str()) =>
            {
                Some(i)
            }
            _ => None,
        }
    }

    fn detail_value(&self, locator: &Locator) -> Option<String> {
        let Location::Detail(p, i) = self.location else {
            return None;
        };
        match (locator.root(), locator.index(), locator.descendant()) {
            (Query::Css(selector), None, None) => self.pages[p][i].fields.get(selector).cloned(),
            _ => None,
        }
    }

    fn matches(&self, locator: &Locator) -> usize {
        match self.location {
            Location::Blank => 0,
            Location::Landing => usize::from(*locator == self.layout.classic_view),
            Location::Listing(p) => {
                let items = self.pages[p].len();
                if *locator == self.layout.items {
                    items
                } else if *locator == self.layout.next_page {
                    usize::from(p + 1 < self.pages.len())
                } else if let Some(i) = self.is_item_link(locator) {
                    usize::from(i < items)
                } else {
                    0
                }
            }
            Location::Detail(..) => usize::from(self.detail_value(locator).is_some()),
        }
    }
}

#[async_trait::async_trait]
impl PageDriver for FakeSite {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        self.location = Location::Landing;
        self.record(Action::Goto(url.to_string()));
        Ok(())
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, ScrapeError> {
        Ok(self.matches(locator))
    }

    async fn text_content(&mut self, locator: &Locator) -> Result<Option<String>, ScrapeError> {
        Ok(self.detail_value(locator))
    }

    async fn evaluate(
        &mut self,
        locator: &Locator,
        _script: &Script,
    ) -> Result<Option<String>, ScrapeError> {
        Ok(self.detail_value(locator))
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), ScrapeError> {
        if self.matches(locator) == 0 {
            return Err(ScrapeError::ElementNotFound {
                locator: locator.to_string(),
            });
        }
        match self.location {
            Location::Landing => {
                self.location = Location::Listing(0);
                self.record(Action::ClassicView);
            }
            Location::Listing(p) if *locator == self.layout.next_page => {
                self.location = Location::Listing(p + 1);
                self.record(Action::NextPage);
            }
            Location::Listing(p) => {
                let i = self.is_item_link(locator).unwrap_or_default();
                self.location = Location::Detail(p, i);
                self.record(Action::Open(p, i));
            }
            Location::Blank | Location::Detail(..) => {}
        }
        Ok(())
    }

    async fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), ScrapeError> {
        self.idle_waits += 1;
        match self.fail_idle_after {
            Some(n) if self.idle_waits > n => Err(ScrapeError::Timeout {
                operation: "network idle",
                after: timeout,
            }),
            _ => Ok(()),
        }
    }

    async fn go_back(&mut self) -> Result<(), ScrapeError> {
        if let Location::Detail(p, _) = self.location {
            self.location = Location::Listing(p);
        }
        self.record(Action::Back);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        self.record(Action::Close);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Launcher for FakeSite {
    type Session = FakeSite;

    async fn launch(&self) -> Result<FakeSite, ScrapeError> {
        Ok(self.clone())
    }
}
