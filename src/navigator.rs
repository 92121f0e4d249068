use crate::{jobserve, Locator, PageDriver, RawJob, ScrapeError};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    OnListingPage,
    ItemOpened,
    Done,
}

/// Where the controls of a paginated listing live.
#[derive(Debug, Clone)]
pub struct ListingLayout {
    /// One match per job summary on the current page.
    pub items: Locator,
    /// Link inside an item that opens its detail view.
    pub item_link: String,
    pub next_page: Locator,
    /// One-time display mode switch clicked before the first page.
    pub classic_view: Locator,
}

/// Drives the listing → detail → back cycle over a single browser tab.
pub struct Navigator<'a, D: ?Sized> {
    driver: &'a mut D,
    layout: &'a ListingLayout,
    idle_timeout: Duration,
    state: NavState,
    page: usize,
}

impl<'a, D: PageDriver + ?Sized> Navigator<'a, D> {
    /// Starts on the first listing page. The driver must already show it.
    pub fn new(driver: &'a mut D, layout: &'a ListingLayout, idle_timeout: Duration) -> Self {
        Navigator {
            driver,
            layout,
            idle_timeout,
            state: NavState::OnListingPage,
            page: 1,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// 1-based number of the listing page currently shown.
    pub fn page(&self) -> usize {
        self.page
    }

    fn expect(&self, expected: NavState) -> Result<(), ScrapeError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ScrapeError::State {
                expected,
                found: self.state,
            })
        }
    }

    /// Items on the current page, queried fresh from the live DOM.
    pub async fn item_count(&mut self) -> Result<usize, ScrapeError> {
        self.expect(NavState::OnListingPage)?;
        self.driver.count(&self.layout.items).await
    }

    pub async fn open_item(&mut self, index: usize) -> Result<(), ScrapeError> {
        self.expect(NavState::OnListingPage)?;
        let link = self.layout.items.nth(index).locate(self.layout.item_link.as_str());
        self.driver.click(&link).await?;
        self.driver.wait_for_network_idle(self.idle_timeout).await?;
        self.state = NavState::ItemOpened;
        Ok(())
    }

    pub async fn extract(&mut self) -> Result<RawJob, ScrapeError> {
        self.expect(NavState::ItemOpened)?;
        jobserve::extract_job(&mut *self.driver).await
    }

    pub async fn back_to_listing(&mut self) -> Result<(), ScrapeError> {
        self.expect(NavState::ItemOpened)?;
        self.driver.go_back().await?;
        self.driver.wait_for_network_idle(self.idle_timeout).await?;
        self.state = NavState::OnListingPage;
        Ok(())
    }

    /// Opens item `index`, reads it, and returns to the listing.
    pub async fn scrape_item(&mut self, index: usize) -> Result<RawJob, ScrapeError> {
        self.open_item(index).await?;
        let job = self.extract().await?;
        self.back_to_listing().await?;
        Ok(job)
    }

    /// Moves to the next listing page. Returns false, and enters `Done`,
    /// when the page has no next-page control.
    pub async fn advance(&mut self) -> Result<bool, ScrapeError> {
        self.expect(NavState::OnListingPage)?;
        if self.driver.count(&self.layout.next_page).await? == 0 {
            debug!("No next page after page {}", self.page);
            self.state = NavState::Done;
            return Ok(false);
        }

        self.driver.click(&self.layout.next_page).await?;
        self.driver.wait_for_network_idle(self.idle_timeout).await?;
        self.page += 1;
        debug!("Moved to listing page {}", self.page);
        Ok(true)
    }
}
