use crate::{Locator, PageDriver, ScrapeError, Script};

/// Text content of the element, or `None` if the page has no such element.
pub async fn extract_text<D: PageDriver + ?Sized>(
    driver: &mut D,
    locator: &Locator,
) -> Result<Option<String>, ScrapeError> {
    if driver.count(locator).await? == 0 {
        return Ok(None);
    }
    driver.text_content(locator).await
}

/// Result of `script` applied to the element, or `None` if the page has no
/// such element.
pub async fn extract_computed<D: PageDriver + ?Sized>(
    driver: &mut D,
    locator: &Locator,
    script: &Script,
) -> Result<Option<String>, ScrapeError> {
    if driver.count(locator).await? == 0 {
        return Ok(None);
    }
    driver.evaluate(locator, script).await
}
