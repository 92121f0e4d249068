use crate::{extract_computed, extract_text, Locator, PageDriver, RawJob, ScrapeError, Script};
use lazy_static::lazy_static;

lazy_static! {
    static ref TITLE: Locator = Locator::css("#td_jobpositionnolink");
    static ref SALARY: Locator = Locator::css("#md_rate");
    static ref COMPANY: Locator = Locator::css("#td_posted_by");
    static ref LOCATION: Locator = Locator::css("#md_location");
    static ref JOB_URL: Locator = Locator::css("#md_permalink");
    static ref POSTED_DATE: Locator = Locator::css("#td_posted_date");
    static ref EMPLOYMENT_TYPE: Locator = Locator::css("#td_job_type");
}

/// Reads every field of the job detail view the driver is currently on.
pub async fn extract_job<D: PageDriver + ?Sized>(driver: &mut D) -> Result<RawJob, ScrapeError> {
    let title = extract_text(driver, &TITLE).await?;
    let salary = extract_text(driver, &SALARY).await?;
    // "Posted by" and "Posted date" cells carry a label node before the value.
    let company = extract_computed(driver, &COMPANY, &Script::LAST_CHILD_TEXT).await?;
    let location = extract_text(driver, &LOCATION).await?;
    let job_url = extract_text(driver, &JOB_URL).await?;
    let posted_date = extract_computed(driver, &POSTED_DATE, &Script::LAST_CHILD_TEXT).await?;
    let employment_type = extract_text(driver, &EMPLOYMENT_TYPE).await?;

    Ok(RawJob {
        title,
        company,
        location,
        job_url,
        salary,
        posted_date,
        employment_type,
    })
}
