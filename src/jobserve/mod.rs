mod data;
mod detail;

pub use data::JsonFileSink;
pub use detail::extract_job;

use crate::{ListingLayout, Locator};

use serde::Serialize;
use std::fmt;

pub const BASE_URL: &str =
    "https://jobserve.com/gb/en/JobSearch.aspx?shid=1733D5765A89D1D1D78F&l=United+Kingdom";

pub fn listing_layout() -> ListingLayout {
    ListingLayout {
        items: Locator::css("div.jobListItem.newjobsum"),
        item_link: ".jobListHeaderPanel .jobListPosition".to_string(),
        next_page: Locator::css(r#"#jobListPagingControl a[title="Next Page"]"#),
        classic_view: Locator::text("Classic View"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobField {
    Title,
    Company,
    Location,
    JobUrl,
    Salary,
    PostedDate,
    EmploymentType,
}

impl JobField {
    pub const ALL: [JobField; 7] = [
        JobField::Title,
        JobField::Salary,
        JobField::Company,
        JobField::Location,
        JobField::JobUrl,
        JobField::PostedDate,
        JobField::EmploymentType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            JobField::Title => "title",
            JobField::Company => "company",
            JobField::Location => "location",
            JobField::JobUrl => "job_url",
            JobField::Salary => "salary",
            JobField::PostedDate => "posted_date",
            JobField::EmploymentType => "employment_type",
        }
    }
}

/// Fields read from one detail view. `None` means the element was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RawJob {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_url: Option<String>,
    pub salary: Option<String>,
    pub posted_date: Option<String>,
    pub employment_type: Option<String>,
}

impl RawJob {
    pub fn get(&self, field: JobField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: JobField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    fn slot(&self, field: JobField) -> &Option<String> {
        match field {
            JobField::Title => &self.title,
            JobField::Company => &self.company,
            JobField::Location => &self.location,
            JobField::JobUrl => &self.job_url,
            JobField::Salary => &self.salary,
            JobField::PostedDate => &self.posted_date,
            JobField::EmploymentType => &self.employment_type,
        }
    }

    fn slot_mut(&mut self, field: JobField) -> &mut Option<String> {
        match field {
            JobField::Title => &mut self.title,
            JobField::Company => &mut self.company,
            JobField::Location => &mut self.location,
            JobField::JobUrl => &mut self.job_url,
            JobField::Salary => &mut self.salary,
            JobField::PostedDate => &mut self.posted_date,
            JobField::EmploymentType => &mut self.employment_type,
        }
    }
}

/// An accepted job listing. Serializes with absent optional fields omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    title: String,
    company: String,
    location: String,
    job_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    posted_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    employment_type: Option<String>,
}

impl JobRecord {
    pub fn new<S: Into<String>>(title: S, company: S, location: S, job_url: S) -> Self {
        JobRecord {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            job_url: job_url.into(),
            salary: None,
            posted_date: None,
            employment_type: None,
        }
    }

    pub fn with_salary(self, salary: Option<String>) -> Self {
        JobRecord { salary, ..self }
    }

    pub fn with_posted_date(self, posted_date: Option<String>) -> Self {
        JobRecord {
            posted_date,
            ..self
        }
    }

    pub fn with_employment_type(self, employment_type: Option<String>) -> Self {
        JobRecord {
            employment_type,
            ..self
        }
    }

    /// Builds a record from scraped fields, `None` if any required field is
    /// absent. Values are kept exactly as scraped.
    pub fn from_raw(raw: RawJob) -> Option<Self> {
        let RawJob {
            title,
            company,
            location,
            job_url,
            salary,
            posted_date,
            employment_type,
        } = raw;

        Some(
            JobRecord::new(title?, company?, location?, job_url?)
                .with_salary(salary)
                .with_posted_date(posted_date)
                .with_employment_type(employment_type),
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn job_url(&self) -> &str {
        &self.job_url
    }

    pub fn salary(&self) -> Option<&str> {
        self.salary.as_deref()
    }

    pub fn posted_date(&self) -> Option<&str> {
        self.posted_date.as_deref()
    }

    pub fn employment_type(&self) -> Option<&str> {
        self.employment_type.as_deref()
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title           : {}", self.title.trim())?;
        writeln!(f, "Company         : {}", self.company.trim())?;
        writeln!(f, "Location        : {}", self.location.trim())?;
        writeln!(f, "Url             : {}", self.job_url.trim())?;
        for (label, value) in [
            ("Salary          ", &self.salary),
            ("Posted Date     ", &self.posted_date),
            ("Employment Type ", &self.employment_type),
        ] {
            match value {
                Some(v) => writeln!(f, "{}: {}", label, v.trim())?,
                None => writeln!(f, "{}: None", label)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw() -> RawJob {
        RawJob {
            title: Some(" Rust Engineer ".to_string()),
            company: Some("Acme".to_string()),
            location: Some("London".to_string()),
            job_url: Some("https://jobserve.com/abc".to_string()),
            salary: None,
            posted_date: Some("16/10/2026".to_string()),
            employment_type: None,
        }
    }

    #[test]
    fn from_raw_keeps_original_values() {
        let record = JobRecord::from_raw(raw()).expect("complete record");
        assert_eq!(record.title(), " Rust Engineer ");
        assert_eq!(record.company(), "Acme");
        assert_eq!(record.salary(), None);
        assert_eq!(record.posted_date(), Some("16/10/2026"));
    }

    #[test]
    fn from_raw_rejects_missing_required_field() {
        for field in [
            JobField::Title,
            JobField::Company,
            JobField::Location,
            JobField::JobUrl,
        ] {
            let mut r = raw();
            r.set(field, None);
            assert_eq!(JobRecord::from_raw(r), None, "{}", field.name());
        }
    }

    #[test]
    fn from_raw_accepts_empty_required_field() {
        let mut r = raw();
        r.set(JobField::Company, Some(String::new()));
        let record = JobRecord::from_raw(r).expect("empty strings are present");
        assert_eq!(record.company(), "");
    }

    #[test]
    fn serializes_without_absent_fields() {
        let record = JobRecord::from_raw(raw()).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "title": " Rust Engineer ",
                "company": "Acme",
                "location": "London",
                "job_url": "https://jobserve.com/abc",
                "posted_date": "16/10/2026",
            })
        );
    }

    #[test]
    fn field_names_match_serialized_keys() {
        let record = JobRecord::new("t", "c", "l", "u")
            .with_salary(Some("s".into()))
            .with_posted_date(Some("p".into()))
            .with_employment_type(Some("e".into()));
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        for field in JobField::ALL {
            assert!(object.contains_key(field.name()), "{}", field.name());
        }
        assert_eq!(object.len(), JobField::ALL.len());
    }

    #[test]
    fn get_and_set_address_the_same_slot() {
        let mut r = RawJob::default();
        for field in JobField::ALL {
            assert_eq!(r.get(field), None);
            r.set(field, Some(field.name().to_string()));
        }
        assert_eq!(r.job_url.as_deref(), Some("job_url"));
        assert_eq!(r.get(JobField::EmploymentType), Some("employment_type"));
    }
}
