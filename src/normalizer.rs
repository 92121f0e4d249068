use crate::{JobField, RawJob};

pub const REQUIRED_FIELDS: [JobField; 4] = [
    JobField::Title,
    JobField::Company,
    JobField::JobUrl,
    JobField::Location,
];

/// Case- and whitespace-insensitive view of a job, used only for dedup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ComparableKey(RawJob);

/// Fields that survive cleaning, in extraction order.
pub fn present_fields(raw: &RawJob) -> Vec<JobField> {
    JobField::ALL
        .into_iter()
        .filter(|f| raw.get(*f).is_some())
        .collect()
}

/// Presence of every required field. Empty strings count as present.
pub fn validate(raw: &RawJob) -> bool {
    REQUIRED_FIELDS.iter().all(|f| raw.get(*f).is_some())
}

pub fn comparable_key(raw: &RawJob) -> ComparableKey {
    let mut key = RawJob::default();
    for field in JobField::ALL {
        key.set(field, raw.get(field).map(|v| v.trim().to_lowercase()));
    }
    ComparableKey(key)
}
