use crate::Record;

/// A named check every record must pass before the store accepts it.
///
/// Primary key uniqueness is enforced by the store itself, constraints only
/// cover the shape of a single record.
#[derive(Clone)]
pub struct Constraint {
    pub(crate) name: String,
    pub(crate) check: fn(&Record) -> bool,
}

impl Constraint {
    pub fn check(name: &str, check: fn(&Record) -> bool) -> Self {
        Self {
            name: name.to_owned(),
            check,
        }
    }

    /// Rejects records whose name is empty or only whitespace.
    pub fn full_name_not_empty() -> Self {
        Self::check("full_name_not_empty", |record| {
            !record.full_name.trim().is_empty()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn accepts(&self, record: &Record) -> bool {
        (self.check)(record)
    }
}
