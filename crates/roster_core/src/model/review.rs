//! Review record.

use crate::model::employee::EmployeeId;
use crate::model::validation::{require_non_blank, ValidationError};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Storage-assigned review primary key.
pub type ReviewId = i64;

/// Earliest accepted review year.
pub const MIN_REVIEW_YEAR: i32 = 2000;

/// Performance review for one employee in a given year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    id: Option<ReviewId>,
    pub year: i32,
    pub summary: String,
    pub employee_id: EmployeeId,
}

impl Review {
    /// Creates an unsaved review after checking `year` and `summary`.
    pub fn new(
        year: i32,
        summary: impl Into<String>,
        employee_id: EmployeeId,
    ) -> Result<Self, ValidationError> {
        let review = Self {
            id: None,
            year,
            summary: summary.into(),
            employee_id,
        };
        review.validate()?;
        Ok(review)
    }

    pub fn id(&self) -> Option<ReviewId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks `year >= MIN_REVIEW_YEAR` and a non-blank `summary`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.year < MIN_REVIEW_YEAR {
            return Err(ValidationError::YearOutOfRange {
                year: self.year,
                min: MIN_REVIEW_YEAR,
            });
        }
        require_non_blank("summary", &self.summary)
    }

    pub(crate) fn set_id(&mut self, id: Option<ReviewId>) {
        self.id = id;
    }
}

impl Display for Review {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self.id.map_or_else(|| "unsaved".to_string(), |id| id.to_string());
        write!(
            f,
            "<Review {id}: {}, {}, Employee: {}>",
            self.year, self.summary, self.employee_id
        )
    }
}
