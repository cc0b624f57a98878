//! Course identifiers and read-only catalog projections.
//!
//! Courses are owned by the catalog store; this core consumes them read-only
//! when validating enrollments and joining enrollment listings.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by [`CourseId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseIdValidationError {
    /// The id string was empty.
    EmptyId,
    /// The id string was not a valid UUID.
    InvalidId,
}

impl fmt::Display for CourseIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "course id must not be empty"),
            Self::InvalidId => write!(f, "course id must be a valid UUID"),
        }
    }
}

impl std::error::Error for CourseIdValidationError {}

/// Stable course identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseId(Uuid, String);

impl CourseId {
    /// Validate and construct a [`CourseId`] from borrowed input.
    ///
    /// # Errors
    ///
    /// Returns [`CourseIdValidationError::EmptyId`] for empty input and
    /// [`CourseIdValidationError::InvalidId`] when the input is not a UUID.
    pub fn new(id: impl AsRef<str>) -> Result<Self, CourseIdValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Construct a [`CourseId`] directly from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        let raw = uuid.to_string();
        Self(uuid, raw)
    }

    /// Generate a new random [`CourseId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    fn from_owned(id: String) -> Result<Self, CourseIdValidationError> {
        if id.is_empty() {
            return Err(CourseIdValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(CourseIdValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| CourseIdValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for CourseId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CourseId> for String {
    fn from(value: CourseId) -> Self {
        value.1
    }
}

impl TryFrom<String> for CourseId {
    type Error = CourseIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Course record as consumed from the catalog store.
///
/// Only the fields this core reads are modelled. `price` is in major currency
/// units; zero means the course is free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub logo: String,
    pub category: String,
    pub duration: String,
    pub instructor: String,
    pub rating: f32,
    pub price: u32,
    pub link: Option<String>,
}

impl Course {
    /// Whether the course requires payment before enrollment.
    pub fn is_paid(&self) -> bool {
        self.price > 0
    }

    /// Project the fields exposed by enrollment listings.
    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            logo: self.logo.clone(),
            category: self.category.clone(),
            duration: self.duration.clone(),
            instructor: self.instructor.clone(),
            rating: self.rating,
            price: self.price,
            link: self.link.clone(),
        }
    }
}

/// Subset of course fields joined into enrollment listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[schema(value_type = String)]
    pub id: CourseId,
    pub name: String,
    pub logo: String,
    pub category: String,
    pub duration: String,
    pub instructor: String,
    pub rating: f32,
    pub price: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(price: u32) -> Course {
        Course {
            id: CourseId::random(),
            name: "Systems Programming".into(),
            logo: "https://cdn.example/logo.png".into(),
            category: "Programming".into(),
            duration: "8 weeks".into(),
            instructor: "A. Hoare".into(),
            rating: 4.5,
            price,
            link: None,
        }
    }

    #[test]
    fn zero_price_is_free() {
        assert!(!course(0).is_paid());
        assert!(course(499).is_paid());
    }

    #[test]
    fn summary_projects_listing_fields() {
        let full = course(199);
        let summary = full.summary();
        assert_eq!(summary.id, full.id);
        assert_eq!(summary.name, full.name);
        assert_eq!(summary.price, 199);
    }

    #[test]
    fn course_id_rejects_padded_input() {
        assert!(matches!(
            CourseId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6 "),
            Err(CourseIdValidationError::InvalidId)
        ));
    }
}
