//! Course view as returned by the catalog.

use serde::{Deserialize, Serialize};

use crate::CourseId;

/// The slice of a catalog course the enrollment core cares about.
///
/// Not owned by this service. Fetched fresh on every call and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseView {
    #[serde(deserialize_with = "course_id_from_text_or_number")]
    pub id: CourseId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    pub capacity: u32,
    #[serde(default)]
    pub enrolled: u32,
}

impl CourseView {
    pub fn new(id: impl Into<CourseId>, capacity: u32, enrolled: u32) -> Self {
        Self {
            id: id.into(),
            code: String::new(),
            title: String::new(),
            capacity,
            enrolled,
        }
    }

    /// Returns true when `enrolled` has reached `capacity`.
    pub fn is_full(&self) -> bool {
        self.enrolled >= self.capacity
    }
}

// Numeric-key catalogs send the id as a JSON number.
fn course_id_from_text_or_number<'de, D>(deserializer: D) -> Result<CourseId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => CourseId::new(id),
        RawId::Number(id) => CourseId::new(id.to_string()),
    })
}

/// Response envelope used by the catalog's REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEnvelope<T> {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> CatalogEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "Success".to_string(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_when_enrolled_reaches_capacity() {
        assert!(!CourseView::new("C001", 2, 1).is_full());
        assert!(CourseView::new("C001", 2, 2).is_full());
        assert!(CourseView::new("C001", 2, 3).is_full());
    }

    #[test]
    fn test_decodes_catalog_payload_with_extra_fields() {
        let body = r#"{
            "code": 200,
            "message": "Success",
            "data": {
                "id": "C001",
                "code": "CS101",
                "title": "Intro",
                "instructor": {"id": "T1", "name": "Grace"},
                "capacity": 30,
                "enrolled": 12,
                "createdAt": "2024-09-01T08:00:00"
            }
        }"#;

        let envelope: CatalogEnvelope<CourseView> = serde_json::from_str(body).unwrap();
        let course = envelope.data.unwrap();
        assert_eq!(course.id, CourseId::new("C001"));
        assert_eq!(course.capacity, 30);
        assert_eq!(course.enrolled, 12);
    }

    #[test]
    fn test_decodes_numeric_course_id() {
        let body = r#"{"id": 42, "capacity": 10, "enrolled": 3}"#;
        let course: CourseView = serde_json::from_str(body).unwrap();
        assert_eq!(course.id, CourseId::new("42"));
    }

    #[test]
    fn test_null_data_decodes_as_none() {
        let body = r#"{"code": 404, "message": "Course not found", "data": null}"#;
        let envelope: CatalogEnvelope<CourseView> = serde_json::from_str(body).unwrap();
        assert!(envelope.data.is_none());
    }
}
