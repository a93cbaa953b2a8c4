//! Content Value Objects

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{ContentError, ContentResult};

const SLUG_MAX_LENGTH: usize = 128;
const TITLE_MAX_LENGTH: usize = 200;
const SUMMARY_MAX_LENGTH: usize = 500;

/// Kind of published item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum ContentKind {
    #[display("blog")]
    Blog = 0,
    #[display("course")]
    Course = 1,
    #[display("material")]
    Material = 2,
    #[display("video")]
    Video = 3,
}

impl ContentKind {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(ContentKind::Blog),
            1 => Some(ContentKind::Course),
            2 => Some(ContentKind::Material),
            3 => Some(ContentKind::Video),
            _ => None,
        }
    }

    /// Parse a URL segment, singular or plural (`blog`, `blogs`)
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "blog" | "blogs" => Some(ContentKind::Blog),
            "course" | "courses" => Some(ContentKind::Course),
            "material" | "materials" => Some(ContentKind::Material),
            "video" | "videos" => Some(ContentKind::Video),
            _ => None,
        }
    }

    /// Materials and videos may belong to a course
    #[inline]
    pub const fn has_parent_course(&self) -> bool {
        matches!(self, ContentKind::Material | ContentKind::Video)
    }
}

/// URL slug, unique per kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct Slug(String);

impl Slug {
    /// Lowercase ASCII letters, digits and single inner hyphens
    pub fn new(raw: impl AsRef<str>) -> ContentResult<Self> {
        let slug = raw.as_ref().trim().to_ascii_lowercase();

        if slug.is_empty() || slug.len() > SLUG_MAX_LENGTH {
            return Err(ContentError::InvalidInput(format!(
                "Slug must be 1-{SLUG_MAX_LENGTH} characters"
            )));
        }

        let valid_chars = slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_chars || slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
            return Err(ContentError::InvalidInput(
                "Slug may contain only letters, digits and single hyphens".to_string(),
            ));
        }

        Ok(Self(slug))
    }

    pub fn from_db(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trim and bound the title
pub fn validate_title(raw: &str) -> ContentResult<String> {
    let title = raw.trim();
    if title.is_empty() || title.chars().count() > TITLE_MAX_LENGTH {
        return Err(ContentError::InvalidInput(format!(
            "Title must be 1-{TITLE_MAX_LENGTH} characters"
        )));
    }
    Ok(title.to_string())
}

pub fn validate_summary(raw: &str) -> ContentResult<String> {
    let summary = raw.trim();
    if summary.chars().count() > SUMMARY_MAX_LENGTH {
        return Err(ContentError::InvalidInput(format!(
            "Summary must be at most {SUMMARY_MAX_LENGTH} characters"
        )));
    }
    Ok(summary.to_string())
}
