//! Learner profile collected at onboarding

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Please fill in all required fields")]
    MissingName,
    #[error("Grade must be between 1 and 12, got {0}")]
    InvalidGrade(u8),
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
}

/// School grade, 1 through 12
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 12;

    pub fn new(value: u8) -> Result<Self, ProfileError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ProfileError::InvalidGrade(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Grade> {
        (Self::MIN..=Self::MAX).map(Grade)
    }
}

impl Default for Grade {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Grade {
    type Error = ProfileError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Grade::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    Chinese,
    Hindi,
    Arabic,
    Portuguese,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Spanish => "spanish",
            Language::French => "french",
            Language::Chinese => "chinese",
            Language::Hindi => "hindi",
            Language::Arabic => "arabic",
            Language::Portuguese => "portuguese",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, ProfileError> {
        Self::all()
            .into_iter()
            .find(|lang| lang.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ProfileError::UnknownLanguage(s.to_string()))
    }

    pub fn all() -> Vec<Language> {
        vec![
            Language::English,
            Language::Spanish,
            Language::French,
            Language::Chinese,
            Language::Hindi,
            Language::Arabic,
            Language::Portuguese,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::Chinese => "Chinese",
            Language::Hindi => "Hindi",
            Language::Arabic => "Arabic",
            Language::Portuguese => "Portuguese",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub name: String,
    pub grade: Grade,
    pub language: Language,
}

impl StudentProfile {
    pub fn new(name: &str, grade: Grade, language: Language) -> Result<Self, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::MissingName);
        }
        Ok(Self {
            name: name.to_string(),
            grade,
            language,
        })
    }

    /// "Grade 7 • Spanish", as shown under the dashboard greeting
    pub fn summary(&self) -> String {
        format!("{} • {}", self.grade, self.language.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bounds() {
        assert!(Grade::new(1).is_ok());
        assert!(Grade::new(12).is_ok());
        assert_eq!(Grade::new(0), Err(ProfileError::InvalidGrade(0)));
        assert_eq!(Grade::new(13), Err(ProfileError::InvalidGrade(13)));
        assert_eq!(Grade::all().count(), 12);
    }

    #[test]
    fn test_name_is_trimmed_and_required() {
        let grade = Grade::new(5).unwrap();
        let profile = StudentProfile::new("  Ada  ", grade, Language::English).unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(
            StudentProfile::new("   ", grade, Language::English),
            Err(ProfileError::MissingName)
        );
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!(Language::from_str("Hindi"), Ok(Language::Hindi));
        assert_eq!(Language::from_str(" portuguese "), Ok(Language::Portuguese));
        assert!(matches!(
            Language::from_str("klingon"),
            Err(ProfileError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_serialized_shape() {
        let profile = StudentProfile::new("Sam", Grade::new(7).unwrap(), Language::Spanish).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Sam", "grade": 7, "language": "spanish" }));
        assert_eq!(profile.summary(), "Grade 7 • Spanish");
    }

    #[test]
    fn test_out_of_range_grade_rejected_on_load() {
        let result: Result<StudentProfile, _> =
            serde_json::from_str(r#"{ "name": "Sam", "grade": 14, "language": "french" }"#);
        assert!(result.is_err());
    }
}
