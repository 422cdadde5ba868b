//! Raw Response - the user's answers before encoding
//!
//! Every categorical answer is a closed enum and every number a bounded
//! newtype, so an out-of-range or misspelled answer is rejected where it is
//! parsed and can never reach the encoder.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{AGE_MAX, AGE_MIN, DEFAULT_AGE, DEFAULT_EDUCATION_YEARS, EDUCATION_MAX, EDUCATION_MIN};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    #[error("education years must be between {min} and {max}, got {value}")]
    EducationOutOfRange { value: i64, min: u8, max: u8 },

    #[error("age must be between {min} and {max}, got {value}")]
    AgeOutOfRange { value: i64, min: u8, max: u8 },
}

// ============================================================================
// CATEGORICAL ANSWERS
// ============================================================================

/// Yes/no selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    #[serde(rename = "No")]
    No,
    #[serde(rename = "Sí")]
    Si,
}

impl YesNo {
    pub const ALL: [YesNo; 2] = [YesNo::No, YesNo::Si];

    pub fn label(self) -> &'static str {
        match self {
            YesNo::No => "No",
            YesNo::Si => "Sí",
        }
    }

    pub fn is_yes(self) -> bool {
        match self {
            YesNo::No => false,
            YesNo::Si => true,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            YesNo::No => YesNo::Si,
            YesNo::Si => YesNo::No,
        }
    }
}

/// Gender selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Mujer,
    Hombre,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Mujer, Gender::Hombre];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Mujer => "Mujer",
            Gender::Hombre => "Hombre",
        }
    }

    pub fn is_male(self) -> bool {
        match self {
            Gender::Mujer => false,
            Gender::Hombre => true,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Gender::Mujer => Gender::Hombre,
            Gender::Hombre => Gender::Mujer,
        }
    }
}

// ============================================================================
// BOUNDED NUMBERS
// ============================================================================

/// Accumulated years of education, 0..=30
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct EducationYears(u8);

impl EducationYears {
    pub fn new(value: i64) -> Result<Self, ResponseError> {
        if value < EDUCATION_MIN as i64 || value > EDUCATION_MAX as i64 {
            return Err(ResponseError::EducationOutOfRange {
                value,
                min: EDUCATION_MIN,
                max: EDUCATION_MAX,
            });
        }
        Ok(Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for EducationYears {
    type Error = ResponseError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EducationYears> for u8 {
    fn from(value: EducationYears) -> Self {
        value.0
    }
}

/// Age in years, 15..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Age(u8);

impl Age {
    pub fn new(value: i64) -> Result<Self, ResponseError> {
        if value < AGE_MIN as i64 || value > AGE_MAX as i64 {
            return Err(ResponseError::AgeOutOfRange {
                value,
                min: AGE_MIN,
                max: AGE_MAX,
            });
        }
        Ok(Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Age {
    type Error = ResponseError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Age> for u8 {
    fn from(value: Age) -> Self {
        value.0
    }
}

// ============================================================================
// RAW RESPONSE
// ============================================================================

/// One submission of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawResponse {
    pub head_of_household: YesNo,
    pub gender: Gender,
    pub rural: YesNo,
    pub indigenous_language: YesNo,
    pub married: YesNo,
    pub indigenous_identity: YesNo,
    pub education_years: EducationYears,
    pub age: Age,
}

impl Default for RawResponse {
    /// The values the form starts with
    fn default() -> Self {
        Self {
            head_of_household: YesNo::No,
            gender: Gender::Mujer,
            rural: YesNo::No,
            indigenous_language: YesNo::No,
            married: YesNo::No,
            indigenous_identity: YesNo::No,
            education_years: EducationYears(DEFAULT_EDUCATION_YEARS),
            age: Age(DEFAULT_AGE),
        }
    }
}

/// Binary answers that a counterfactual can flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryField {
    HeadOfHousehold,
    Gender,
    Rural,
    IndigenousLanguage,
    Married,
    IndigenousIdentity,
}

impl BinaryField {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryField::HeadOfHousehold => "head_of_household",
            BinaryField::Gender => "gender",
            BinaryField::Rural => "rural",
            BinaryField::IndigenousLanguage => "indigenous_language",
            BinaryField::Married => "married",
            BinaryField::IndigenousIdentity => "indigenous_identity",
        }
    }
}

impl fmt::Display for BinaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RawResponse {
    /// Copy of this response with one binary answer flipped
    pub fn flipped(&self, field: BinaryField) -> Self {
        let mut next = *self;
        match field {
            BinaryField::HeadOfHousehold => next.head_of_household = self.head_of_household.flipped(),
            BinaryField::Gender => next.gender = self.gender.flipped(),
            BinaryField::Rural => next.rural = self.rural.flipped(),
            BinaryField::IndigenousLanguage => next.indigenous_language = self.indigenous_language.flipped(),
            BinaryField::Married => next.married = self.married.flipped(),
            BinaryField::IndigenousIdentity => next.indigenous_identity = self.indigenous_identity.flipped(),
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(EducationYears::new(0).is_ok());
        assert!(EducationYears::new(30).is_ok());
        assert_eq!(
            EducationYears::new(31),
            Err(ResponseError::EducationOutOfRange { value: 31, min: 0, max: 30 })
        );
        assert!(Age::new(15).is_ok());
        assert!(Age::new(100).is_ok());
        assert!(Age::new(14).is_err());
        assert!(Age::new(101).is_err());
    }

    #[test]
    fn test_deserialize_enumerated_labels_only() {
        let yes: YesNo = serde_json::from_str("\"Sí\"").unwrap();
        assert_eq!(yes, YesNo::Si);
        let male: Gender = serde_json::from_str("\"Hombre\"").unwrap();
        assert_eq!(male, Gender::Hombre);

        // Case variants and typos are rejected instead of silently mapping to 0
        assert!(serde_json::from_str::<YesNo>("\"sí\"").is_err());
        assert!(serde_json::from_str::<YesNo>("\"Si\"").is_err());
        assert!(serde_json::from_str::<Gender>("\"hombre\"").is_err());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_age() {
        let json = r#"{
            "head_of_household": "No", "gender": "Mujer", "rural": "No",
            "indigenous_language": "No", "married": "No", "indigenous_identity": "No",
            "education_years": 12, "age": 12
        }"#;
        assert!(serde_json::from_str::<RawResponse>(json).is_err());
    }

    #[test]
    fn test_flipped_changes_only_one_field() {
        let original = RawResponse::default();
        let flipped = original.flipped(BinaryField::IndigenousIdentity);

        assert_eq!(flipped.indigenous_identity, YesNo::Si);
        assert_eq!(original.indigenous_identity, YesNo::No);
        assert_eq!(flipped.flipped(BinaryField::IndigenousIdentity), original);
    }
}
