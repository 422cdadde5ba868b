//! Form submission models

use empleo_core::logic::features::{Age, EducationYears, Gender, YesNo};
use empleo_core::logic::report::SortKey;
use empleo_core::{BinaryField, RawResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppError;

/// The eight answers as posted by the HTML form or a JSON client
///
/// Selectors deserialize straight into the typed enums, so an unknown
/// option is rejected before any handler runs.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictionForm {
    pub head_of_household: YesNo,
    pub gender: Gender,
    pub rural: YesNo,
    pub indigenous_language: YesNo,
    pub married: YesNo,
    pub indigenous_identity: YesNo,

    #[validate(range(min = 0, max = 30, message = "Los años de educación deben estar entre 0 y 30"))]
    pub education_years: i64,

    #[validate(range(min = 15, max = 100, message = "La edad debe estar entre 15 y 100"))]
    pub age: i64,
}

impl PredictionForm {
    /// Validate ranges, then build the core response
    pub fn into_raw(self) -> Result<RawResponse, AppError> {
        self.validate()?;
        RawResponse::try_from(self)
    }
}

impl TryFrom<PredictionForm> for RawResponse {
    type Error = AppError;

    fn try_from(form: PredictionForm) -> Result<Self, Self::Error> {
        Ok(RawResponse {
            head_of_household: form.head_of_household,
            gender: form.gender,
            rural: form.rural,
            indigenous_language: form.indigenous_language,
            married: form.married,
            indigenous_identity: form.indigenous_identity,
            education_years: EducationYears::new(form.education_years)
                .map_err(|e| AppError::ValidationError(e.to_string()))?,
            age: Age::new(form.age).map_err(|e| AppError::ValidationError(e.to_string()))?,
        })
    }
}

/// `POST /api/v1/predict`
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(flatten)]
    pub form: PredictionForm,
    /// Rows to return, defaults to the server setting
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub sort_key: Option<SortKey>,
}

/// `POST /api/v1/compare`
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    #[serde(flatten)]
    pub form: PredictionForm,
    /// Binary answer to flip
    pub flip: BinaryField,
}
