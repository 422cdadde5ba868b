//! Feature Encoder
//!
//! RawResponse → FeatureVector. Pure and total: every enumerated answer has an
//! explicit encoding and there is no fallback branch.

use super::response::{Gender, RawResponse, YesNo};
use super::vector::{FeatureVector, FeatureVectorBuilder};

fn encode_yes_no(answer: YesNo) -> f32 {
    match answer {
        YesNo::Si => 1.0,
        YesNo::No => 0.0,
    }
}

fn encode_gender(gender: Gender) -> f32 {
    match gender {
        Gender::Hombre => 1.0,
        Gender::Mujer => 0.0,
    }
}

/// Encode one submission in the layout order the classifier was trained on
pub fn encode(response: &RawResponse) -> FeatureVector {
    let male = encode_gender(response.gender);
    let married = encode_yes_no(response.married);
    let age = f32::from(response.age.get());

    FeatureVectorBuilder::new()
        .head_of_household(encode_yes_no(response.head_of_household))
        .male(male)
        .rural(encode_yes_no(response.rural))
        .education_years(f32::from(response.education_years.get()))
        .age(age)
        .age_squared(age * age)
        .indigenous_language(encode_yes_no(response.indigenous_language))
        // both operands are exactly 0.0 or 1.0, so the product is their AND
        .male_and_married(male * married)
        .married(married)
        .indigenous_identity(encode_yes_no(response.indigenous_identity))
        .build()
}
