//! Car entry submission handling
//!
//! A submission moves through three stages:
//! - [`RawSubmission`]: whatever the request carried, every field optional
//! - [`CarEntry`]: token verified, required fields present, values coerced
//! - a stored [`CarRecord`](crate::entities::CarRecord) with terms and thumbnail
//!
//! Every rejection is a [`SubmissionError`]; none are retried.

use crate::entities::{PostStatus, RecordId, TaxonomyCategory, TermId, UploadedFile};
use crate::error::{ProcessError, SubmissionError};
use crate::form::fields;
use crate::sanitize::{coerce_term_id, sanitize_text_field};
use crate::store::Stores;
use crate::token::{CAR_ENTRY_PURPOSE, TokenSigner};
use tracing::{debug, info, warn};

/// Confirmation shown after a successful submission
pub const SUCCESS_MESSAGE: &str = "Car added successfully.";

/// Form fields exactly as received
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub car_name: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub fuel_type: Option<String>,
    pub launch_year: Option<String>,
    pub image: Option<UploadedFile>,
    pub csrf_token: Option<String>,
}

/// A verified submission ready to be stored
#[derive(Debug, Clone)]
pub struct CarEntry {
    /// Sanitized car name
    pub name: String,
    pub make: TermId,
    pub model: TermId,
    pub fuel_type: TermId,
    pub launch_year: TermId,
    pub image: UploadedFile,
}

impl CarEntry {
    /// Requested term per category
    pub fn terms(&self) -> [(TaxonomyCategory, TermId); 4] {
        [
            (TaxonomyCategory::Make, self.make),
            (TaxonomyCategory::Model, self.model),
            (TaxonomyCategory::FuelType, self.fuel_type),
            (TaxonomyCategory::LaunchYear, self.launch_year),
        ]
    }
}

/// Result of a stored submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub record: RecordId,
    pub message: &'static str,
}

impl RawSubmission {
    /// Check the token and required fields, then sanitize and coerce
    ///
    /// The token is checked first, so a forged request learns nothing about
    /// field validation. Launch year is not required here; an empty one
    /// coerces to `TermId(0)` and is dropped at assignment.
    pub fn validate(self, signer: &TokenSigner) -> Result<CarEntry, SubmissionError> {
        signer
            .verify(CAR_ENTRY_PURPOSE, self.csrf_token.as_deref())
            .map_err(SubmissionError::InvalidToken)?;

        let mut missing = Vec::new();
        let car_name = require(self.car_name, fields::CAR_NAME, &mut missing);
        let make = require(self.make, fields::MAKE, &mut missing);
        let model = require(self.model, fields::MODEL, &mut missing);
        let fuel_type = require(self.fuel_type, fields::FUEL_TYPE, &mut missing);
        if self.image.is_none() {
            missing.push(fields::IMAGE);
        }

        let (Some(car_name), Some(make), Some(model), Some(fuel_type), Some(image)) =
            (car_name, make, model, fuel_type, self.image)
        else {
            return Err(SubmissionError::MissingFields { fields: missing });
        };

        Ok(CarEntry {
            name: sanitize_text_field(&car_name),
            make: coerce_term_id(&make),
            model: coerce_term_id(&model),
            fuel_type: coerce_term_id(&fuel_type),
            launch_year: coerce_term_id(self.launch_year.as_deref().unwrap_or_default()),
            image,
        })
    }
}

/// Keep a value that counts as filled in
///
/// An empty string and a bare `"0"` both count as missing.
fn require(
    value: Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() && v != "0" => Some(v),
        _ => {
            missing.push(name);
            None
        }
    }
}

/// Validate and store one submission
///
/// The duplicate check and the insert are separate store calls, so two
/// concurrent submissions with the same name can both succeed unless the
/// content store itself refuses the second insert.
///
/// If the image upload fails the record has already been created and is kept.
pub async fn handle_submission(
    stores: &Stores,
    signer: &TokenSigner,
    raw: RawSubmission,
) -> Result<Submitted, ProcessError> {
    let entry = raw.validate(signer).inspect_err(|e| {
        debug!("Rejected car submission: {:?}", e);
    })?;

    if stores.content.exists_by_title(&entry.name).await? {
        info!("Rejected duplicate car name: {}", entry.name);
        return Err(SubmissionError::DuplicateName(entry.name).into());
    }

    let record = stores
        .content
        .create(&entry.name, PostStatus::Published)
        .await
        .map_err(|e| {
            warn!("Failed to insert car record '{}': {}", entry.name, e);
            SubmissionError::InsertFailed(e)
        })?;
    info!("Created car record {} ({})", record, entry.name);

    for (category, term) in entry.terms() {
        assign_term(stores, record, category, term).await?;
    }

    if entry.image.is_supplied() {
        let media = stores
            .media
            .upload(record, entry.image)
            .await
            .map_err(|e| {
                warn!("Image upload failed for car record {}: {}", record, e);
                SubmissionError::UploadFailed(e)
            })?;

        stores
            .media
            .set_thumbnail(record, media)
            .await
            .map_err(SubmissionError::UploadFailed)?;
        debug!("Attached media {} to car record {}", media, record);
    }

    Ok(Submitted {
        record,
        message: SUCCESS_MESSAGE,
    })
}

/// Assign a term if it exists in the category, otherwise leave the category empty
async fn assign_term(
    stores: &Stores,
    record: RecordId,
    category: TaxonomyCategory,
    term: TermId,
) -> Result<(), ProcessError> {
    match stores.taxonomy.get_term(term).await? {
        Some(found) if found.category == category => {
            stores.content.assign_terms(record, category, &[term]).await?;
        }
        _ => {
            warn!(
                "Skipping unknown {} term {} for car record {}",
                category, term, record
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SubmissionErrorKind, TokenError};

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret")
    }

    fn complete(signer: &TokenSigner) -> RawSubmission {
        RawSubmission {
            car_name: Some("  Tesla <i>Model S</i> ".to_string()),
            make: Some("1".to_string()),
            model: Some("2".to_string()),
            fuel_type: Some("3".to_string()),
            launch_year: Some("4".to_string()),
            image: Some(UploadedFile::new("s.png", "image/png", vec![0u8; 4])),
            csrf_token: Some(signer.issue(CAR_ENTRY_PURPOSE)),
        }
    }

    #[test]
    fn test_validate_sanitizes_and_coerces() {
        let signer = signer();
        let entry = complete(&signer).validate(&signer).unwrap();

        assert_eq!(entry.name, "Tesla Model S");
        assert_eq!(entry.make, TermId(1));
        assert_eq!(entry.launch_year, TermId(4));
    }

    #[test]
    fn test_validate_token_checked_before_fields() {
        let signer = signer();
        let raw = RawSubmission {
            csrf_token: Some("forged".to_string()),
            ..Default::default()
        };

        let err = raw.validate(&signer).unwrap_err();
        assert_eq!(err.kind(), SubmissionErrorKind::InvalidToken);
        assert!(matches!(
            err,
            SubmissionError::InvalidToken(TokenError::Mismatch(_))
        ));
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let signer = signer();
        let raw = RawSubmission {
            car_name: Some(String::new()),
            csrf_token: Some(signer.issue(CAR_ENTRY_PURPOSE)),
            ..Default::default()
        };

        match raw.validate(&signer) {
            Err(SubmissionError::MissingFields { fields }) => assert_eq!(
                fields,
                vec!["carName", "make", "model", "fuelType", "image"]
            ),
            other => panic!("Expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_zero_counts_as_missing() {
        let signer = signer();
        let mut raw = complete(&signer);
        raw.make = Some("0".to_string());

        match raw.validate(&signer) {
            Err(SubmissionError::MissingFields { fields }) => assert_eq!(fields, vec!["make"]),
            other => panic!("Expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_launch_year_optional() {
        let signer = signer();
        let mut raw = complete(&signer);
        raw.launch_year = None;

        let entry = raw.validate(&signer).unwrap();
        assert_eq!(entry.launch_year, TermId(0));
    }
}
