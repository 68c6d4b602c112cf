use async_trait::async_trait;
use carlot::store::{
    ContentStore, MediaStore, MemoryContentStore, MemoryMediaStore, MemoryOptionStore,
    MemoryTaxonomyStore, TaxonomyStore,
};
use carlot::*;
use std::sync::Arc;
use tokio::sync::Barrier;

struct Fixture {
    stores: Stores,
    content: Arc<MemoryContentStore>,
    media: Arc<MemoryMediaStore>,
    signer: TokenSigner,
    make: TermId,
    model: TermId,
    fuel_type: TermId,
    launch_year: TermId,
}

async fn fixture() -> Fixture {
    let taxonomy = Arc::new(MemoryTaxonomyStore::new());
    let content = Arc::new(MemoryContentStore::new());
    let media = Arc::new(MemoryMediaStore::new());

    let make = taxonomy
        .create_term(TaxonomyCategory::Make, "Tesla")
        .await
        .unwrap();
    let model = taxonomy
        .create_term(TaxonomyCategory::Model, "Model S")
        .await
        .unwrap();
    let fuel_type = taxonomy
        .create_term(TaxonomyCategory::FuelType, "Electric")
        .await
        .unwrap();
    let launch_year = taxonomy
        .create_term(TaxonomyCategory::LaunchYear, "2022")
        .await
        .unwrap();

    let stores = Stores::new(
        taxonomy,
        content.clone(),
        media.clone(),
        Arc::new(MemoryOptionStore::new()),
    );

    Fixture {
        stores,
        content,
        media,
        signer: TokenSigner::new("integration-secret"),
        make,
        model,
        fuel_type,
        launch_year,
    }
}

fn tesla(f: &Fixture) -> RawSubmission {
    RawSubmission {
        car_name: Some("Tesla Model S".to_string()),
        make: Some(f.make.to_string()),
        model: Some(f.model.to_string()),
        fuel_type: Some(f.fuel_type.to_string()),
        launch_year: Some(f.launch_year.to_string()),
        image: Some(UploadedFile::new(
            "model-s.jpg",
            "image/jpeg",
            b"\xff\xd8\xff".to_vec(),
        )),
        csrf_token: Some(f.signer.issue(CAR_ENTRY_PURPOSE)),
    }
}

fn rejection(result: std::result::Result<Submitted, ProcessError>) -> SubmissionError {
    match result {
        Err(ProcessError::Rejected(e)) => e,
        other => panic!("Expected a rejected submission, got {:?}", other),
    }
}

#[tokio::test]
async fn test_valid_submission_creates_one_record() {
    let f = fixture().await;

    let submitted = handle_submission(&f.stores, &f.signer, tesla(&f))
        .await
        .unwrap();
    assert_eq!(submitted.message, "Car added successfully.");

    let records = f.content.find_by_title("Tesla Model S");
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.id, submitted.record);
    assert_eq!(record.status, PostStatus::Published);
    assert_eq!(record.terms_in(TaxonomyCategory::Make), &[f.make]);
    assert_eq!(record.terms_in(TaxonomyCategory::Model), &[f.model]);
    assert_eq!(record.terms_in(TaxonomyCategory::FuelType), &[f.fuel_type]);
    assert_eq!(record.terms_in(TaxonomyCategory::LaunchYear), &[f.launch_year]);

    let thumbnail = f.stores.media.thumbnail(record.id).await.unwrap().unwrap();
    assert_eq!(thumbnail.file_name, "model-s.jpg");
}

#[tokio::test]
async fn test_repeated_submission_is_duplicate() {
    let f = fixture().await;

    handle_submission(&f.stores, &f.signer, tesla(&f))
        .await
        .unwrap();
    let err = rejection(handle_submission(&f.stores, &f.signer, tesla(&f)).await);

    assert_eq!(err.kind(), SubmissionErrorKind::DuplicateName);
    assert_eq!(err.to_string(), "Car name already exists.");
    assert_eq!(err.field(), Some("carName"));
    assert_eq!(f.content.len(), 1);
    assert_eq!(f.media.len(), 1);
}

#[tokio::test]
async fn test_duplicate_check_uses_sanitized_exact_title() {
    let f = fixture().await;
    handle_submission(&f.stores, &f.signer, tesla(&f))
        .await
        .unwrap();

    // Markup and surrounding whitespace are stripped before the lookup
    let mut wrapped = tesla(&f);
    wrapped.car_name = Some("  <b>Tesla Model S</b> ".to_string());
    let err = rejection(handle_submission(&f.stores, &f.signer, wrapped).await);
    assert_eq!(err.kind(), SubmissionErrorKind::DuplicateName);

    // Case differs, so it is a new title
    let mut lower = tesla(&f);
    lower.car_name = Some("tesla model s".to_string());
    handle_submission(&f.stores, &f.signer, lower).await.unwrap();
    assert_eq!(f.content.len(), 2);
}

#[tokio::test]
async fn test_missing_fields_rejected_before_any_mutation() {
    let f = fixture().await;

    let cases = [
        ("carName", None),
        ("carName", Some("")),
        ("carName", Some("0")),
        ("make", None),
        ("make", Some("0")),
        ("model", Some("")),
        ("model", Some("0")),
        ("fuelType", Some("0")),
        ("fuelType", None),
        ("image", None),
    ];

    for (field, value) in cases {
        let mut raw = tesla(&f);
        let value = value.map(str::to_string);
        match field {
            "carName" => raw.car_name = value,
            "make" => raw.make = value,
            "model" => raw.model = value,
            "fuelType" => raw.fuel_type = value,
            _ => raw.image = None,
        }
        let err = rejection(handle_submission(&f.stores, &f.signer, raw).await);
        assert_eq!(err.kind(), SubmissionErrorKind::MissingFields);
        assert_eq!(err.to_string(), "Missing fields.");
    }

    assert!(f.content.is_empty());
    assert!(f.media.is_empty());
}

#[tokio::test]
async fn test_missing_launch_year_alone_is_accepted() {
    let f = fixture().await;
    let mut raw = tesla(&f);
    raw.launch_year = None;

    let submitted = handle_submission(&f.stores, &f.signer, raw).await.unwrap();

    // Coerces to id 0, which names no term, so nothing is assigned
    let record = f.content.get(submitted.record).unwrap();
    assert!(record.terms_in(TaxonomyCategory::LaunchYear).is_empty());
    assert_eq!(record.terms_in(TaxonomyCategory::Make), &[f.make]);
}

#[tokio::test]
async fn test_invalid_token_rejected_regardless_of_fields() {
    let f = fixture().await;

    let mut forged = tesla(&f);
    forged.csrf_token = Some("not-a-real-token".to_string());
    let err = rejection(handle_submission(&f.stores, &f.signer, forged).await);
    assert_eq!(err.kind(), SubmissionErrorKind::InvalidToken);
    assert_eq!(err.to_string(), "Nonce verification failed.");

    // Token failure wins over missing fields
    let empty = RawSubmission::default();
    let err = rejection(handle_submission(&f.stores, &f.signer, empty).await);
    assert_eq!(err.kind(), SubmissionErrorKind::InvalidToken);

    // A token from another secret is rejected too
    let mut foreign = tesla(&f);
    foreign.csrf_token = Some(TokenSigner::new("other").issue(CAR_ENTRY_PURPOSE));
    let err = rejection(handle_submission(&f.stores, &f.signer, foreign).await);
    assert_eq!(err.kind(), SubmissionErrorKind::InvalidToken);

    assert!(f.content.is_empty());
}

#[tokio::test]
async fn test_term_from_wrong_category_is_not_assigned() {
    let f = fixture().await;
    let mut raw = tesla(&f);
    // A model id submitted as the make
    raw.make = Some(f.model.to_string());

    let submitted = handle_submission(&f.stores, &f.signer, raw).await.unwrap();
    let record = f.content.get(submitted.record).unwrap();
    assert!(record.terms_in(TaxonomyCategory::Make).is_empty());
    assert_eq!(record.terms_in(TaxonomyCategory::Model), &[f.model]);
}

#[tokio::test]
async fn test_name_sanitized_to_empty_fails_insert() {
    let f = fixture().await;
    let mut raw = tesla(&f);
    raw.car_name = Some("<em></em>   ".to_string());

    let err = rejection(handle_submission(&f.stores, &f.signer, raw).await);
    assert_eq!(err.kind(), SubmissionErrorKind::InsertFailed);
    assert_eq!(err.to_string(), "Failed to add car.");
    assert!(f.content.is_empty());
}

#[tokio::test]
async fn test_upload_failure_keeps_created_record() {
    let f = fixture().await;
    let mut raw = tesla(&f);
    raw.image = Some(UploadedFile::new("notes.txt", "text/plain", b"hello".to_vec()));

    let err = rejection(handle_submission(&f.stores, &f.signer, raw).await);
    assert_eq!(err.kind(), SubmissionErrorKind::UploadFailed);
    assert!(err.to_string().starts_with("Failed to upload image: "));

    // No rollback: the record exists, with its terms but without a thumbnail
    let records = f.content.find_by_title("Tesla Model S");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].terms_in(TaxonomyCategory::Make), &[f.make]);
    assert!(
        f.stores
            .media
            .thumbnail(records[0].id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_blank_file_part_skips_upload() {
    let f = fixture().await;
    let mut raw = tesla(&f);
    raw.image = Some(UploadedFile::new("", "application/octet-stream", Vec::new()));

    let submitted = handle_submission(&f.stores, &f.signer, raw).await.unwrap();
    assert!(f.media.is_empty());
    assert!(
        f.stores
            .media
            .thumbnail(submitted.record)
            .await
            .unwrap()
            .is_none()
    );
}

/// Content store whose title lookups wait until both racing requests have looked
struct RacingContent {
    inner: MemoryContentStore,
    barrier: Barrier,
}

#[async_trait]
impl ContentStore for RacingContent {
    async fn exists_by_title(&self, title: &str) -> carlot::Result<bool> {
        let exists = self.inner.exists_by_title(title).await?;
        self.barrier.wait().await;
        Ok(exists)
    }

    async fn create(&self, title: &str, status: PostStatus) -> carlot::Result<RecordId> {
        self.inner.create(title, status).await
    }

    async fn assign_terms(
        &self,
        id: RecordId,
        category: TaxonomyCategory,
        terms: &[TermId],
    ) -> carlot::Result<()> {
        self.inner.assign_terms(id, category, terms).await
    }

    async fn query_published(&self, offset: u64, limit: u64) -> carlot::Result<Page<CarRecord>> {
        self.inner.query_published(offset, limit).await
    }
}

#[tokio::test]
async fn test_concurrent_duplicates_both_pass_uniqueness_check() {
    let f = fixture().await;
    let racing = Arc::new(RacingContent {
        inner: MemoryContentStore::new(),
        barrier: Barrier::new(2),
    });
    let stores = Stores {
        content: racing.clone(),
        ..f.stores.clone()
    };

    // The check-then-insert sequence is not atomic; the store does not refuse
    // the second insert, so both requests create a record.
    let (first, second) = tokio::join!(
        handle_submission(&stores, &f.signer, tesla(&f)),
        handle_submission(&stores, &f.signer, tesla(&f)),
    );
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(racing.inner.find_by_title("Tesla Model S").len(), 2);
}
