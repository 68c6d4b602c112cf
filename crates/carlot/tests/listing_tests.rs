use carlot::store::{ContentStore, MediaStore, TaxonomyStore};
use carlot::*;

async fn publish(stores: &Stores, count: usize) {
    for i in 1..=count {
        stores
            .content
            .create(&format!("Car {}", i), PostStatus::Published)
            .await
            .unwrap();
    }
}

fn page_links(html: &str) -> usize {
    html.matches("class=\"page-numbers\"").count()
}

#[tokio::test]
async fn test_empty_listing_renders_literal_message() {
    let stores = Stores::in_memory();
    let html = render_listing(&stores, ListingQuery::default()).await.unwrap();
    assert_eq!(html, "No cars found.");
}

#[tokio::test]
async fn test_drafts_are_not_listed() {
    let stores = Stores::in_memory();
    stores
        .content
        .create("Unpublished", PostStatus::Draft)
        .await
        .unwrap();

    let html = render_listing(&stores, ListingQuery::default()).await.unwrap();
    assert_eq!(html, "No cars found.");
}

#[tokio::test]
async fn test_page_links_match_page_count() {
    // (records, page size, expected links)
    let cases = [(3, 10, 0), (10, 10, 0), (11, 10, 2), (25, 5, 5), (7, 3, 3)];

    for (records, page_size, expected) in cases {
        let stores = Stores::in_memory();
        publish(&stores, records).await;

        let query = ListingQuery {
            page: 1,
            page_size,
        };
        let html = render_listing(&stores, query).await.unwrap();
        assert_eq!(
            page_links(&html),
            expected,
            "{} records at {} per page",
            records,
            page_size
        );
        if expected == 0 {
            assert!(!html.contains("?page="));
        }
    }
}

#[tokio::test]
async fn test_second_page_offsets_results() {
    let stores = Stores::in_memory();
    publish(&stores, 5).await;

    let html = render_listing(
        &stores,
        ListingQuery {
            page: 2,
            page_size: 2,
        },
    )
    .await
    .unwrap();

    // Newest first: page 1 holds Car 5 and Car 4
    assert!(html.contains("<h2>Car 3</h2>"));
    assert!(html.contains("<h2>Car 2</h2>"));
    assert!(!html.contains("<h2>Car 5</h2>"));
    assert!(html.contains("href=\"?page=2\" aria-current=\"page\""));
    assert!(html.contains("href=\"?page=3\""));
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let stores = Stores::in_memory();
    publish(&stores, 2).await;

    let html = render_listing(
        &stores,
        ListingQuery {
            page: 4,
            page_size: 10,
        },
    )
    .await
    .unwrap();
    assert_eq!(html, "No cars found.");
}

#[tokio::test]
async fn test_listing_shows_terms_and_thumbnail() {
    let stores = Stores::in_memory();
    let toyota = stores
        .taxonomy
        .create_term(TaxonomyCategory::Make, "Toyota")
        .await
        .unwrap();
    let lexus = stores
        .taxonomy
        .create_term(TaxonomyCategory::Make, "Lexus")
        .await
        .unwrap();
    let hybrid = stores
        .taxonomy
        .create_term(TaxonomyCategory::FuelType, "Hybrid")
        .await
        .unwrap();

    let record = stores
        .content
        .create("Prius <Special>", PostStatus::Published)
        .await
        .unwrap();
    stores
        .content
        .assign_terms(record, TaxonomyCategory::Make, &[toyota, lexus])
        .await
        .unwrap();
    stores
        .content
        .assign_terms(record, TaxonomyCategory::FuelType, &[hybrid])
        .await
        .unwrap();

    let media = stores
        .media
        .upload(record, UploadedFile::new("prius.png", "image/png", vec![1]))
        .await
        .unwrap();
    stores.media.set_thumbnail(record, media).await.unwrap();

    let html = render_listing(&stores, ListingQuery::default()).await.unwrap();

    assert!(html.contains("<h2>Prius &lt;Special&gt;</h2>"));
    assert!(html.contains(&format!("src=\"/media/{}\"", media)));
    assert!(html.contains("<p>Make: Toyota, Lexus</p>"));
    assert!(html.contains("<p>Model: </p>"));
    assert!(html.contains("<p>Fuel Type: Hybrid</p>"));
    // Launch year is not part of the listing
    assert!(!html.contains("Launch Year"));
}
