//! One-time sample data bootstrap

use crate::entities::{PostStatus, TaxonomyCategory, TermId};
use crate::error::{Result, StoreError};
use crate::store::{Stores, TaxonomyStore};
use tracing::{debug, info};

/// Option flag recording that sample data has been seeded
pub const SEEDED_FLAG: &str = "car_management_dummy_data";

const MAKES: [&str; 3] = ["Toyota", "Ford", "BMW"];
const MODELS: [&str; 3] = ["Corolla", "Focus", "3 Series"];
const FUEL_TYPES: [&str; 3] = ["Petrol", "Diesel", "Electric"];
const LAUNCH_YEARS: [&str; 3] = ["2020", "2021", "2022"];
const CAR_TITLES: [&str; 3] = ["Toyota Car", "Ford Car", "BMW Car"];

/// What a seeding run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    AlreadySeeded,
    Seeded { terms: usize, records: usize },
}

/// Populate sample terms and cars unless the seeded flag is already set
///
/// Guarded only by the flag: records created later by visitors do not affect
/// it, and a run interrupted before the flag is written will repeat.
pub async fn seed_sample_data(stores: &Stores) -> Result<SeedOutcome> {
    if stores.options.get_flag(SEEDED_FLAG).await? {
        debug!("Sample data already seeded");
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let taxonomy = stores.taxonomy.as_ref();
    let makes = ensure_terms(taxonomy, TaxonomyCategory::Make, &MAKES).await?;
    let models = ensure_terms(taxonomy, TaxonomyCategory::Model, &MODELS).await?;
    let fuel_types = ensure_terms(taxonomy, TaxonomyCategory::FuelType, &FUEL_TYPES).await?;
    let years = ensure_terms(taxonomy, TaxonomyCategory::LaunchYear, &LAUNCH_YEARS).await?;

    for (i, title) in CAR_TITLES.iter().enumerate() {
        let record = stores.content.create(title, PostStatus::Published).await?;
        let terms = [
            (TaxonomyCategory::Make, makes[i]),
            (TaxonomyCategory::Model, models[i]),
            (TaxonomyCategory::LaunchYear, years[i]),
            (TaxonomyCategory::FuelType, fuel_types[i]),
        ];
        for (category, term) in terms {
            stores.content.assign_terms(record, category, &[term]).await?;
        }
    }

    stores.options.set_flag(SEEDED_FLAG).await?;

    let terms = MAKES.len() + MODELS.len() + FUEL_TYPES.len() + LAUNCH_YEARS.len();
    info!(
        "Seeded {} taxonomy terms and {} car records",
        terms,
        CAR_TITLES.len()
    );
    Ok(SeedOutcome::Seeded {
        terms,
        records: CAR_TITLES.len(),
    })
}

/// Create each term, reusing one that already exists under the same name
async fn ensure_terms(
    taxonomy: &dyn TaxonomyStore,
    category: TaxonomyCategory,
    names: &[&str],
) -> Result<Vec<TermId>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let id = match taxonomy.create_term(category, name).await {
            Ok(id) => id,
            Err(StoreError::TermExists { existing, .. }) => existing,
            Err(e) => return Err(e),
        };
        ids.push(id);
    }
    Ok(ids)
}
