//! Car entry form rendering

use crate::entities::{TaxonomyCategory, Term};
use crate::error::RenderError;
use crate::store::TaxonomyStore;
use crate::templates::{self, ENTRY_FORM_TEMPLATE};
use serde::Serialize;

/// Form field names shared by the renderer and the submission parser
pub mod fields {
    pub const CAR_NAME: &str = "carName";
    pub const MAKE: &str = "make";
    pub const MODEL: &str = "model";
    pub const FUEL_TYPE: &str = "fuelType";
    pub const LAUNCH_YEAR: &str = "launchYear";
    pub const IMAGE: &str = "image";
    pub const CSRF_TOKEN: &str = "csrfToken";
}

/// One taxonomy-backed input of the form
#[derive(Serialize)]
struct TermGroup {
    name: &'static str,
    label: &'static str,
    terms: Vec<Term>,
}

#[derive(Serialize)]
struct FormContext<'a> {
    token: &'a str,
    make: TermGroup,
    model: TermGroup,
    fuel_type: TermGroup,
    launch_year: TermGroup,
}

/// Render the car entry form
///
/// Options come from the current taxonomy terms; an empty category renders an
/// empty option list. `token` is embedded as the hidden anti-forgery field.
pub async fn render_entry_form(
    taxonomy: &dyn TaxonomyStore,
    token: &str,
) -> Result<String, RenderError> {
    let context = FormContext {
        token,
        make: term_group(taxonomy, fields::MAKE, TaxonomyCategory::Make).await?,
        model: term_group(taxonomy, fields::MODEL, TaxonomyCategory::Model).await?,
        fuel_type: term_group(taxonomy, fields::FUEL_TYPE, TaxonomyCategory::FuelType).await?,
        launch_year: term_group(taxonomy, fields::LAUNCH_YEAR, TaxonomyCategory::LaunchYear)
            .await?,
    };

    Ok(templates::render(
        "entry_form.html",
        ENTRY_FORM_TEMPLATE,
        context,
    )?)
}

async fn term_group(
    taxonomy: &dyn TaxonomyStore,
    name: &'static str,
    category: TaxonomyCategory,
) -> Result<TermGroup, RenderError> {
    Ok(TermGroup {
        name,
        label: category.label(),
        terms: taxonomy.list_terms(category).await?,
    })
}
