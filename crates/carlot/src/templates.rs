//! HTML templates for the entry form and the listing
//!
//! The markup lives in standalone files next to this module and is included
//! as string constants. Every interpolated value is HTML-escaped.

use minijinja::{AutoEscape, Environment, Error};
use serde::Serialize;

pub const ENTRY_FORM_TEMPLATE: &str = include_str!("templates/entry_form.html");
pub const LISTING_TEMPLATE: &str = include_str!("templates/listing.html");
pub const PAGINATION_TEMPLATE: &str = include_str!("templates/pagination.html");

/// Render one template source against `data`
pub(crate) fn render<S: Serialize>(
    name: &'static str,
    source: &'static str,
    data: S,
) -> Result<String, Error> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);

    env.add_template(name, source)?;
    let tmpl = env.get_template(name)?;
    tmpl.render(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Item {
        title: &'static str,
    }

    #[test]
    fn test_render_escapes_values() {
        let html = render(
            "item.html",
            "<h2>{{ title }}</h2>",
            Item {
                title: "Tom's & <Jerry>",
            },
        )
        .unwrap();
        assert!(html.contains("&amp; &lt;Jerry&gt;</h2>"));
        assert!(!html.contains("Tom's"));
    }

    #[test]
    fn test_render_reports_syntax_errors() {
        let result = render("broken.html", "{% for %}", Item { title: "x" });
        assert!(result.is_err());
    }
}
