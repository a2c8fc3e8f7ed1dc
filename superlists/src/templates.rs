//! HTML templates, compiled into the binary and rendered with minijinja.
//!
//! `.html` templates are auto-escaped, so user-entered item text and email addresses are safe
//! to interpolate.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;
use std::sync::Arc;

use crate::errors::Error;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("list.html", include_str!("../templates/list.html")),
];

#[derive(Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    /// Load the embedded templates, failing on syntax errors.
    pub fn new() -> Result<Self, Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source).map_err(|e| Error::Internal {
                operation: format!("load template {name}: {e}"),
            })?;
        }

        Ok(Self { env: Arc::new(env) })
    }

    pub fn render<C: Serialize>(&self, name: &str, context: C) -> Result<Html<String>, Error> {
        let template = self.env.get_template(name).map_err(|e| Error::Internal {
            operation: format!("find template {name}: {e}"),
        })?;

        template.render(context).map(Html).map_err(|e| Error::Internal {
            operation: format!("render template {name}: {e:#}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_home_page_has_new_item_form() {
        let templates = Templates::new().unwrap();
        let Html(html) = templates.render("home.html", context! {}).unwrap();

        assert!(html.contains("<title>To-Do lists</title>"));
        assert!(html.contains("Start a new To-Do list"));
        assert!(html.contains(r#"action="/lists/new""#));
        assert!(html.contains(r#"name="text""#));
        assert!(html.contains(r#"id="id_text""#));
        assert!(!html.contains("has-error"));
    }

    #[test]
    fn test_list_page_numbers_items() {
        let templates = Templates::new().unwrap();
        let items = vec![context! { text => "Buy peacock feathers" }, context! { text => "Make a fly" }];
        let Html(html) = templates.render("list.html", context! { list_id => 7, items }).unwrap();

        assert!(html.contains(r#"action="/lists/7/""#));
        assert!(html.contains("1: Buy peacock feathers"));
        assert!(html.contains("2: Make a fly"));
    }

    #[test]
    fn test_item_text_is_escaped() {
        let templates = Templates::new().unwrap();
        let items = vec![context! { text => "<script>alert(1)</script>" }];
        let Html(html) = templates.render("list.html", context! { list_id => 1, items }).unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_navbar_for_logged_in_user() {
        let templates = Templates::new().unwrap();
        let Html(html) = templates
            .render("home.html", context! { user => context! { email => "edith@example.com" } })
            .unwrap();

        assert!(html.contains("Logged in as edith@example.com"));
        assert!(html.contains("Log out"));
        assert!(!html.contains(r#"name="email""#));
    }

    #[test]
    fn test_error_and_messages_render() {
        let templates = Templates::new().unwrap();
        let messages = vec![context! { level => "error", message => "Invalid email" }];
        let Html(html) = templates
            .render("home.html", context! { error => "You can't have an empty list item", messages })
            .unwrap();

        assert!(html.contains("has-error"));
        assert!(html.contains("have an empty list item"));
        assert!(html.contains("alert-error"));
        assert!(html.contains("Invalid email"));
    }
}
