//! HTML fragments for the static pages.
//!
//! Templates are embedded at compile time. Text values are escaped
//! (`& < > "`); fragments that are already HTML are inserted with triple
//! braces.

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::fitdegree::records::{ClassType, Instructor, ScheduleItem, Service};

const TEMPLATES: &[(&str, &str)] = &[
    ("instructor_card", include_str!("templates/instructor_card.hbs")),
    ("instructor_page", include_str!("templates/instructor_page.hbs")),
    ("schedule_card", include_str!("templates/schedule_card.hbs")),
    ("class_card", include_str!("templates/class_card.hbs")),
    ("service_card", include_str!("templates/service_card.hbs")),
    ("grid", include_str!("templates/grid.hbs")),
    ("empty", include_str!("templates/empty.hbs")),
];

/// Where the detail pages link back to
pub const INSTRUCTORS_PAGE_HREF: &str = "/instructors.html";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid template '{name}': {source}")]
    Template {
        name: &'static str,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("failed to render '{name}': {source}")]
    Render {
        name: &'static str,
        #[source]
        source: Box<handlebars::RenderError>,
    },
}

/// Escape text for HTML element content and double-quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Grid wrapper classes used by the pages
pub mod grid {
    pub const INSTRUCTORS: &str = "grid cols-3 instructor-grid";
    pub const CARDS: &str = "grid cols-3";
}

pub struct SiteRenderer {
    handlebars: Handlebars<'static>,
    studio_name: String,
    brand_name: String,
}

impl SiteRenderer {
    pub fn new(site: &SiteConfig) -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(escape_html);

        for &(name, source) in TEMPLATES {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| RenderError::Template {
                    name,
                    source: Box::new(e),
                })?;
        }

        Ok(Self {
            handlebars,
            studio_name: site.studio_name.clone(),
            brand_name: site.brand_name.clone(),
        })
    }

    fn render<T: Serialize>(&self, name: &'static str, data: &T) -> Result<String, RenderError> {
        self.handlebars
            .render(name, data)
            .map(|html| html.trim().to_string())
            .map_err(|e| RenderError::Render {
                name,
                source: Box::new(e),
            })
    }

    pub fn instructor_card(
        &self,
        instructor: &Instructor,
        detail_href: Option<&str>,
    ) -> Result<String, RenderError> {
        self.render(
            "instructor_card",
            &json!({
                "name": display_name(&instructor.full_name, "Instructor"),
                "bio": instructor.about,
                "image_url": instructor.image_url,
                "detail_href": detail_href,
            }),
        )
    }

    /// Full standalone page for one instructor
    pub fn instructor_page(
        &self,
        instructor: &Instructor,
        canonical: Option<&str>,
    ) -> Result<String, RenderError> {
        let mut html = self.render(
            "instructor_page",
            &json!({
                "name": display_name(&instructor.full_name, "Instructor"),
                "bio": instructor.about,
                "image_url": instructor.image_url,
                "canonical": canonical,
                "back_href": INSTRUCTORS_PAGE_HREF,
                "studio": self.studio_name,
                "brand": self.brand_name,
            }),
        )?;
        html.push('\n');
        Ok(html)
    }

    pub fn schedule_card(&self, item: &ScheduleItem) -> Result<String, RenderError> {
        self.render(
            "schedule_card",
            &json!({
                "title": display_name(&item.title, "Class"),
                "when": item.when,
                "instructor": item.instructor_name,
                "description": item.description,
                "book_href": item.book_href,
            }),
        )
    }

    pub fn class_card(&self, class: &ClassType) -> Result<String, RenderError> {
        self.render(
            "class_card",
            &json!({
                "title": display_name(&class.title, "Class"),
                "group": class.group_name,
                "difficulty": class.difficulty,
                "description": class.description,
                "cta": "See Schedule",
            }),
        )
    }

    pub fn training_card(&self, class: &ClassType) -> Result<String, RenderError> {
        self.render(
            "class_card",
            &json!({
                "title": display_name(&class.title, "Training"),
                "group": display_name(&class.group_name, "Teacher Training"),
                "difficulty": class.difficulty,
                "description": class.description,
                "cta": "View Schedule / Book",
            }),
        )
    }

    pub fn service_card(&self, service: &Service) -> Result<String, RenderError> {
        self.render(
            "service_card",
            &json!({
                "name": display_name(&service.name, "Service"),
                "image_url": service.image_url,
                "price_line": service.price_line(),
                "description": service.description,
            }),
        )
    }

    /// Cards wrapped in a grid, or `empty_message` when there are none
    pub fn grid(
        &self,
        class: &str,
        cards: &[String],
        empty_message: &str,
    ) -> Result<String, RenderError> {
        if cards.is_empty() {
            return self.empty(empty_message);
        }
        self.render("grid", &json!({ "class": class, "cards": cards }))
    }

    /// Cards joined without a wrapper, for pages that supply their own grid
    pub fn cards_only(&self, cards: &[String], empty_message: &str) -> Result<String, RenderError> {
        if cards.is_empty() {
            return self.empty(empty_message);
        }
        Ok(cards.join("\n"))
    }

    pub fn empty(&self, message: &str) -> Result<String, RenderError> {
        self.render("empty", &json!({ "message": message }))
    }
}

fn display_name<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
