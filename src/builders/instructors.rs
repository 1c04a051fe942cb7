use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use super::{check_envelope, splice_file, BuildContext, BuildError, BuildReport, Builder};
use crate::fitdegree::records::{normalize_instructors, InstructorDenylist};
use crate::render::grid;

pub const PAGE: &str = "instructors.html";
pub const PLACEHOLDER: &str = "<!-- INSTRUCTORS_STATIC -->";

const TARGET: &str = "instructors";

/// Instructor grid, plus one detail page per instructor when enabled
pub struct InstructorsBuilder;

#[async_trait]
impl Builder for InstructorsBuilder {
    fn name(&self) -> &'static str {
        TARGET
    }

    async fn build(&self, ctx: &BuildContext) -> Result<BuildReport, BuildError> {
        let builders = &ctx.config.builders;

        let payload = match builders.instructors_api_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                info!(url, "reading instructors from pack endpoint");
                let json = ctx.fetch_external(TARGET, url).await?;
                if json.get("ok") != Some(&serde_json::Value::Bool(true)) {
                    let message = json
                        .get("error")
                        .and_then(|e| e.as_str())
                        .unwrap_or("Unknown error")
                        .to_string();
                    return Err(BuildError::Envelope {
                        target: TARGET,
                        message,
                    });
                }
                json
            }
            _ => {
                let fetched = ctx.service.instructors().await?;
                check_envelope(TARGET, &fetched.payload)?;
                fetched.payload
            }
        };

        let denylist = InstructorDenylist::from_config(&ctx.config.instructors);
        let mut roster = normalize_instructors(&payload, &denylist);

        // Detail pages live at instructors/<slug>/, so slugs must be unique
        let mut seen = HashSet::new();
        for instructor in &mut roster.visible {
            if !seen.insert(instructor.slug.clone()) {
                instructor.slug = format!("{}-{}", instructor.slug, instructor.id);
                seen.insert(instructor.slug.clone());
            }
        }

        let detail = builders.generate_instructor_detail_pages;
        let mut cards = Vec::with_capacity(roster.visible.len());
        let mut pages = Vec::new();

        for instructor in &roster.visible {
            let href = format!("/instructors/{}/", instructor.slug);
            cards.push(
                ctx.renderer
                    .instructor_card(instructor, detail.then_some(href.as_str()))?,
            );

            if detail {
                let canonical = ctx
                    .config
                    .site_origin()
                    .map(|origin| format!("{}{}", origin, href));
                let html = ctx
                    .renderer
                    .instructor_page(instructor, canonical.as_deref())?;
                let path = ctx
                    .publish_dir
                    .join("instructors")
                    .join(&instructor.slug)
                    .join("index.html");
                pages.push((path, html));
            }
        }

        let grid_html = ctx.renderer.grid(
            grid::INSTRUCTORS,
            &cards,
            "Our instructor team is coming soon. Please check back soon.",
        )?;

        let page = ctx.page_path(PAGE);
        splice_file(&page, &[(PLACEHOLDER, grid_html)])?;

        let mut extra_files: Vec<PathBuf> = Vec::with_capacity(pages.len());
        for (path, html) in pages {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).map_err(|source| BuildError::WriteFile {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&path, html).map_err(|source| BuildError::WriteFile {
                path: path.clone(),
                source,
            })?;
            extra_files.push(path);
        }
        if detail {
            info!(count = extra_files.len(), "wrote instructor detail pages");
        }

        Ok(BuildReport {
            target: TARGET,
            page,
            rendered: roster.visible.len(),
            fetched: roster.total,
            extra_files,
        })
    }
}
