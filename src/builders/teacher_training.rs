use async_trait::async_trait;

use super::{check_envelope, splice_file, BuildContext, BuildError, BuildReport, Builder};
use crate::fitdegree::records::normalize_class_types;

pub const PAGE: &str = "teacher-training.html";
pub const PLACEHOLDER: &str = "<!-- TRAINING_STATIC -->";

const TARGET: &str = "teacher-training";

/// Enough group classes to filter locally
const FETCH_LIMIT: u32 = 100;

/// Teacher-training cards. The page already wraps the token in a grid, so
/// only the cards are inserted.
pub struct TeacherTrainingBuilder;

#[async_trait]
impl Builder for TeacherTrainingBuilder {
    fn name(&self) -> &'static str {
        TARGET
    }

    async fn build(&self, ctx: &BuildContext) -> Result<BuildReport, BuildError> {
        let builders = &ctx.config.builders;

        let fetched = ctx.service.group_classes(FETCH_LIMIT).await?;
        check_envelope(TARGET, &fetched.payload)?;

        let classes = normalize_class_types(&fetched.payload);
        let training: Vec<_> = classes
            .iter()
            .filter(|c| c.mentions(&builders.training_keyword))
            .take(builders.training_limit)
            .collect();

        let cards = training
            .iter()
            .map(|c| ctx.renderer.training_card(c))
            .collect::<Result<Vec<_>, _>>()?;
        let html = ctx.renderer.cards_only(
            &cards,
            "No teacher training items found right now. Please check back soon.",
        )?;

        let page = ctx.page_path(PAGE);
        splice_file(&page, &[(PLACEHOLDER, html)])?;

        Ok(BuildReport {
            target: TARGET,
            page,
            rendered: training.len(),
            fetched: classes.len(),
            extra_files: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::testing::{context, page};
    use crate::fitdegree::MockTransport;

    const CLASSES: &str = r#"{"response":{"success":true,"data":{"items":[
        {"title":"Vinyasa","group_name":"Flow"},
        {"title":"200hr Program","group_name":"Teacher Training","difficulty_text":"Advanced"},
        {"title":"Mentorship","description":"Part of our teacher training path"}
    ]}}}"#;

    #[tokio::test]
    async fn test_keyword_filter_without_grid() {
        let mock = MockTransport::new().respond("/group-class/", 200, CLASSES);
        let (dir, ctx) = context(&mock, |_| {});
        let path = page(&dir, PAGE, &format!("<div class=\"grid\">{}</div>", PLACEHOLDER));

        let report = TeacherTrainingBuilder.build(&ctx).await.unwrap();
        assert_eq!(report.rendered, 2);
        assert_eq!(report.fetched, 3);

        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.starts_with("<div class=\"grid\"><article class=\"card\">"));
        assert!(html.contains("Teacher Training · Advanced"));
        assert!(html.contains("Mentorship"));
        assert!(!html.contains("Vinyasa"));

        let url = mock.requests.lock().unwrap()[0].url.clone();
        assert!(url.contains("limit=100"));
    }

    #[tokio::test]
    async fn test_empty_keyword_keeps_all() {
        let mock = MockTransport::new().respond("/group-class/", 200, CLASSES);
        let (dir, ctx) = context(&mock, |config| {
            config.builders.training_keyword = String::new();
            config.builders.training_limit = 2;
        });
        page(&dir, PAGE, PLACEHOLDER);

        let report = TeacherTrainingBuilder.build(&ctx).await.unwrap();
        assert_eq!(report.rendered, 2);
    }

    #[tokio::test]
    async fn test_second_run_fails_and_leaves_file() {
        let mock = MockTransport::new().respond("/group-class/", 200, CLASSES);
        let (dir, ctx) = context(&mock, |_| {});
        let path = page(&dir, PAGE, PLACEHOLDER);

        TeacherTrainingBuilder.build(&ctx).await.unwrap();
        let built = std::fs::read_to_string(&path).unwrap();

        let err = TeacherTrainingBuilder.build(&ctx).await.unwrap_err();
        assert!(matches!(err, BuildError::PlaceholderNotFound { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), built);
    }
}
