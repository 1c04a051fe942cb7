use async_trait::async_trait;

use super::{check_envelope, splice_file, BuildContext, BuildError, BuildReport, Builder};
use crate::fitdegree::records::{normalize_class_types, normalize_services};
use crate::fitdegree::service::PAGE_SIZE;
use crate::render::grid;

pub const PAGE: &str = "classes-services.html";
pub const CLASS_TYPES_PLACEHOLDER: &str = "<!-- CLASS_TYPES_STATIC -->";
pub const ONE_ON_ONE_PLACEHOLDER: &str = "<!-- ONE_ON_ONE_STATIC -->";

const TARGET: &str = "classes-services";
const EMPTY_MESSAGE: &str = "Nothing to show right now. Please check back soon.";

/// Class types and one-on-one services, spliced into one page
pub struct ClassesServicesBuilder;

#[async_trait]
impl Builder for ClassesServicesBuilder {
    fn name(&self) -> &'static str {
        TARGET
    }

    async fn build(&self, ctx: &BuildContext) -> Result<BuildReport, BuildError> {
        let groups = ctx.service.group_classes(PAGE_SIZE).await?;
        check_envelope(TARGET, &groups.payload)?;

        // Teacher training has its own page
        let all_classes = normalize_class_types(&groups.payload);
        let class_types: Vec<_> = all_classes
            .iter()
            .filter(|c| !c.is_teacher_training())
            .take(ctx.config.builders.class_types_limit)
            .collect();

        let class_cards = class_types
            .iter()
            .map(|c| ctx.renderer.class_card(c))
            .collect::<Result<Vec<_>, _>>()?;
        let classes_html = ctx.renderer.grid(grid::CARDS, &class_cards, EMPTY_MESSAGE)?;

        let services = ctx.service.services().await?;
        check_envelope(TARGET, &services.payload)?;

        let services = normalize_services(&services.payload);
        let service_cards = services
            .iter()
            .map(|s| ctx.renderer.service_card(s))
            .collect::<Result<Vec<_>, _>>()?;
        let services_html = ctx.renderer.grid(grid::CARDS, &service_cards, EMPTY_MESSAGE)?;

        let page = ctx.page_path(PAGE);
        splice_file(
            &page,
            &[
                (CLASS_TYPES_PLACEHOLDER, classes_html),
                (ONE_ON_ONE_PLACEHOLDER, services_html),
            ],
        )?;

        Ok(BuildReport {
            target: TARGET,
            page,
            rendered: class_types.len() + services.len(),
            fetched: all_classes.len() + services.len(),
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
        {"title":"Vinyasa","group_name":"Flow","difficulty_text":"All levels"},
        {"title":"Yin","class_group":{"name":"Restore"}},
        {"title":"200hr Program","group_name":"Teacher Training"}
    ]}}}"#;

    const SERVICES: &str = r#"{"response":{"success":true,"data":{
        "items":[
            {"id":1,"name":"Private Session"},
            {"id":2,"name":"Staff Only","display_on_app":false}
        ],
        "cache":{"ooo_durations":[{"service_id":1,"duration":60,"base_price":7000}]}
    }}}"#;

    fn template() -> String {
        format!(
            "<section>{}</section><section>{}</section>",
            CLASS_TYPES_PLACEHOLDER, ONE_ON_ONE_PLACEHOLDER
        )
    }

    #[tokio::test]
    async fn test_builds_both_sections() {
        let mock = MockTransport::new()
            .respond("/group-class/", 200, CLASSES)
            .respond("/one-on-one/service/", 200, SERVICES);
        let (dir, ctx) = context(&mock, |_| {});
        let path = page(&dir, PAGE, &template());

        let report = ClassesServicesBuilder.build(&ctx).await.unwrap();
        assert_eq!(report.rendered, 3);

        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("Vinyasa"));
        assert!(html.contains("Restore"));
        assert!(!html.contains("200hr Program"));
        assert!(html.contains("Private Session"));
        assert!(html.contains("60 min · $70.00"));
        assert!(!html.contains("Staff Only"));
        assert!(!html.contains(CLASS_TYPES_PLACEHOLDER));
        assert!(!html.contains(ONE_ON_ONE_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_class_types_capped() {
        let mock = MockTransport::new()
            .respond("/group-class/", 200, CLASSES)
            .respond("/one-on-one/service/", 200, SERVICES);
        let (dir, ctx) = context(&mock, |config| config.builders.class_types_limit = 1);
        let path = page(&dir, PAGE, &template());

        ClassesServicesBuilder.build(&ctx).await.unwrap();
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("Vinyasa"));
        assert!(!html.contains("Yin"));
    }

    #[tokio::test]
    async fn test_missing_second_token_writes_nothing() {
        let mock = MockTransport::new()
            .respond("/group-class/", 200, CLASSES)
            .respond("/one-on-one/service/", 200, SERVICES);
        let (dir, ctx) = context(&mock, |_| {});
        let original = format!("<section>{}</section>", CLASS_TYPES_PLACEHOLDER);
        let path = page(&dir, PAGE, &original);

        let err = ClassesServicesBuilder.build(&ctx).await.unwrap_err();
        assert!(
            matches!(err, BuildError::PlaceholderNotFound { ref token, .. } if token == ONE_ON_ONE_PLACEHOLDER)
        );
        assert_eq!(std::fs::read_to_string(path).unwrap(), original);
    }
}
