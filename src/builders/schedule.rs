use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, NaiveTime};

use super::{check_envelope, splice_file, BuildContext, BuildError, BuildReport, Builder};
use crate::fitdegree::records::{normalize_schedule, Collection};
use crate::render::grid;

pub const PAGE: &str = "book.html";
pub const PLACEHOLDER: &str = "<!-- SCHEDULE_STATIC -->";

const TARGET: &str = "schedule";

/// Upcoming classes on the booking page
pub struct ScheduleBuilder;

impl ScheduleBuilder {
    /// Today at midnight through `days_ahead` days later
    pub fn window(ctx: &BuildContext) -> Result<(NaiveDateTime, NaiveDateTime), BuildError> {
        let start = ctx.today.and_time(NaiveTime::MIN);
        let days_ahead = ctx.config.builders.schedule_days_ahead;
        let end = Duration::try_days(i64::from(days_ahead))
            .and_then(|span| start.checked_add_signed(span))
            .ok_or(BuildError::Window { days_ahead })?;
        Ok((start, end))
    }
}

#[async_trait]
impl Builder for ScheduleBuilder {
    fn name(&self) -> &'static str {
        TARGET
    }

    async fn build(&self, ctx: &BuildContext) -> Result<BuildReport, BuildError> {
        let (start, end) = Self::window(ctx)?;
        let fetched = ctx.service.schedule(start, end).await?;
        check_envelope(TARGET, &fetched.payload)?;

        let total = Collection::find(&fetched.payload).items.len();
        let upcoming: Vec<_> = normalize_schedule(&fetched.payload)
            .into_iter()
            .take(ctx.config.builders.schedule_card_limit)
            .collect();

        let cards = upcoming
            .iter()
            .map(|item| ctx.renderer.schedule_card(item))
            .collect::<Result<Vec<_>, _>>()?;
        let html = ctx.renderer.grid(
            grid::CARDS,
            &cards,
            "No upcoming classes found right now. Please check back soon.",
        )?;

        let page = ctx.page_path(PAGE);
        splice_file(&page, &[(PLACEHOLDER, html)])?;

        Ok(BuildReport {
            target: TARGET,
            page,
            rendered: upcoming.len(),
            fetched: total,
            extra_files: Vec::new(),
        })
    }
}
