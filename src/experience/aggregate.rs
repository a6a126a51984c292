use std::collections::HashMap;
use std::hash::Hash;

use chrono::NaiveDate;

use crate::portfolio::{Category, Engagement, Portfolio};

use super::interval::{MonthSpan, engagement_span, union_months};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregatedExperience {
    pub total_months: u32,
    pub engagement_count: u32,
}

pub fn aggregate(engagements: &[Engagement]) -> HashMap<String, AggregatedExperience> {
    aggregate_at(engagements, chrono::Local::now().date_naive())
}

pub fn aggregate_at(
    engagements: &[Engagement],
    today: NaiveDate,
) -> HashMap<String, AggregatedExperience> {
    aggregate_by(engagements, today, |engagement| Some(engagement.item.clone()))
}

pub fn aggregate_categories_at(
    engagements: &[Engagement],
    portfolio: &Portfolio,
    today: NaiveDate,
) -> HashMap<Category, AggregatedExperience> {
    aggregate_by(engagements, today, |engagement| {
        let category = portfolio.category_of(&engagement.item);
        if category.is_none() {
            tracing::debug!(
                item = %engagement.item,
                "engagement for unknown item skipped in category roll-up"
            );
        }
        category
    })
}

pub(crate) fn aggregate_by<K, F>(
    engagements: &[Engagement],
    today: NaiveDate,
    mut key_of: F,
) -> HashMap<K, AggregatedExperience>
where
    K: Eq + Hash,
    F: FnMut(&Engagement) -> Option<K>,
{
    let mut groups: HashMap<K, (Vec<MonthSpan>, u32)> = HashMap::new();
    for engagement in engagements {
        let Some(key) = key_of(engagement) else {
            continue;
        };
        let (spans, count) = groups.entry(key).or_default();
        spans.push(engagement_span(engagement, today));
        *count += 1;
    }

    groups
        .into_iter()
        .map(|(key, (mut spans, engagement_count))| {
            let total_months = union_months(&mut spans);
            (
                key,
                AggregatedExperience {
                    total_months,
                    engagement_count,
                },
            )
        })
        .collect()
}
