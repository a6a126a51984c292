mod aggregate;
mod interval;

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::portfolio::{Category, Portfolio};

pub use aggregate::{AggregatedExperience, aggregate, aggregate_at, aggregate_categories_at};

/// Experience lookups built once per mount and passed by reference to sizing,
/// selection and the root summary. Rebuild it to move the evaluation date.
#[derive(Clone, Debug)]
pub struct ExperienceTable {
    evaluated_on: NaiveDate,
    items: HashMap<String, AggregatedExperience>,
    nodes: HashMap<String, AggregatedExperience>,
    categories: HashMap<Category, AggregatedExperience>,
}

impl ExperienceTable {
    pub fn build(portfolio: &Portfolio, today: NaiveDate) -> Self {
        let engagements = &portfolio.engagements;
        let items = aggregate_at(engagements, today);
        // Variants collapse into their parent node, so their months union there.
        let nodes = aggregate::aggregate_by(engagements, today, |engagement| {
            Some(portfolio.canonical_name(&engagement.item).to_owned())
        });
        let categories = aggregate_categories_at(engagements, portfolio, today);

        tracing::debug!(
            items = items.len(),
            nodes = nodes.len(),
            categories = categories.len(),
            %today,
            "experience table built"
        );

        Self {
            evaluated_on: today,
            items,
            nodes,
            categories,
        }
    }

    pub fn evaluated_on(&self) -> NaiveDate {
        self.evaluated_on
    }

    pub fn item(&self, name: &str) -> AggregatedExperience {
        self.items.get(name).copied().unwrap_or_default()
    }

    pub fn node(&self, name: &str) -> AggregatedExperience {
        self.nodes.get(name).copied().unwrap_or_default()
    }

    pub fn category(&self, category: Category) -> AggregatedExperience {
        self.categories.get(&category).copied().unwrap_or_default()
    }

    pub fn node_months<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<f32> {
        names
            .into_iter()
            .map(|name| self.node(name).total_months as f32)
            .collect()
    }
}
