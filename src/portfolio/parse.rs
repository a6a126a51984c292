use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use super::model::{Category, Engagement, EngagementEnd, Item, Portfolio};

#[derive(Clone, Debug, Deserialize)]
struct RawPortfolio {
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    engagements: Vec<RawEngagement>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawItem {
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    parent: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawEngagement {
    item: String,
    start: String,
    #[serde(default)]
    end: Option<String>,
}

pub(super) fn parse_portfolio(raw: &str) -> Result<Portfolio> {
    let parsed: RawPortfolio = serde_json::from_str(raw).context("invalid portfolio JSON")?;

    let items = parsed
        .items
        .into_iter()
        .filter(|item| !item.name.trim().is_empty())
        .map(|item| {
            let category = Category::parse(&item.category).unwrap_or_else(|| {
                tracing::warn!(item = %item.name, category = %item.category, "unknown category");
                Category::Tooling
            });
            let icon = if item.icon.trim().is_empty() {
                default_icon_key(&item.name)
            } else {
                item.icon
            };
            Item {
                name: item.name.trim().to_owned(),
                category,
                icon,
                parent: item
                    .parent
                    .map(|parent| parent.trim().to_owned())
                    .filter(|parent| !parent.is_empty()),
            }
        })
        .collect::<Vec<_>>();

    let engagements = parsed
        .engagements
        .into_iter()
        .filter_map(|raw| {
            let Some(start) = parse_month_date(&raw.start) else {
                tracing::warn!(item = %raw.item, start = %raw.start, "unparseable start date");
                return None;
            };
            let end = match raw.end.as_deref().map(str::trim) {
                None | Some("") => {
                    tracing::warn!(
                        item = %raw.item,
                        "engagement without end, treating as present"
                    );
                    EngagementEnd::Present
                }
                Some(value) if value.eq_ignore_ascii_case("present") => EngagementEnd::Present,
                Some(value) => match parse_month_date(value) {
                    Some(date) => EngagementEnd::On(date),
                    None => {
                        tracing::warn!(item = %raw.item, end = value, "unparseable end date");
                        return None;
                    }
                },
            };
            Some(Engagement::new(raw.item.trim(), start, end))
        })
        .collect::<Vec<_>>();

    Ok(Portfolio::new(items, engagements))
}

pub(super) fn parse_month_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d"))
        .ok()
}

pub(super) fn default_icon_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}
