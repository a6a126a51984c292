use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use url::form_urlencoded;

use crate::portfolio::{Category, Portfolio};
use crate::sim::ROOT_ID;

const QUERY_KEY: &str = "query";
const FILTER_KEY: &str = "filter";

/// Selection intent that outlives the view: the `query` and `filter`
/// parameters of a shareable link.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShareState {
    pub query: Option<String>,
    pub filter: Option<String>,
}

impl ShareState {
    pub fn from_search(search: &str) -> Self {
        let search = search.trim().trim_start_matches('?');
        let mut state = Self::default();
        for (key, value) in form_urlencoded::parse(search.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match &*key {
                QUERY_KEY => &mut state.query,
                FILTER_KEY => &mut state.filter,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_owned());
            }
        }
        state
    }

    pub fn to_search(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(query) = &self.query {
            serializer.append_pair(QUERY_KEY, query);
        }
        if let Some(filter) = &self.filter {
            serializer.append_pair(FILTER_KEY, filter);
        }
        serializer.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.filter.is_none()
    }

    pub fn filter_tokens(&self) -> impl Iterator<Item = &str> {
        self.filter
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Applies a click: items toggle the query channel, categories toggle their
    /// own token in the filter channel. Every other token is left alone.
    pub fn toggled(&self, intent: &SelectionIntent, portfolio: &Portfolio) -> Self {
        let mut next = self.clone();
        match intent {
            SelectionIntent::ToggleItem(name) => {
                let active = self.query.as_deref().is_some_and(|query| {
                    query.trim().eq_ignore_ascii_case(name)
                        || best_query_match(portfolio, query).as_deref() == Some(name.as_str())
                });
                next.query = (!active).then(|| name.clone());
            }
            SelectionIntent::ToggleCategory(category) => {
                let mut tokens = self.filter_tokens().collect::<Vec<_>>();
                let before = tokens.len();
                tokens.retain(|token| Category::parse(token) != Some(*category));
                if tokens.len() == before {
                    // The clicked category leads so it owns the category channel.
                    tokens.insert(0, category.label());
                }
                next.filter = (!tokens.is_empty()).then(|| tokens.join(","));
            }
        }
        next
    }
}

/// Locally owned pointer state. Never written to the share state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    pub node: Option<String>,
    pub category: Option<Category>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionIntent {
    ToggleItem(String),
    ToggleCategory(Category),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub active_item: Option<String>,
    pub active_category: Option<Category>,
    /// Nodes scaled up by the persisted selection. Hover never changes this set.
    pub selected: BTreeSet<String>,
}

impl SelectionState {
    pub fn is_highlighted(&self, node: &str) -> bool {
        self.active_item.as_deref() == Some(node) || self.selected.contains(node)
    }
}

#[derive(Default)]
struct Persisted {
    query_item: Option<String>,
    query_category: Option<Category>,
    filter_categories: Vec<Category>,
    filter_items: Vec<String>,
}

impl Persisted {
    fn derive(share: &ShareState, portfolio: &Portfolio) -> Self {
        let mut persisted = Self::default();

        if let Some(query) = share.query.as_deref() {
            persisted.query_item = best_query_match(portfolio, query);
            persisted.query_category = match &persisted.query_item {
                Some(item) => portfolio.category_of(item),
                None => Category::parse(query),
            };
        }

        for token in share.filter_tokens() {
            if let Some(category) = Category::parse(token) {
                if !persisted.filter_categories.contains(&category) {
                    persisted.filter_categories.push(category);
                }
            } else if let Some(item) = portfolio.item_ignore_case(token) {
                let node = portfolio.canonical_name(&item.name).to_owned();
                if !persisted.filter_items.contains(&node) {
                    persisted.filter_items.push(node);
                }
            } else {
                tracing::debug!(token, "filter token matches no category or item");
            }
        }

        persisted
    }

    fn selected(&self, portfolio: &Portfolio) -> BTreeSet<String> {
        let mut selected = self
            .filter_items
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>();
        selected.extend(
            portfolio
                .visual_items()
                .filter(|item| self.filter_categories.contains(&item.category))
                .map(|item| item.name.clone()),
        );
        selected.extend(self.query_item.iter().cloned());
        selected
    }
}

/// Skim score, retried case-insensitively when the exact-case match fails.
pub fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| {
            matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase())
        })
}

// Containment is required; among hits exact beats prefix beats fuzzy score
// beats the shorter name, then alphabetical order.
fn best_query_match(portfolio: &Portfolio, query: &str) -> Option<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let matcher = SkimMatcherV2::default();
    let best = portfolio
        .items
        .iter()
        .filter_map(|item| {
            let name = item.name.to_lowercase();
            if !name.contains(&needle) {
                return None;
            }
            let tier = if name == needle {
                2u8
            } else if name.starts_with(&needle) {
                1
            } else {
                0
            };
            let score = fuzzy_match_score(&matcher, &item.name, query.trim()).unwrap_or(0);
            Some(((tier, score, Reverse(item.name.len())), item.name.as_str()))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))?;

    Some(portfolio.canonical_name(best.1).to_owned())
}

/// Hovered node beats hovered category segment beats the persisted link
/// selection. Within the persisted selection the filter owns the category
/// channel and the query owns the item channel.
pub fn resolve(share: &ShareState, hover: &HoverState, portfolio: &Portfolio) -> SelectionState {
    let persisted = Persisted::derive(share, portfolio);
    let selected = persisted.selected(portfolio);

    let hovered_node = hover
        .node
        .as_deref()
        .filter(|node| *node != ROOT_ID)
        .and_then(|node| portfolio.item(node))
        .map(|item| portfolio.canonical_name(&item.name));

    let (active_item, active_category) = if let Some(node) = hovered_node {
        (Some(node.to_owned()), portfolio.category_of(node))
    } else if let Some(category) = hover.category {
        (None, Some(category))
    } else {
        (
            persisted
                .query_item
                .clone()
                .or_else(|| persisted.filter_items.first().cloned()),
            persisted
                .filter_categories
                .first()
                .copied()
                .or(persisted.query_category),
        )
    };

    SelectionState {
        active_item,
        active_category,
        selected,
    }
}

pub fn click_node(portfolio: &Portfolio, node: &str) -> Option<SelectionIntent> {
    if node == ROOT_ID {
        return None;
    }
    let item = portfolio.item(node)?;
    Some(SelectionIntent::ToggleItem(
        portfolio.canonical_name(&item.name).to_owned(),
    ))
}

pub fn click_category(category: Category) -> SelectionIntent {
    SelectionIntent::ToggleCategory(category)
}

pub fn selection_scales(state: &SelectionState, scale: f32) -> HashMap<String, f32> {
    state
        .selected
        .iter()
        .map(|node| (node.clone(), scale))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Item;

    fn portfolio() -> Portfolio {
        let item = |name: &str, category, parent: Option<&str>| Item {
            name: name.to_owned(),
            category,
            icon: name.to_ascii_lowercase(),
            parent: parent.map(str::to_owned),
        };
        Portfolio::new(
            vec![
                item("Rust", Category::Backend, None),
                item("Go", Category::Backend, None),
                item("Django", Category::Backend, None),
                item("Google Cloud", Category::DevOps, None),
                item("Docker", Category::DevOps, None),
                item("Kubernetes", Category::DevOps, None),
                item("TypeScript", Category::Frontend, None),
                item("Prototype", Category::Frontend, None),
                item("React", Category::Frontend, None),
                item("Next.js", Category::Frontend, Some("React")),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn parses_and_serializes_search() {
        let share = ShareState::from_search("?query=Rust&filter=DevOps%2CData&other=1");
        assert_eq!(share.query.as_deref(), Some("Rust"));
        assert_eq!(share.filter.as_deref(), Some("DevOps,Data"));
        assert_eq!(share.filter_tokens().collect::<Vec<_>>(), vec!["DevOps", "Data"]);
        assert_eq!(share.to_search(), "query=Rust&filter=DevOps%2CData");

        let spaced = ShareState::from_search("query=Google+Cloud&filter=");
        assert_eq!(spaced.query.as_deref(), Some("Google Cloud"));
        assert_eq!(spaced.filter, None);
        assert_eq!(ShareState::default().to_search(), "");
    }

    #[test]
    fn query_and_filter_resolve_independently() {
        let portfolio = portfolio();
        let share = ShareState::from_search("query=Rust&filter=DevOps");
        let state = resolve(&share, &HoverState::default(), &portfolio);

        assert_eq!(state.active_category, Some(Category::DevOps));
        assert_eq!(state.active_item.as_deref(), Some("Rust"));
        assert!(state.selected.contains("Rust"));
        assert!(state.selected.contains("Docker"));
        assert!(state.selected.contains("Kubernetes"));
        assert!(!state.selected.contains("React"));
    }

    #[test]
    fn hover_takes_precedence_without_touching_selection() {
        let portfolio = portfolio();
        let share = ShareState::from_search("query=Rust&filter=DevOps");
        let persisted = resolve(&share, &HoverState::default(), &portfolio);

        let hover = HoverState {
            node: Some("Next.js".to_owned()),
            category: Some(Category::Backend),
        };
        let state = resolve(&share, &hover, &portfolio);
        assert_eq!(state.active_item.as_deref(), Some("React"));
        assert_eq!(state.active_category, Some(Category::Frontend));
        assert_eq!(state.selected, persisted.selected);

        let segment = HoverState {
            node: None,
            category: Some(Category::Backend),
        };
        let state = resolve(&share, &segment, &portfolio);
        assert_eq!(state.active_item, None);
        assert_eq!(state.active_category, Some(Category::Backend));
    }

    #[test]
    fn query_ranking_prefers_exact_then_prefix() {
        let portfolio = portfolio();
        let go = resolve(
            &ShareState::from_search("query=go"),
            &HoverState::default(),
            &portfolio,
        );
        assert_eq!(go.active_item.as_deref(), Some("Go"));

        let typed = resolve(
            &ShareState::from_search("query=TYPE"),
            &HoverState::default(),
            &portfolio,
        );
        assert_eq!(typed.active_item.as_deref(), Some("TypeScript"));
        assert_eq!(typed.active_category, Some(Category::Frontend));
    }

    #[test]
    fn unmatched_query_selects_nothing() {
        let portfolio = portfolio();
        let state = resolve(
            &ShareState::from_search("query=haskell"),
            &HoverState::default(),
            &portfolio,
        );
        assert_eq!(state, SelectionState::default());
    }

    #[test]
    fn filter_items_map_to_their_node() {
        let portfolio = portfolio();
        let state = resolve(
            &ShareState::from_search("filter=next.js,unknown"),
            &HoverState::default(),
            &portfolio,
        );
        assert_eq!(state.active_item.as_deref(), Some("React"));
        assert_eq!(state.active_category, None);
        assert_eq!(state.selected.iter().collect::<Vec<_>>(), vec!["React"]);
    }

    #[test]
    fn clicks_toggle_their_own_channel() {
        let portfolio = portfolio();
        let share = ShareState::from_search("query=Rust&filter=DevOps");

        let intent = click_node(&portfolio, "Docker").expect("intent");
        let next = share.toggled(&intent, &portfolio);
        assert_eq!(next.query.as_deref(), Some("Docker"));
        assert_eq!(next.filter.as_deref(), Some("DevOps"));

        let again = next.toggled(&intent, &portfolio);
        assert_eq!(again.query, None);

        let cleared = share.toggled(&click_category(Category::DevOps), &portfolio);
        assert_eq!(cleared.filter, None);
        assert_eq!(cleared.query.as_deref(), Some("Rust"));

        assert_eq!(click_node(&portfolio, ROOT_ID), None);
        assert_eq!(click_node(&portfolio, "missing"), None);
    }

    #[test]
    fn category_clicks_only_touch_their_own_token() {
        let portfolio = portfolio();
        let share = ShareState::from_search("filter=DevOps,Next.js,Data");

        let off = share.toggled(&click_category(Category::DevOps), &portfolio);
        assert_eq!(off.filter.as_deref(), Some("Next.js,Data"));

        let on = share.toggled(&click_category(Category::Frontend), &portfolio);
        assert_eq!(on.filter.as_deref(), Some("Frontend,DevOps,Next.js,Data"));
        let state = resolve(&on, &HoverState::default(), &portfolio);
        assert_eq!(state.active_category, Some(Category::Frontend));
        assert!(state.selected.contains("TypeScript"));
        assert!(state.selected.contains("Docker"));

        let devops = ShareState::from_search("filter=devops");
        let empty = devops.toggled(&click_category(Category::DevOps), &portfolio);
        assert_eq!(empty.filter, None);
    }

    #[test]
    fn item_click_toggles_off_a_partial_query_hit() {
        let portfolio = portfolio();
        let share = ShareState::from_search("query=ru&filter=DevOps");
        let state = resolve(&share, &HoverState::default(), &portfolio);
        assert_eq!(state.active_item.as_deref(), Some("Rust"));

        let intent = click_node(&portfolio, "Rust").expect("intent");
        let next = share.toggled(&intent, &portfolio);
        assert_eq!(next.query, None);
        assert_eq!(next.filter.as_deref(), Some("DevOps"));

        let other = click_node(&portfolio, "Go").expect("intent");
        assert_eq!(share.toggled(&other, &portfolio).query.as_deref(), Some("Go"));
    }

    #[test]
    fn scales_cover_selected_nodes_only() {
        let portfolio = portfolio();
        let state = resolve(
            &ShareState::from_search("filter=DevOps"),
            &HoverState::default(),
            &portfolio,
        );
        let scales = selection_scales(&state, 1.25);
        assert_eq!(scales.len(), 3);
        assert_eq!(scales.get("Docker"), Some(&1.25));
        assert_eq!(scales.get("Rust"), None);
    }
}
