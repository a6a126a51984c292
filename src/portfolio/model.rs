use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Frontend,
    Backend,
    DevOps,
    Data,
    Mobile,
    Tooling,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::Frontend,
        Self::Backend,
        Self::DevOps,
        Self::Data,
        Self::Mobile,
        Self::Tooling,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Frontend => "Frontend",
            Self::Backend => "Backend",
            Self::DevOps => "DevOps",
            Self::Data => "Data",
            Self::Mobile => "Mobile",
            Self::Tooling => "Tooling",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub category: Category,
    pub icon: String,
    pub parent: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngagementEnd {
    On(NaiveDate),
    Present,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Engagement {
    pub item: String,
    pub start: NaiveDate,
    pub end: EngagementEnd,
}

impl Engagement {
    pub fn new(item: impl Into<String>, start: NaiveDate, end: EngagementEnd) -> Self {
        Self {
            item: item.into(),
            start,
            end,
        }
    }
}

const MAX_PARENT_DEPTH: usize = 16;

#[derive(Clone, Debug, Default)]
pub struct Portfolio {
    pub items: Vec<Item>,
    pub engagements: Vec<Engagement>,
    index_by_name: HashMap<String, usize>,
}

impl Portfolio {
    pub fn new(items: Vec<Item>, engagements: Vec<Engagement>) -> Self {
        let mut kept = Vec::with_capacity(items.len());
        let mut index_by_name = HashMap::with_capacity(items.len());
        for item in items {
            if index_by_name.contains_key(&item.name) {
                tracing::warn!(item = %item.name, "duplicate item name, keeping the first entry");
                continue;
            }
            index_by_name.insert(item.name.clone(), kept.len());
            kept.push(item);
        }

        Self {
            items: kept,
            engagements,
            index_by_name,
        }
    }

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.index_by_name
            .get(name)
            .and_then(|&index| self.items.get(index))
    }

    pub fn item_ignore_case(&self, name: &str) -> Option<&Item> {
        self.item(name).or_else(|| {
            self.items
                .iter()
                .find(|item| item.name.eq_ignore_ascii_case(name.trim()))
        })
    }

    // Walks parent links up to the item that owns a visual node.
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        let mut current = name;
        let mut seen = HashSet::from([name]);

        for _ in 0..MAX_PARENT_DEPTH {
            let Some(item) = self.item(current) else {
                return current;
            };
            let Some(parent) = item.parent.as_deref() else {
                return current;
            };
            if self.item(parent).is_none() {
                tracing::warn!(item = %current, parent, "unmatched parent reference");
                return current;
            }
            if !seen.insert(parent) {
                tracing::warn!(item = %name, "cyclic parent references");
                return name;
            }
            current = parent;
        }

        current
    }

    pub fn owns_node(&self, item: &Item) -> bool {
        self.canonical_name(&item.name) == item.name
    }

    pub fn visual_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| self.owns_node(item))
    }

    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.item(name).map(|item| item.category)
    }
}
