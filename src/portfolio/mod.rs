mod model;
mod parse;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub use model::{Category, Engagement, EngagementEnd, Item, Portfolio};

impl Portfolio {
    pub fn from_json(raw: &str) -> Result<Self> {
        parse::parse_portfolio(raw)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read portfolio {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("failed to parse portfolio {}", path.display()))
    }
}
