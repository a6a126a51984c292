pub mod config;
pub mod experience;
pub mod field;
pub mod portfolio;
pub mod selection;
pub mod sim;
pub mod sizing;
pub mod sphere;
pub mod summary;
pub mod viewport;

pub use config::FieldConfig;
pub use field::{Field, FieldEvent};
pub use portfolio::{Category, Engagement, EngagementEnd, Item, Portfolio};
pub use selection::{HoverState, SelectionIntent, SelectionState, ShareState};
pub use sim::{NodeFrame, Simulation, TickOutcome};
pub use viewport::Dimensions;
