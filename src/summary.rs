use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::Vec2;

use crate::experience::ExperienceTable;
use crate::portfolio::Category;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub category: Category,
    pub months: u32,
    /// Screen-space angles in radians, clockwise from 12 o'clock.
    pub start_angle: f32,
    pub end_angle: f32,
}

impl Segment {
    pub fn share(&self) -> f32 {
        (self.end_angle - self.start_angle) / TAU
    }

    fn covers(&self, angle: f32) -> bool {
        angle >= self.start_angle && angle < self.end_angle
    }
}

/// Category breakdown drawn as a ring around the root node. The active segment
/// grows outward to twice the ring width; the inner edge never moves.
#[derive(Clone, Debug, PartialEq)]
pub struct RootSummary {
    pub inner_radius: f32,
    pub ring_width: f32,
    pub total_months: u32,
    pub segments: Vec<Segment>,
}

impl RootSummary {
    pub fn build(table: &ExperienceTable, root_radius: f32, ring_width: f32) -> Self {
        let months = Category::ALL
            .into_iter()
            .map(|category| (category, table.category(category).total_months))
            .filter(|(_, months)| *months > 0)
            .collect::<Vec<_>>();
        let total_months = months.iter().map(|(_, months)| *months).sum::<u32>();

        let mut segments = Vec::with_capacity(months.len());
        let mut cursor = 0.0_f32;
        for (category, months) in months {
            let sweep = TAU * months as f32 / total_months as f32;
            segments.push(Segment {
                category,
                months,
                start_angle: cursor,
                end_angle: cursor + sweep,
            });
            cursor += sweep;
        }
        // Close the ring exactly despite accumulated rounding.
        if let Some(last) = segments.last_mut() {
            last.end_angle = TAU;
        }

        Self {
            inner_radius: root_radius.max(0.0),
            ring_width: ring_width.max(0.0),
            total_months,
            segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn thickness(&self, category: Category, active: Option<Category>) -> f32 {
        if active == Some(category) {
            self.ring_width * 2.0
        } else {
            self.ring_width
        }
    }

    pub fn outer_radius(&self, active: Option<Category>) -> f32 {
        let widest = self
            .segments
            .iter()
            .map(|segment| self.thickness(segment.category, active))
            .fold(0.0, f32::max);
        self.inner_radius + widest
    }

    /// Hit-tests an offset from the root center against the ring.
    pub fn segment_at(&self, offset: Vec2, active: Option<Category>) -> Option<&Segment> {
        let distance = offset.length();
        if !distance.is_finite() || distance < self.inner_radius {
            return None;
        }
        let angle = screen_angle(offset);
        self.segments.iter().find(|segment| {
            segment.covers(angle)
                && distance <= self.inner_radius + self.thickness(segment.category, active)
        })
    }
}

// Clockwise from straight up, in [0, TAU). Screen y grows downward.
fn screen_angle(offset: Vec2) -> f32 {
    (offset.y.atan2(offset.x) + FRAC_PI_2).rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{Engagement, EngagementEnd, Item, Portfolio};
    use chrono::NaiveDate;
    use eframe::egui::vec2;

    fn ymd(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).expect("valid date")
    }

    fn table() -> ExperienceTable {
        let item = |name: &str, category| Item {
            name: name.to_owned(),
            category,
            icon: String::new(),
            parent: None,
        };
        let portfolio = Portfolio::new(
            vec![
                item("Rust", Category::Backend),
                item("React", Category::Frontend),
            ],
            vec![
                Engagement::new("Rust", ymd(2020, 1), EngagementEnd::On(ymd(2022, 12))),
                Engagement::new("React", ymd(2021, 1), EngagementEnd::On(ymd(2021, 12))),
            ],
        );
        ExperienceTable::build(&portfolio, ymd(2024, 1))
    }

    #[test]
    fn segments_are_proportional_and_close_the_ring() {
        let summary = RootSummary::build(&table(), 60.0, 10.0);
        assert_eq!(summary.total_months, 48);
        assert_eq!(summary.segments.len(), 2);

        let frontend = &summary.segments[0];
        assert_eq!(frontend.category, Category::Frontend);
        assert!((frontend.share() - 0.25).abs() < 1e-5);
        assert_eq!(summary.segments[1].end_angle, TAU);
    }

    #[test]
    fn active_segment_grows_outward() {
        let summary = RootSummary::build(&table(), 60.0, 10.0);
        assert_eq!(summary.outer_radius(None), 70.0);
        assert_eq!(summary.outer_radius(Some(Category::Backend)), 80.0);
        assert_eq!(summary.thickness(Category::Frontend, Some(Category::Backend)), 10.0);
    }

    #[test]
    fn hit_test_follows_angle_and_thickness() {
        let summary = RootSummary::build(&table(), 60.0, 10.0);
        // Frontend covers the first quarter, 12 to 3 o'clock.
        let upper_right = vec2(45.0, -45.0);
        assert_eq!(
            summary.segment_at(upper_right, None).map(|s| s.category),
            Some(Category::Frontend)
        );
        let left = vec2(-65.0, 0.0);
        assert_eq!(
            summary.segment_at(left, None).map(|s| s.category),
            Some(Category::Backend)
        );

        let beyond = vec2(-75.0, 0.0);
        assert!(summary.segment_at(beyond, None).is_none());
        assert!(summary.segment_at(beyond, Some(Category::Backend)).is_some());
        assert!(summary.segment_at(vec2(10.0, 0.0), None).is_none());
    }

    #[test]
    fn empty_table_has_no_ring() {
        let portfolio = Portfolio::default();
        let table = ExperienceTable::build(&portfolio, ymd(2024, 1));
        let summary = RootSummary::build(&table, 60.0, 10.0);
        assert!(summary.is_empty());
        assert_eq!(summary.outer_radius(None), 60.0);
        assert!(summary.segment_at(vec2(65.0, 0.0), None).is_none());
    }
}
