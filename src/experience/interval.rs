use chrono::{Datelike, NaiveDate};

use crate::portfolio::{Engagement, EngagementEnd};

// Months since year 0, so spans compare and subtract as plain integers.
pub(crate) fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Half-open span of whole months: `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MonthSpan {
    pub(crate) start: i64,
    pub(crate) end: i64,
}

impl MonthSpan {
    pub(crate) fn len(self) -> u32 {
        u32::try_from((self.end - self.start).max(0)).unwrap_or(u32::MAX)
    }

    pub(crate) fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

pub(crate) fn engagement_span(engagement: &Engagement, today: NaiveDate) -> MonthSpan {
    let start = month_index(engagement.start);
    let last = match engagement.end {
        EngagementEnd::On(end) => month_index(end),
        EngagementEnd::Present => month_index(today),
    };

    if last < start {
        tracing::warn!(
            item = %engagement.item,
            start = %engagement.start,
            "engagement ends before it starts, counting zero months"
        );
        return MonthSpan { start, end: start };
    }

    // The starting month counts, so a same-month engagement is one month long.
    MonthSpan {
        start,
        end: last + 1,
    }
}

pub(crate) fn union_months(spans: &mut Vec<MonthSpan>) -> u32 {
    spans.retain(|span| !span.is_empty());
    if spans.is_empty() {
        return 0;
    }
    spans.sort_unstable();

    let mut total = 0u32;
    let mut current = spans[0];
    for &next in &spans[1..] {
        if next.start <= current.end {
            current.end = current.end.max(next.end);
        } else {
            total = total.saturating_add(current.len());
            current = next;
        }
    }
    total.saturating_add(current.len())
}
