use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl Default for SizeRange {
    fn default() -> Self {
        Self { min: 1.0, max: 3.0 }
    }
}

impl SizeRange {
    pub fn midpoint(self) -> f32 {
        (self.min + self.max) * 0.5
    }
}

fn observed_bounds(all_values: &[f32]) -> Option<(f32, f32)> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &value in all_values.iter().filter(|value| value.is_finite()) {
        min = min.min(value);
        max = max.max(value);
    }
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

// Position of `value` inside the observed distribution. All-equal and empty
// distributions sit at the midpoint instead of dividing by zero.
pub fn normalized(value: f32, all_values: &[f32]) -> f32 {
    let Some((min, max)) = observed_bounds(all_values) else {
        return 0.5;
    };
    let span = max - min;
    if span <= f32::EPSILON {
        return 0.5;
    }
    if !value.is_finite() {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

pub fn scale_factor(value: f32, all_values: &[f32], range: SizeRange) -> f32 {
    let t = normalized(value, all_values);
    range.min + t * (range.max - range.min)
}

/// Buckets the normalized value into `levels` equal-width tiers, `0..levels`.
pub fn scale_level(value: f32, all_values: &[f32], levels: usize) -> usize {
    if levels <= 1 {
        return 0;
    }
    let t = normalized(value, all_values);
    ((t * levels as f32).floor() as usize).min(levels - 1)
}

pub fn node_radius(base_radius: f32, factor: f32, min_radius: f32) -> f32 {
    let radius = base_radius * factor;
    if radius.is_finite() {
        radius.max(min_radius)
    } else {
        min_radius
    }
}
