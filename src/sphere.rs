//! Golden-angle (Fibonacci lattice) placement of items on a sphere, used by the
//! rotating sphere mode instead of the force field.

use std::f64::consts::PI;

use eframe::egui::{Vec2, vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpherePoint {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
    /// Rotation about the vertical axis, degrees.
    pub rotate_y: f64,
    /// Elevation, degrees.
    pub rotate_x: f64,
    /// 0.0 at the front pole, 1.0 at the back. Rounded to two decimals so every
    /// renderer derives identical front/back styling from the same input.
    pub depth: f64,
}

impl SpherePoint {
    fn from_unit(index: usize, x: f64, y: f64, z: f64, radius: f64) -> Self {
        Self {
            index,
            x,
            y,
            z,
            radius,
            rotate_y: z.atan2(x).to_degrees(),
            rotate_x: y.clamp(-1.0, 1.0).asin().to_degrees(),
            depth: round2((1.0 - z) / 2.0),
        }
    }

    pub fn transform(&self) -> String {
        format!(
            "rotateY({:.2}deg) rotateX({:.2}deg) translateZ({:.2}px)",
            self.rotate_y, self.rotate_x, self.radius
        )
    }

    // Screen offset after spinning the sphere by `spin` radians about the
    // vertical axis; the returned depth follows the spun point.
    pub fn project(&self, spin: f32) -> (Vec2, f32) {
        let (sin, cos) = f64::from(spin).sin_cos();
        let x = self.x * cos - self.z * sin;
        let z = self.x * sin + self.z * cos;
        let depth = round2((1.0 - z) / 2.0) as f32;
        (vec2((x * self.radius) as f32, (-self.y * self.radius) as f32), depth)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn pole_epsilon(count: usize) -> f64 {
    match count {
        0..24 => 0.33,
        24..177 => 1.33,
        177..890 => 3.33,
        _ => 10.0,
    }
}

pub fn golden_angle() -> f64 {
    PI * (3.0 - 5.0_f64.sqrt())
}

pub fn distribute(count: usize, radius: f64) -> Vec<SpherePoint> {
    let radius = if radius.is_finite() && radius > 0.0 {
        radius
    } else {
        tracing::debug!(radius, "invalid sphere radius, collapsing to the center");
        0.0
    };

    match count {
        0 => Vec::new(),
        // The lattice formula divides by zero at n = 1; pin the lone point to the front.
        1 => vec![SpherePoint::from_unit(0, 0.0, 0.0, 1.0, radius)],
        _ => {
            let epsilon = pole_epsilon(count);
            let golden = golden_angle();
            let denominator = (count - 1) as f64 + 2.0 * epsilon;

            (0..count)
                .map(|index| {
                    let i = index as f64;
                    let y = 1.0 - ((i + epsilon) / denominator) * 2.0;
                    let horizontal = (1.0 - y * y).max(0.0).sqrt();
                    let theta = i * golden;
                    SpherePoint::from_unit(
                        index,
                        theta.cos() * horizontal,
                        y,
                        theta.sin() * horizontal,
                        radius,
                    )
                })
                .collect()
        }
    }
}

// Smallest great-circle angle between any two points, radians.
pub fn min_angular_separation(points: &[SpherePoint]) -> f64 {
    let mut best = f64::INFINITY;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let dot = (a.x * b.x + a.y * b.y + a.z * b.z).clamp(-1.0, 1.0);
            best = best.min(dot.acos());
        }
    }
    best
}
