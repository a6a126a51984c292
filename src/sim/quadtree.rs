use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 10;

#[derive(Clone, Copy, Debug)]
pub(super) struct Region {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Region {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for point in points.iter().filter(|point| point.is_finite()) {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = point - self.center;
        offset.x.abs() <= self.half_extent && offset.y.abs() <= self.half_extent
    }

    // Distance from `point` to the nearest edge of the square, zero inside.
    pub(super) fn distance_to(self, point: Vec2) -> f32 {
        let offset = point - self.center;
        let dx = (offset.x.abs() - self.half_extent).max(0.0);
        let dy = (offset.y.abs() - self.half_extent).max(0.0);
        vec2(dx, dy).length()
    }

    pub(super) fn side(self) -> f32 {
        self.half_extent * 2.0
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign_x = if quadrant & 1 == 0 { -1.0 } else { 1.0 };
        let sign_y = if quadrant & 2 == 0 { -1.0 } else { 1.0 };
        Self {
            center: self.center + vec2(sign_x * quarter, sign_y * quarter),
            half_extent: quarter,
        }
    }
}

/// Barnes–Hut cell. Leaves keep their member indices; every cell keeps the
/// center of mass for repulsion and the largest collision radius below it so
/// collision queries can skip whole cells.
pub(super) struct Cell {
    pub(super) region: Region,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) max_radius: f32,
    pub(super) members: Vec<usize>,
    pub(super) children: [Option<Box<Cell>>; 4],
}

impl Cell {
    pub(super) fn build(positions: &[Vec2], radii: &[f32]) -> Option<Self> {
        let region = Region::enclosing(positions)?;
        let members = (0..positions.len())
            .filter(|&index| positions[index].is_finite())
            .collect::<Vec<_>>();
        Some(Self::build_cell(region, members, positions, radii, 0))
    }

    fn build_cell(
        region: Region,
        members: Vec<usize>,
        positions: &[Vec2],
        radii: &[f32],
        depth: usize,
    ) -> Self {
        let mut center_of_mass = Vec2::ZERO;
        let mut max_radius = 0.0_f32;
        for &index in &members {
            center_of_mass += positions[index];
            max_radius = max_radius.max(radii.get(index).copied().unwrap_or(0.0));
        }
        let mass = members.len() as f32;
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut cell = Self {
            region,
            center_of_mass,
            mass,
            max_radius,
            members,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || cell.members.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &cell.members {
            buckets[region.quadrant_of(positions[index])].push(index);
        }
        // Coincident points would recurse forever; keep them together in one leaf.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            cell.children[quadrant] = Some(Box::new(Self::build_cell(
                region.quadrant(quadrant),
                bucket,
                positions,
                radii,
                depth + 1,
            )));
        }
        cell.members.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &Cell> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_members(cell: &Cell) -> usize {
        cell.members.len() + cell.children().map(count_members).sum::<usize>()
    }

    #[test]
    fn every_point_lands_in_one_leaf() {
        let positions = (0..100)
            .map(|i| vec2((i % 10) as f32 * 13.0, (i / 10) as f32 * 7.0))
            .collect::<Vec<_>>();
        let radii = vec![5.0; positions.len()];

        let root = Cell::build(&positions, &radii).expect("tree");
        assert_eq!(count_members(&root), 100);
        assert_eq!(root.mass, 100.0);
        assert!(!root.is_leaf());
        assert!(positions.iter().all(|p| root.region.contains(*p)));
    }

    #[test]
    fn coincident_points_stay_in_a_leaf() {
        let positions = vec![vec2(3.0, 3.0); 40];
        let radii = vec![2.0; 40];
        let root = Cell::build(&positions, &radii).expect("tree");
        assert!(root.is_leaf());
        assert_eq!(root.members.len(), 40);
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let positions = vec![vec2(0.0, 0.0), vec2(f32::NAN, 1.0), vec2(10.0, 10.0)];
        let radii = vec![1.0, 9.0, 3.0];
        let root = Cell::build(&positions, &radii).expect("tree");
        assert_eq!(root.members, vec![0, 2]);
        assert_eq!(root.max_radius, 3.0);
    }

    #[test]
    fn region_distance() {
        let region = Region {
            center: vec2(0.0, 0.0),
            half_extent: 10.0,
        };
        assert_eq!(region.distance_to(vec2(5.0, 5.0)), 0.0);
        assert_eq!(region.distance_to(vec2(13.0, 14.0)), 5.0);
    }
}
