//! Per-component statistics, the shape filter and circle candidates.

use std::collections::TryReserveError;
use std::f64::consts::PI;

use chroma_circles_core::LabelView;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Smallest pixel count a candidate may have.
const MIN_AREA_PX: u64 = 4;
/// Smallest bounding-box side a candidate may have.
const MIN_SIDE_PX: u32 = 2;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("failed to allocate component statistics")]
    Alloc(#[from] TryReserveError),
}

/// Bounding box, pixel count and coordinate sums of one label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentStats {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub area: u64,
    pub sum_x: u64,
    pub sum_y: u64,
    /// At least one pixel carried this label.
    pub seen: bool,
}

impl Default for ComponentStats {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl ComponentStats {
    pub const EMPTY: Self = Self {
        min_x: u32::MAX,
        min_y: u32::MAX,
        max_x: 0,
        max_y: 0,
        area: 0,
        sum_x: 0,
        sum_y: 0,
        seen: false,
    };

    #[inline]
    pub fn add(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.area += 1;
        self.sum_x += u64::from(x);
        self.sum_y += u64::from(y);
        self.seen = true;
    }

    /// Bounding-box width; `0` for an unseen label.
    #[inline]
    pub fn width(&self) -> u32 {
        if self.seen {
            self.max_x - self.min_x + 1
        } else {
            0
        }
    }

    #[inline]
    pub fn height(&self) -> u32 {
        if self.seen {
            self.max_y - self.min_y + 1
        } else {
            0
        }
    }

    /// `min(w, h) / max(w, h)` of the bounding box.
    pub fn aspect(&self) -> f64 {
        let (w, h) = (self.width(), self.height());
        if w == 0 || h == 0 {
            return 0.0;
        }
        f64::from(w.min(h)) / f64::from(w.max(h))
    }

    /// Fraction of the bounding box covered by the component.
    pub fn extent(&self) -> f64 {
        let box_area = u64::from(self.width()) * u64::from(self.height());
        if box_area == 0 {
            return 0.0;
        }
        self.area as f64 / box_area as f64
    }

    /// Pixel-count weighted centroid; `None` for an unseen label.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.area == 0 {
            return None;
        }
        let a = self.area as f64;
        Some(Point2::new(self.sum_x as f64 / a, self.sum_y as f64 / a))
    }
}

/// Accumulate statistics for labels `1..num_labels` in one pass.
///
/// Index `0` of the result is the background bucket and stays empty. Pixels
/// whose label lies outside `1..num_labels` are ignored.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(labels), fields(width = labels.width, height = labels.height))
)]
pub fn compute_component_stats(
    labels: &LabelView<'_>,
    num_labels: usize,
) -> Result<Vec<ComponentStats>, StatsError> {
    let mut stats = Vec::new();
    stats.try_reserve_exact(num_labels)?;
    stats.resize(num_labels, ComponentStats::EMPTY);

    for (y, row) in labels.rows().enumerate() {
        for (x, &label) in row.iter().enumerate() {
            if label <= 0 || label as usize >= num_labels {
                continue;
            }
            stats[label as usize].add(x as u32, y as u32);
        }
    }
    Ok(stats)
}

/// Why a component was not accepted as a circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    Unseen,
    TooFewPixels,
    ThinBox,
    Aspect,
    Extent,
    AreaRange,
}

/// Geometric acceptance rules for circle candidates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeFilter {
    /// Expected diameter range in full-resolution pixels.
    pub min_diameter: f64,
    pub max_diameter: f64,
    /// Minimum `min(w, h) / max(w, h)` of the bounding box.
    pub aspect_min: f64,
    /// Minimum `area / (w * h)`.
    pub extent_min: f64,
}

impl Default for ShapeFilter {
    fn default() -> Self {
        Self {
            min_diameter: 6.0,
            max_diameter: 200.0,
            aspect_min: 0.8,
            extent_min: 0.6,
        }
    }
}

impl ShapeFilter {
    /// Disk area for `min_diameter`.
    pub fn min_area(&self) -> f64 {
        disk_area(self.min_diameter)
    }

    /// Disk area for `max_diameter`.
    pub fn max_area(&self) -> f64 {
        disk_area(self.max_diameter)
    }

    /// First failing rule, checked in order: seen, pixel count, box sides,
    /// aspect, extent, area range.
    pub fn rejection(&self, stats: &ComponentStats) -> Option<Rejection> {
        if !stats.seen {
            return Some(Rejection::Unseen);
        }
        if stats.area < MIN_AREA_PX {
            return Some(Rejection::TooFewPixels);
        }
        if stats.width() < MIN_SIDE_PX || stats.height() < MIN_SIDE_PX {
            return Some(Rejection::ThinBox);
        }
        if stats.aspect() < self.aspect_min {
            return Some(Rejection::Aspect);
        }
        if stats.extent() < self.extent_min {
            return Some(Rejection::Extent);
        }
        let area = stats.area as f64;
        if area < self.min_area() || area > self.max_area() {
            return Some(Rejection::AreaRange);
        }
        None
    }

    #[inline]
    pub fn accepts(&self, stats: &ComponentStats) -> bool {
        self.rejection(stats).is_none()
    }
}

fn disk_area(diameter: f64) -> f64 {
    let r = 0.5 * diameter;
    PI * r * r
}

/// A component accepted as a circle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleCandidate {
    /// Centroid in full-resolution pixel coordinates.
    pub center: Point2<f32>,
    /// Radius of the disk with the same area.
    pub radius: f32,
    /// Pixel count.
    pub area: f64,
}

impl Default for CircleCandidate {
    fn default() -> Self {
        Self {
            center: Point2::origin(),
            radius: 0.0,
            area: 0.0,
        }
    }
}

impl CircleCandidate {
    /// `None` for a label with no pixels.
    pub fn from_stats(stats: &ComponentStats) -> Option<Self> {
        let c = stats.centroid()?;
        let area = stats.area as f64;
        Some(Self {
            center: Point2::new(c.x as f32, c.y as f32),
            radius: (area / PI).sqrt() as f32,
            area,
        })
    }
}

/// Sort by strictly descending area; equal areas keep no particular order.
pub fn sort_by_area_desc(candidates: &mut [CircleCandidate]) {
    candidates.sort_unstable_by(|a, b| b.area.total_cmp(&a.area));
}

/// Write accepted components of `stats` (label order) into `out`, stopping
/// at `min(out.len(), max_output)`, then sort the written prefix by area.
///
/// Returns the number of candidates written.
pub fn collect_candidates(
    stats: &[ComponentStats],
    filter: &ShapeFilter,
    out: &mut [CircleCandidate],
    max_output: usize,
) -> usize {
    let cap = out.len().min(max_output);
    let mut found = 0;
    for s in stats.iter().skip(1) {
        if found == cap {
            break;
        }
        if !filter.accepts(s) {
            continue;
        }
        if let Some(candidate) = CircleCandidate::from_stats(s) {
            out[found] = candidate;
            found += 1;
        }
    }
    sort_by_area_desc(&mut out[..found]);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chroma_circles_core::{LabelMap, Plane};

    fn box_stats(x0: u32, y0: u32, w: u32, h: u32, area: u64) -> ComponentStats {
        ComponentStats {
            min_x: x0,
            min_y: y0,
            max_x: x0 + w - 1,
            max_y: y0 + h - 1,
            area,
            sum_x: area * u64::from(2 * x0 + w - 1) / 2,
            sum_y: area * u64::from(2 * y0 + h - 1) / 2,
            seen: true,
        }
    }

    #[test]
    fn accumulates_box_area_and_sums() {
        let labels: LabelMap = Plane::from_vec(
            4,
            3,
            vec![
                0, 1, 1, 0, //
                2, 1, 0, 0, //
                2, 0, 0, 9,
            ],
        )
        .expect("labels");
        let stats = compute_component_stats(&labels.view(), 3).expect("stats");
        assert_eq!(stats.len(), 3);
        assert!(!stats[0].seen);

        let one = stats[1];
        assert_eq!((one.min_x, one.min_y, one.max_x, one.max_y), (1, 0, 2, 1));
        assert_eq!(one.area, 3);
        assert_eq!((one.sum_x, one.sum_y), (4, 1));
        assert_eq!((one.width(), one.height()), (2, 2));
        assert_relative_eq!(one.extent(), 0.75);

        let two = stats[2];
        assert_eq!(two.area, 2);
        assert_relative_eq!(two.aspect(), 0.5);
        let c = two.centroid().expect("centroid");
        assert_relative_eq!(c.x, 0.0);
        assert_relative_eq!(c.y, 1.5);
    }

    #[test]
    fn unseen_label_has_no_geometry() {
        let s = ComponentStats::EMPTY;
        assert_eq!(s.width(), 0);
        assert_eq!(s.aspect(), 0.0);
        assert_eq!(s.extent(), 0.0);
        assert!(s.centroid().is_none());
        assert!(CircleCandidate::from_stats(&s).is_none());
    }

    #[test]
    fn filter_rules_fire_in_order() {
        let f = ShapeFilter::default();
        assert_eq!(f.rejection(&ComponentStats::EMPTY), Some(Rejection::Unseen));
        assert_eq!(
            f.rejection(&box_stats(0, 0, 3, 1, 3)),
            Some(Rejection::TooFewPixels)
        );
        assert_eq!(
            f.rejection(&box_stats(0, 0, 8, 1, 8)),
            Some(Rejection::ThinBox)
        );
        assert_eq!(
            f.rejection(&box_stats(0, 0, 40, 4, 160)),
            Some(Rejection::Aspect)
        );
        // Square box but an L-shaped fill.
        assert_eq!(
            f.rejection(&box_stats(0, 0, 10, 10, 40)),
            Some(Rejection::Extent)
        );
        // 2x2 passes the shape tests but is smaller than a 6 px disk.
        assert_eq!(
            f.rejection(&box_stats(0, 0, 2, 2, 4)),
            Some(Rejection::AreaRange)
        );
        assert_eq!(f.rejection(&box_stats(0, 0, 10, 10, 80)), None);
    }

    #[test]
    fn area_bounds_follow_diameters() {
        let f = ShapeFilter {
            min_diameter: 10.0,
            max_diameter: 20.0,
            ..ShapeFilter::default()
        };
        assert_relative_eq!(f.min_area(), PI * 25.0);
        assert_relative_eq!(f.max_area(), PI * 100.0);
        // Just above the lower bound.
        let mut s = box_stats(0, 0, 9, 9, 79);
        assert!(f.accepts(&s));
        s.area = 315;
        s.max_x = 19;
        s.max_y = 19;
        assert!(!f.accepts(&s));
    }

    #[test]
    fn candidate_uses_equivalent_disk_radius() {
        let s = box_stats(10, 20, 10, 10, 314);
        let c = CircleCandidate::from_stats(&s).expect("candidate");
        assert_relative_eq!(c.radius, (314.0f64 / PI).sqrt() as f32, epsilon = 1e-6);
        assert_relative_eq!(c.center.x, 14.5, epsilon = 1e-3);
        assert_relative_eq!(c.center.y, 24.5, epsilon = 1e-3);
        assert_eq!(c.area, 314.0);
    }

    #[test]
    fn collection_is_capped_then_sorted() {
        let stats = vec![
            ComponentStats::EMPTY,
            box_stats(0, 0, 10, 10, 80),
            box_stats(20, 0, 4, 20, 60), // aspect 0.2
            box_stats(40, 0, 20, 20, 300),
            box_stats(0, 40, 16, 16, 200),
        ];
        let f = ShapeFilter::default();

        let mut out = [CircleCandidate::default(); 8];
        let n = collect_candidates(&stats, &f, &mut out, 32);
        assert_eq!(n, 3);
        let areas: Vec<f64> = out[..n].iter().map(|c| c.area).collect();
        assert_eq!(areas, vec![300.0, 200.0, 80.0]);

        // The cap keeps the first accepted labels, not the largest ones.
        let mut out = [CircleCandidate::default(); 8];
        let n = collect_candidates(&stats, &f, &mut out, 2);
        assert_eq!(n, 2);
        assert_eq!(out[0].area, 300.0);
        assert_eq!(out[1].area, 80.0);

        let mut small = [CircleCandidate::default(); 1];
        assert_eq!(collect_candidates(&stats, &f, &mut small, 32), 1);
        assert_eq!(small[0].area, 80.0);
    }
}
