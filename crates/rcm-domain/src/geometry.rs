//! # Boundary Geometry
//!
//! Polygon construction for the survey boundary, a single bounded repair
//! step, point-in-polygon tests and bounded rejection sampling.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BoundingRect, Contains, Coord, Line, LineString, MultiPolygon, Point, Polygon, Rect};
use rand::Rng;

use crate::config::ProjectBoundary;
use crate::error::GeometryError;

/// Uniform draw over `[low, high)`, computed as `low + (high - low) * u`.
///
/// Reversed bounds are accepted and mirror the interval instead of panicking
/// the way `Rng::gen_range` would.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.r#gen::<f64>()
}

// =============================================================================
// SURVEY AREA
// =============================================================================

/// Validated survey polygon (one part, or several after repair).
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyArea {
    shape: MultiPolygon<f64>,
    bounds: Rect<f64>,
    repaired: bool,
}

impl SurveyArea {
    fn from_loops(loops: Vec<Vec<Coord<f64>>>, repaired: bool) -> Option<Self> {
        let shape = MultiPolygon::new(
            loops
                .into_iter()
                .map(|ring| Polygon::new(LineString::from(ring), vec![]))
                .collect(),
        );
        let bounds = shape.bounding_rect()?;
        Some(Self {
            shape,
            bounds,
            repaired,
        })
    }

    /// Strict containment: points on the boundary are outside.
    #[must_use]
    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.shape.contains(point)
    }

    #[must_use]
    pub const fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Minimum corner of the bounding box, the rejection-sampling fallback.
    #[must_use]
    pub fn fallback_point(&self) -> Point<f64> {
        Point::from(self.bounds.min())
    }

    #[must_use]
    pub const fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.shape.unsigned_area()
    }

    /// Number of polygon parts; more than one only after a repair split.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.shape.0.len()
    }

    #[must_use]
    pub const fn was_repaired(&self) -> bool {
        self.repaired
    }

    /// Draw up to `attempts` candidates uniformly inside the bounding box
    /// (x then y per candidate) and return the first one inside the area.
    /// Falls back to the bounding-box minimum corner when none qualifies.
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R, attempts: usize) -> Point<f64> {
        let (min, max) = (self.bounds.min(), self.bounds.max());
        for _ in 0..attempts {
            let x = uniform(rng, min.x, max.x);
            let y = uniform(rng, min.y, max.y);
            let candidate = Point::new(x, y);
            if self.contains(&candidate) {
                return candidate;
            }
        }
        self.fallback_point()
    }
}

impl ProjectBoundary {
    /// Build the survey polygon from the coordinate ring.
    ///
    /// An invalid ring gets exactly one zero-distance repair: it is split at
    /// its self-intersections into simple loops, zero-area loops are dropped
    /// and only loops wound the same way as the largest one are kept, so a
    /// bow-tie keeps a single lobe. Overlapping collinear edges and degenerate rings cannot be
    /// repaired this way and fail with [`GeometryError`].
    pub fn to_polygon(&self) -> Result<SurveyArea, GeometryError> {
        let ring = normalize_ring(
            self.coordinates
                .iter()
                .map(|[x, y]| Coord { x: *x, y: *y })
                .collect(),
        );
        if ring.len() < 3 {
            return Err(GeometryError::TooFewVertices { found: ring.len() });
        }

        let defect = match check_ring(&ring) {
            Ok(()) => {
                return SurveyArea::from_loops(vec![ring], false).ok_or(GeometryError::ZeroArea);
            }
            Err(defect) => defect,
        };

        tracing::warn!(
            boundary = %self.name,
            defect = defect.as_str(),
            "Boundary ring invalid, applying zero-distance repair"
        );

        let loops = zero_buffer(ring, 0)
            .map(retain_dominant_winding)
            .ok_or_else(|| GeometryError::StillInvalid {
                reason: "ring has overlapping collinear edges".to_string(),
            })?;

        if loops.is_empty() {
            return Err(match defect {
                RingDefect::ZeroArea => GeometryError::ZeroArea,
                other => GeometryError::StillInvalid {
                    reason: format!("{} left no enclosed area", other.as_str()),
                },
            });
        }

        if let Some(bad) = loops.iter().find_map(|part| check_ring(part).err()) {
            return Err(GeometryError::StillInvalid {
                reason: bad.as_str().to_string(),
            });
        }

        tracing::info!(boundary = %self.name, parts = loops.len(), "Boundary repaired");
        SurveyArea::from_loops(loops, true).ok_or(GeometryError::ZeroArea)
    }
}

// =============================================================================
// RING VALIDATION & REPAIR
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingDefect {
    SelfIntersection,
    CollinearOverlap,
    ZeroArea,
}

impl RingDefect {
    const fn as_str(self) -> &'static str {
        match self {
            Self::SelfIntersection => "self-intersection",
            Self::CollinearOverlap => "collinear overlap",
            Self::ZeroArea => "zero area",
        }
    }
}

enum Crossing {
    At { i: usize, j: usize, point: Coord<f64> },
    Overlap,
}

/// Open ring (no closing vertex) without consecutive duplicates.
fn normalize_ring(mut ring: Vec<Coord<f64>>) -> Vec<Coord<f64>> {
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

fn edge(ring: &[Coord<f64>], idx: usize) -> Line<f64> {
    Line::new(ring[idx], ring[(idx + 1) % ring.len()])
}

fn ring_area(ring: &[Coord<f64>]) -> f64 {
    signed_ring_area(ring).abs()
}

fn signed_ring_area(ring: &[Coord<f64>]) -> f64 {
    Polygon::new(LineString::from(ring.to_vec()), vec![]).signed_area()
}

/// Drop loops wound against the largest loop. Ties go to the first loop,
/// the one holding the ring's starting vertex.
fn retain_dominant_winding(loops: Vec<Vec<Coord<f64>>>) -> Vec<Vec<Coord<f64>>> {
    let signed: Vec<f64> = loops.iter().map(|part| signed_ring_area(part)).collect();
    let Some(dominant) = signed
        .iter()
        .copied()
        .reduce(|best, next| if next.abs() > best.abs() { next } else { best })
    else {
        return loops;
    };

    loops
        .into_iter()
        .zip(signed)
        .filter(|(_, area)| area.signum() == dominant.signum())
        .map(|(part, _)| part)
        .collect()
}

/// First intersection between two edges that should not meet.
fn first_crossing(ring: &[Coord<f64>]) -> Option<Crossing> {
    let n = ring.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edge(ring, i), edge(ring, j)) {
                Some(LineIntersection::Collinear { .. }) => return Some(Crossing::Overlap),
                Some(LineIntersection::SinglePoint { intersection, .. }) if !adjacent => {
                    return Some(Crossing::At {
                        i,
                        j,
                        point: intersection,
                    });
                }
                _ => {}
            }
        }
    }
    None
}

fn check_ring(ring: &[Coord<f64>]) -> Result<(), RingDefect> {
    match first_crossing(ring) {
        Some(Crossing::Overlap) => Err(RingDefect::CollinearOverlap),
        Some(Crossing::At { .. }) => Err(RingDefect::SelfIntersection),
        None if ring_area(ring) == 0.0 => Err(RingDefect::ZeroArea),
        None => Ok(()),
    }
}

/// Split `ring` at intersections until every loop is simple.
///
/// Each split yields two loops strictly shorter than the input, so the
/// recursion is bounded by the vertex count. Returns `None` on collinear
/// overlaps, which splitting cannot resolve.
fn zero_buffer(ring: Vec<Coord<f64>>, depth: usize) -> Option<Vec<Vec<Coord<f64>>>> {
    let ring = normalize_ring(ring);
    if ring.len() < 3 || depth > ring.len() + 1 {
        return Some(vec![]);
    }

    match first_crossing(&ring) {
        None if ring_area(&ring) == 0.0 => Some(vec![]),
        None => Some(vec![ring]),
        Some(Crossing::Overlap) => None,
        Some(Crossing::At { i, j, point }) => {
            let mut outer = ring[..=i].to_vec();
            outer.push(point);
            outer.extend_from_slice(&ring[j + 1..]);

            let mut inner = vec![point];
            inner.extend_from_slice(&ring[i + 1..=j]);

            let mut loops = zero_buffer(outer, depth + 1)?;
            loops.extend(zero_buffer(inner, depth + 1)?);
            Some(loops)
        }
    }
}
