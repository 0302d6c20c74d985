//! Entry points and settings.
//!
//! The free functions never fail outright: an input that cannot be
//! processed yields an empty result whose `failure` field says why. The
//! builders return the same error as a [`Result`] instead.

use serde::{Deserialize, Serialize};
use vcad_kernel_math::{midpoint, Point2, Tolerance, Vec2};

use crate::assemble::assemble;
use crate::bounds::BoundingBox;
use crate::diagram::{Diagram, Site, SiteId};
use crate::error::{Result, VoronoiError};
use crate::geometry::magnitude;
use crate::medial::{self, MedialAxis};
use crate::merge::PointIndex;
use crate::{naive, sweep};

/// Inputs at or below this many sites use the quadratic builder under
/// [`Algorithm::Auto`].
pub const AUTO_NAIVE_THRESHOLD: usize = 8;

/// Diagram construction strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Fortune's sweep, O(n log n).
    #[default]
    Sweep,
    /// Per-cell half-plane clipping, O(n²); capped at
    /// [`NAIVE_MAX_SITES`](crate::NAIVE_MAX_SITES).
    Naive,
    /// Naive for tiny inputs, sweep otherwise.
    Auto,
}

/// Diagram parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoronoiSettings {
    /// Growth of the default bounding box on each side, as a fraction of
    /// the site extents.
    pub margin: f64,
    /// Base tolerance, scaled to the input magnitude before use.
    pub tolerance: Tolerance,
    /// Construction strategy.
    pub algorithm: Algorithm,
}

impl Default for VoronoiSettings {
    fn default() -> Self {
        Self {
            margin: 0.1,
            tolerance: Tolerance::DEFAULT,
            algorithm: Algorithm::Sweep,
        }
    }
}

impl VoronoiSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(VoronoiError::InvalidParameter(
                "margin must be finite and non-negative".into(),
            ));
        }
        validate_tolerance(&self.tolerance)
    }

    /// Set the bounding-box margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Set the base tolerance.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the construction strategy.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

fn validate_tolerance(tolerance: &Tolerance) -> Result<()> {
    if !tolerance.linear.is_finite() || tolerance.linear <= 0.0 {
        return Err(VoronoiError::InvalidParameter(
            "tolerance must be finite and positive".into(),
        ));
    }
    Ok(())
}

/// Medial-axis parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MedialAxisSettings {
    /// Boundary sampling distance. Defaults to a fiftieth of the shorter
    /// side of the polygon's bounding box.
    pub discretization_step: Option<f64>,
    /// Leaf branches shorter than this are pruned. Defaults to twice the
    /// step.
    pub prune_threshold: Option<f64>,
    /// Base tolerance, scaled to the input magnitude before use.
    #[serde(default)]
    pub tolerance: Tolerance,
}

impl MedialAxisSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if let Some(step) = self.discretization_step {
            if !step.is_finite() || step <= 0.0 {
                return Err(VoronoiError::InvalidParameter(
                    "discretization_step must be finite and positive".into(),
                ));
            }
        }
        if let Some(threshold) = self.prune_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(VoronoiError::InvalidParameter(
                    "prune_threshold must be finite and non-negative".into(),
                ));
            }
        }
        validate_tolerance(&self.tolerance)
    }

    /// Set the boundary sampling distance.
    pub fn with_discretization_step(mut self, step: f64) -> Self {
        self.discretization_step = Some(step);
        self
    }

    /// Set the pruning threshold.
    pub fn with_prune_threshold(mut self, threshold: f64) -> Self {
        self.prune_threshold = Some(threshold);
        self
    }

    /// Set the base tolerance.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Centre of `bounds`, or of the points' extent when no box is given.
fn frame_center(points: &[Point2], bounds: Option<&BoundingBox>) -> Vec2 {
    bounds
        .copied()
        .or_else(|| BoundingBox::from_points(points))
        .map_or_else(Vec2::zeros, |b| midpoint(&b.min, &b.max).coords)
}

/// Fold near-duplicate points onto the first occurrence.
fn prepare_sites(points: &[Point2], tol: &Tolerance) -> Result<(Vec<Site>, Vec<(SiteId, SiteId)>)> {
    let mut index = PointIndex::new(tol.linear);
    let mut sites = Vec::with_capacity(points.len());
    let mut merged = Vec::new();
    for (id, p) in points.iter().enumerate() {
        let (rep, fresh) = index.insert(*p);
        if fresh {
            sites.push(Site { id, position: *p });
        } else {
            merged.push((id, sites[rep].id));
        }
    }
    if !merged.is_empty() {
        log::debug!("merged {} near-duplicate sites", merged.len());
    }
    if sites.len() < 2 {
        return Err(VoronoiError::InsufficientInput {
            required: 2,
            found: sites.len(),
        });
    }
    Ok((sites, merged))
}

pub(crate) fn diagram_from_points(
    points: &[Point2],
    bounds: Option<BoundingBox>,
    settings: &VoronoiSettings,
) -> Result<Diagram> {
    settings.validate()?;
    if let Some(b) = &bounds {
        b.validate()?;
    }
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(VoronoiError::InvalidParameter(
            "site coordinates must be finite".into(),
        ));
    }

    // Build around the centre of the input so the tolerance follows its
    // extent rather than its distance from the origin.
    let center = frame_center(points, bounds.as_ref());
    let local: Vec<Point2> = points.iter().map(|p| p - center).collect();
    let local_bounds = bounds.map(|b| BoundingBox::new(b.min - center, b.max - center));

    let scale = magnitude(&local).max(local_bounds.map_or(0.0, |b| b.magnitude()));
    let tol = settings.tolerance.scaled(scale);
    let (sites, merged) = prepare_sites(&local, &tol)?;
    let positions: Vec<Point2> = sites.iter().map(|s| s.position).collect();

    let local_bounds = match local_bounds {
        Some(b) => b,
        None => BoundingBox::from_points(&positions)
            .ok_or(VoronoiError::InsufficientInput {
                required: 2,
                found: 0,
            })?
            .expanded(settings.margin),
    };

    let algorithm = match settings.algorithm {
        Algorithm::Auto if positions.len() <= AUTO_NAIVE_THRESHOLD => Algorithm::Naive,
        Algorithm::Auto => Algorithm::Sweep,
        other => other,
    };
    let lines = match algorithm {
        Algorithm::Naive => naive::build(&positions, &local_bounds, &tol)?,
        _ => sweep::build(&positions, &tol),
    };
    let mut diagram = assemble(sites, merged, &lines, local_bounds, &tol);
    restore_frame(&mut diagram, points, center, bounds);
    Ok(diagram)
}

/// Move a diagram built around `center` back to input coordinates.
fn restore_frame(diagram: &mut Diagram, points: &[Point2], center: Vec2, bounds: Option<BoundingBox>) {
    let bounds = bounds.unwrap_or_else(|| BoundingBox::new(diagram.bounds.min + center, diagram.bounds.max + center));
    for site in &mut diagram.sites {
        site.position = points[site.id];
    }
    // Re-clamp: the shift back can round a boundary vertex just outside.
    for vertex in &mut diagram.vertices {
        vertex.position = bounds.clamp(&(vertex.position + center));
    }
    diagram.bounds = bounds;
}

/// Builder for a Voronoi diagram.
///
/// ```
/// use vcad_kernel_math::Point2;
/// use vcad_kernel_voronoi::{BoundingBox, VoronoiBuilder};
///
/// let sites = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(5.0, 10.0)];
/// let diagram = VoronoiBuilder::new(&sites)
///     .bounds(BoundingBox::from_extents(-5.0, -5.0, 15.0, 15.0))
///     .build()?;
/// assert_eq!(diagram.cells.len(), 3);
/// # Ok::<(), vcad_kernel_voronoi::VoronoiError>(())
/// ```
#[derive(Debug, Clone)]
pub struct VoronoiBuilder<'a> {
    sites: &'a [Point2],
    bounds: Option<BoundingBox>,
    settings: VoronoiSettings,
}

impl<'a> VoronoiBuilder<'a> {
    /// Start a diagram over `sites`.
    pub fn new(sites: &'a [Point2]) -> Self {
        Self {
            sites,
            bounds: None,
            settings: VoronoiSettings::default(),
        }
    }

    /// Clip to `bounds` instead of the expanded site extents.
    pub fn bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Use `settings`.
    pub fn settings(mut self, settings: VoronoiSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the diagram.
    pub fn build(&self) -> Result<Diagram> {
        diagram_from_points(self.sites, self.bounds, &self.settings)
    }
}

/// Builder for a medial axis.
#[derive(Debug, Clone)]
pub struct MedialAxisBuilder<'a> {
    polygon: &'a [Point2],
    settings: MedialAxisSettings,
}

impl<'a> MedialAxisBuilder<'a> {
    /// Start a medial axis of `polygon` (implicitly closed).
    pub fn new(polygon: &'a [Point2]) -> Self {
        Self {
            polygon,
            settings: MedialAxisSettings::default(),
        }
    }

    /// Use `settings`.
    pub fn settings(mut self, settings: MedialAxisSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the pruned skeleton.
    pub fn build(&self) -> Result<MedialAxis> {
        self.settings.validate()?;
        // Same shape, same skeleton: work around the polygon's own centre.
        let center = frame_center(self.polygon, None);
        let local: Vec<Point2> = self.polygon.iter().map(|p| p - center).collect();
        let tol = medial::polygon_tolerance(&local, &self.settings.tolerance);
        let polygon = medial::prepare_polygon(&local, &tol)?;
        let step = medial::resolve_step(&polygon, self.settings.discretization_step);
        let threshold = self.settings.prune_threshold.unwrap_or(2.0 * step);
        let axis = medial::extract(&polygon, step, threshold, &tol)?;
        Ok(axis.translated(center))
    }
}

/// Voronoi diagram of `sites` clipped to `bounds` (default: the site
/// extents grown by 10%).
///
/// Returns an empty diagram with [`Diagram::failure`] set when fewer than
/// two distinct sites are given or the input is invalid.
pub fn compute_voronoi(sites: &[Point2], bounds: Option<BoundingBox>) -> Diagram {
    compute_voronoi_with(sites, bounds, &VoronoiSettings::default())
}

/// [`compute_voronoi`] with explicit settings.
pub fn compute_voronoi_with(sites: &[Point2], bounds: Option<BoundingBox>, settings: &VoronoiSettings) -> Diagram {
    diagram_from_points(sites, bounds, settings).unwrap_or_else(|err| {
        log::debug!("voronoi failed: {err}");
        Diagram::failed(err)
    })
}

/// Pruned medial axis of a simple polygon.
///
/// Returns an empty skeleton with [`MedialAxis::failure`] set for polygons
/// with fewer than three distinct vertices or zero area.
pub fn compute_medial_axis(polygon: &[Point2], settings: &MedialAxisSettings) -> MedialAxis {
    MedialAxisBuilder::new(polygon)
        .settings(*settings)
        .build()
        .unwrap_or_else(|err| {
            log::debug!("medial axis failed: {err}");
            MedialAxis::failed(err)
        })
}
