//! Control points and the copy-on-write control point set.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{CurveError, CurveResult};

/// Minimum horizontal distance between two control points.
pub const MIN_X_SPACING: f32 = 1e-6;

/// Stable identifier of a control point.
///
/// Ids survive moves and re-sorting; they are never reused within one
/// [`ControlPointSet`] lineage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(Arc<str>);

impl PointId {
    /// Raw string id of the lower boundary point.
    pub const START: &'static str = "start";
    /// Raw string id of the upper boundary point.
    pub const END: &'static str = "end";

    /// Creates an id from a string.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Id of the lower boundary point.
    pub fn start() -> Self {
        Self::new(Self::START)
    }

    /// Id of the upper boundary point.
    pub fn end() -> Self {
        Self::new(Self::END)
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A single anchor of the tone curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Stable identifier.
    pub id: PointId,
    /// Input brightness fraction in `[0, 1]`.
    pub x: f32,
    /// Output brightness fraction in `[0, 1]`.
    pub y: f32,
    /// Locked points keep their `x` when moved.
    #[serde(default)]
    pub locked: bool,
}

impl ControlPoint {
    /// Create a new unlocked control point.
    #[inline]
    pub fn new(id: impl Into<PointId>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            locked: false,
        }
    }

    /// Create a locked control point.
    #[inline]
    pub fn locked(id: impl Into<PointId>, x: f32, y: f32) -> Self {
        Self {
            locked: true,
            ..Self::new(id, x, y)
        }
    }
}

/// Rejects NaN/infinite input, then clamps into the unit square.
fn clamp_position(x: f32, y: f32) -> CurveResult<(f32, f32)> {
    if !x.is_finite() || !y.is_finite() {
        return Err(CurveError::NonFinite { x, y });
    }
    Ok((x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)))
}

/// Ordered set of control points, unique by id and sorted by `x`.
///
/// Every edit returns a new set and leaves `self` untouched. A set always
/// holds at least two points with pairwise distinct `x`.
///
/// # Example
///
/// ```rust
/// use retouch_curve::{ControlPointSet, PointId};
///
/// let set = ControlPointSet::new();
/// let (set, id) = set.with_added(0.5, 0.8).unwrap();
/// assert_eq!(set.len(), 3);
/// assert_eq!(set.as_slice()[1].id, id);
///
/// // Locked endpoints cannot be removed.
/// assert!(set.with_removed(&PointId::start()).is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPointSet {
    points: Vec<ControlPoint>,
    next_id: u64,
}

impl ControlPointSet {
    /// Creates the default set: locked `start = (0, 0)` and `end = (1, 1)`.
    pub fn new() -> Self {
        Self {
            points: vec![
                ControlPoint::locked(PointId::start(), 0.0, 0.0),
                ControlPoint::locked(PointId::end(), 1.0, 1.0),
            ],
            next_id: 1,
        }
    }

    /// Creates a set from raw positions.
    ///
    /// Positions are clamped and sorted. The lowest becomes the locked
    /// `start` point, the highest the locked `end` point, and the rest get
    /// fresh ids.
    ///
    /// # Errors
    ///
    /// [`CurveError::InvalidControlSet`] for fewer than two points,
    /// [`CurveError::NonFinite`] and [`CurveError::DuplicateX`] as for
    /// [`ControlPointSet::with_added`].
    pub fn from_positions(positions: &[(f32, f32)]) -> CurveResult<Self> {
        if positions.len() < 2 {
            return Err(CurveError::invalid_set(format!(
                "need at least 2 control points, got {}",
                positions.len()
            )));
        }

        let mut clamped = positions
            .iter()
            .map(|&(x, y)| clamp_position(x, y))
            .collect::<CurveResult<Vec<_>>>()?;
        clamped.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(pair) = clamped.windows(2).find(|w| w[1].0 - w[0].0 < MIN_X_SPACING) {
            return Err(CurveError::DuplicateX { x: pair[1].0 });
        }

        let last = clamped.len() - 1;
        let mut set = Self {
            points: Vec::with_capacity(clamped.len()),
            next_id: 1,
        };
        for (i, (x, y)) in clamped.into_iter().enumerate() {
            let point = match i {
                0 => ControlPoint::locked(PointId::start(), x, y),
                i if i == last => ControlPoint::locked(PointId::end(), x, y),
                _ => ControlPoint::new(set.fresh_id(), x, y),
            };
            set.points.push(point);
        }
        Ok(set)
    }

    fn fresh_id(&mut self) -> PointId {
        let id = PointId::new(format!("pt-{}", self.next_id));
        self.next_id += 1;
        id
    }

    fn sort(&mut self) {
        self.points.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    /// Returns `true` if another point (other than `skip`) sits at `x`.
    fn collides(&self, x: f32, skip: Option<&PointId>) -> bool {
        self.points
            .iter()
            .filter(|p| Some(&p.id) != skip)
            .any(|p| (p.x - x).abs() < MIN_X_SPACING)
    }

    /// Number of points (always >= 2).
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in ascending `x` order.
    #[inline]
    pub fn as_slice(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Iterates over points in ascending `x` order.
    pub fn iter(&self) -> impl Iterator<Item = &ControlPoint> {
        self.points.iter()
    }

    /// Looks a point up by id.
    pub fn get(&self, id: &PointId) -> Option<&ControlPoint> {
        self.points.iter().find(|p| &p.id == id)
    }

    /// Returns `true` if a point with `id` exists.
    pub fn contains(&self, id: &PointId) -> bool {
        self.get(id).is_some()
    }

    /// Returns a new set with a point added at `(x, y)`, clamped into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// [`CurveError::NonFinite`] for NaN/infinite input and
    /// [`CurveError::DuplicateX`] if a point already sits at the clamped `x`.
    pub fn with_added(&self, x: f32, y: f32) -> CurveResult<(Self, PointId)> {
        let (x, y) = clamp_position(x, y)?;
        if self.collides(x, None) {
            return Err(CurveError::DuplicateX { x });
        }

        let mut next = self.clone();
        let id = next.fresh_id();
        next.points.push(ControlPoint::new(id.clone(), x, y));
        next.sort();
        Ok((next, id))
    }

    /// Returns a new set with point `id` moved to `(x, y)`.
    ///
    /// Locked points ignore `x`. Returns `Ok(None)` if `id` does not exist.
    ///
    /// # Errors
    ///
    /// [`CurveError::NonFinite`] for NaN/infinite input and
    /// [`CurveError::DuplicateX`] if the target `x` is taken by another point.
    pub fn with_moved(&self, id: &PointId, x: f32, y: f32) -> CurveResult<Option<Self>> {
        let Some(current) = self.get(id) else {
            return Ok(None);
        };
        let (x, y) = clamp_position(x, y)?;
        let x = if current.locked { current.x } else { x };
        if self.collides(x, Some(id)) {
            return Err(CurveError::DuplicateX { x });
        }

        let mut next = self.clone();
        if let Some(point) = next.points.iter_mut().find(|p| &p.id == id) {
            point.x = x;
            point.y = y;
        }
        next.sort();
        Ok(Some(next))
    }

    /// Returns a new set without point `id`.
    ///
    /// Returns `None` if `id` does not exist, the point is locked, or the
    /// set would drop below two points.
    pub fn with_removed(&self, id: &PointId) -> Option<Self> {
        let index = self.points.iter().position(|p| &p.id == id)?;
        if self.points[index].locked || self.points.len() <= 2 {
            return None;
        }
        let mut next = self.clone();
        next.points.remove(index);
        Some(next)
    }

    /// `(x, y)` pairs in ascending `x` order.
    pub fn positions(&self) -> Vec<(f32, f32)> {
        self.points.iter().map(|p| (p.x, p.y)).collect()
    }
}

impl Default for ControlPointSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[ControlPoint]> for ControlPointSet {
    fn as_ref(&self) -> &[ControlPoint] {
        &self.points
    }
}

impl<'a> IntoIterator for &'a ControlPointSet {
    type Item = &'a ControlPoint;
    type IntoIter = std::slice::Iter<'a, ControlPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let set = ControlPointSet::new();
        assert_eq!(set.len(), 2);
        assert_eq!(set.positions(), vec![(0.0, 0.0), (1.0, 1.0)]);
        assert!(set.iter().all(|p| p.locked));
    }

    #[test]
    fn test_add_clamps_and_sorts() {
        let set = ControlPointSet::new();
        let (set, a) = set.with_added(0.7, 1.5).unwrap();
        let (set, b) = set.with_added(0.2, -0.3).unwrap();
        let ids: Vec<_> = set.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![PointId::start(), b.clone(), a.clone(), PointId::end()]);
        assert_eq!(set.get(&a).map(|p| p.y), Some(1.0));
        assert_eq!(set.get(&b).map(|p| p.y), Some(0.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_move_clamps_to_unit_square() {
        let (set, id) = ControlPointSet::new().with_added(0.5, 0.5).unwrap();

        let moved = set.with_moved(&id, 0.6, -0.4).unwrap().unwrap();
        assert_eq!(moved.get(&id).map(|p| (p.x, p.y)), Some((0.6, 0.0)));

        // x clamps onto the locked end and collides with it
        assert!(matches!(
            set.with_moved(&id, 1.7, -0.4),
            Err(CurveError::DuplicateX { x }) if x == 1.0
        ));

        let end = set.with_moved(&PointId::end(), -3.0, 1.4).unwrap().unwrap();
        assert_eq!(end.get(&PointId::end()).map(|p| (p.x, p.y)), Some((1.0, 1.0)));
        assert_eq!(set.get(&id).map(|p| (p.x, p.y)), Some((0.5, 0.5)));
    }

    #[test]
    fn test_control_point_yaml() {
        let point = ControlPoint::locked(PointId::START, 0.0, 0.25);
        let yaml = serde_yaml::to_string(&point).unwrap();
        assert!(yaml.contains("id: start"));
        let back: ControlPoint = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, point);

        let plain: ControlPoint = serde_yaml::from_str("{id: pt-3, x: 0.5, y: 0.6}").unwrap();
        assert_eq!(plain.id, PointId::new("pt-3"));
        assert!(!plain.locked);
    }

    #[test]
    fn test_add_rejects_duplicate_and_nan() {
        let set = ControlPointSet::new();
        assert!(matches!(set.with_added(0.0, 0.5), Err(CurveError::DuplicateX { .. })));
        // clamps onto the end point
        assert!(matches!(set.with_added(1.2, 0.5), Err(CurveError::DuplicateX { .. })));
        assert!(matches!(set.with_added(f32::NAN, 0.5), Err(CurveError::NonFinite { .. })));
    }

    #[test]
    fn test_edits_leave_original_untouched() {
        let base = ControlPointSet::new();
        let (added, id) = base.with_added(0.5, 0.5).unwrap();
        let moved = added.with_moved(&id, 0.6, 0.9).unwrap().unwrap();
        assert_eq!(base.len(), 2);
        assert_eq!(added.get(&id).map(|p| (p.x, p.y)), Some((0.5, 0.5)));
        assert_eq!(moved.get(&id).map(|p| (p.x, p.y)), Some((0.6, 0.9)));
    }

    #[test]
    fn test_move_locked_ignores_x() {
        let set = ControlPointSet::new();
        let moved = set.with_moved(&PointId::end(), 0.3, 0.7).unwrap().unwrap();
        let end = moved.get(&PointId::end()).unwrap();
        assert_eq!((end.x, end.y), (1.0, 0.7));
    }

    #[test]
    fn test_move_crossing_neighbour_resorts() {
        let (set, a) = ControlPointSet::new().with_added(0.25, 0.25).unwrap();
        let (set, b) = set.with_added(0.75, 0.75).unwrap();
        let moved = set.with_moved(&a, 0.9, 0.5).unwrap().unwrap();
        let order: Vec<_> = moved.iter().map(|p| p.id.clone()).collect();
        assert_eq!(order, vec![PointId::start(), b, a, PointId::end()]);
    }

    #[test]
    fn test_move_missing_is_none() {
        let set = ControlPointSet::new();
        assert!(set.with_moved(&PointId::new("ghost"), 0.5, 0.5).unwrap().is_none());
    }

    #[test]
    fn test_remove_rules() {
        let set = ControlPointSet::new();
        assert!(set.with_removed(&PointId::start()).is_none());
        assert!(set.with_removed(&PointId::new("ghost")).is_none());

        let (set, id) = set.with_added(0.5, 0.4).unwrap();
        let removed = set.with_removed(&id).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!removed.contains(&id));
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let (set, a) = ControlPointSet::new().with_added(0.5, 0.5).unwrap();
        let set = set.with_removed(&a).unwrap();
        let (_, b) = set.with_added(0.5, 0.5).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_positions() {
        let set = ControlPointSet::from_positions(&[(1.0, 1.0), (0.5, 0.8), (0.0, 0.0)]).unwrap();
        assert_eq!(set.positions(), vec![(0.0, 0.0), (0.5, 0.8), (1.0, 1.0)]);
        assert_eq!(set.as_slice()[0].id, PointId::start());
        assert_eq!(set.as_slice()[2].id, PointId::end());
        assert!(!set.as_slice()[1].locked);

        assert!(ControlPointSet::from_positions(&[(0.5, 0.5)]).is_err());
        assert!(ControlPointSet::from_positions(&[(0.5, 0.5), (0.5, 0.6)]).is_err());
    }
}
