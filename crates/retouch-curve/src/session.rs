//! Control-point editing session.
//!
//! [`CurveSession`] owns the current [`ControlPointSet`], rebuilds the
//! [`ToneLut`] after every successful mutation and hands both to the
//! registered change listeners. Rejected or no-op edits leave everything
//! as it was and notify nobody.

use std::fmt;

use retouch_lut::ToneLut;
use tracing::{debug, warn};

use crate::{ControlPoint, ControlPointSet, CurveBuilder, CurveResult, PointId, SplineKind};

/// Callback invoked with the new points and LUT after every change.
pub type ChangeListener = Box<dyn FnMut(&ControlPointSet, &ToneLut) + Send>;

/// Editing session over one tone curve.
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use retouch_curve::CurveSession;
///
/// let seen = Arc::new(Mutex::new(0));
/// let mut session = CurveSession::new();
/// let counter = seen.clone();
/// session.on_change(move |_, _| *counter.lock().unwrap() += 1);
///
/// let id = session.add_point(0.5, 0.8).unwrap();
/// assert!(session.move_point(&id, 0.4, 0.7));
/// assert!(session.remove_point(&id));
/// assert_eq!(*seen.lock().unwrap(), 3);
/// ```
pub struct CurveSession {
    points: ControlPointSet,
    builder: CurveBuilder,
    lut: ToneLut,
    listeners: Vec<ChangeListener>,
}

impl CurveSession {
    /// Session over the default endpoint pair with a natural spline.
    pub fn new() -> Self {
        Self {
            points: ControlPointSet::new(),
            builder: CurveBuilder::natural(),
            lut: ToneLut::identity(),
            listeners: Vec::new(),
        }
    }

    /// Session over an existing set.
    ///
    /// # Errors
    ///
    /// Fails if the set cannot be fitted with `builder`.
    pub fn with_points(points: ControlPointSet, builder: CurveBuilder) -> CurveResult<Self> {
        let lut = builder.build(points.as_slice())?;
        Ok(Self {
            points,
            builder,
            lut,
            listeners: Vec::new(),
        })
    }

    /// Registers a listener for future changes.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&ControlPointSet, &ToneLut) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Current control points.
    #[inline]
    pub fn points(&self) -> &ControlPointSet {
        &self.points
    }

    /// Looks a point up by id.
    pub fn point(&self, id: &PointId) -> Option<&ControlPoint> {
        self.points.get(id)
    }

    /// Current LUT.
    #[inline]
    pub fn lut(&self) -> &ToneLut {
        &self.lut
    }

    /// Current builder.
    #[inline]
    pub fn builder(&self) -> CurveBuilder {
        self.builder
    }

    /// Fits `points`, and if that succeeds installs them and notifies.
    fn commit(&mut self, points: ControlPointSet) -> CurveResult<()> {
        let lut = self.builder.build(points.as_slice())?;
        self.points = points;
        self.lut = lut;
        for listener in &mut self.listeners {
            listener(&self.points, &self.lut);
        }
        Ok(())
    }

    /// Adds a point at `(x, y)` (clamped) and returns its id.
    ///
    /// # Errors
    ///
    /// [`crate::CurveError::DuplicateX`] or [`crate::CurveError::NonFinite`];
    /// the session is unchanged.
    pub fn add_point(&mut self, x: f32, y: f32) -> CurveResult<PointId> {
        let (next, id) = self.points.with_added(x, y).inspect_err(|e| {
            warn!(x, y, error = %e, "add_point rejected");
        })?;
        self.commit(next)?;
        debug!(%id, x, y, "point added");
        Ok(id)
    }

    /// Moves point `id`. Returns `false` if nothing changed: unknown id,
    /// duplicate target `x` or non-finite input.
    pub fn move_point(&mut self, id: &PointId, x: f32, y: f32) -> bool {
        match self.points.with_moved(id, x, y) {
            Ok(Some(next)) => match self.commit(next) {
                Ok(()) => {
                    debug!(%id, x, y, "point moved");
                    true
                }
                Err(e) => {
                    warn!(%id, error = %e, "move_point rejected");
                    false
                }
            },
            Ok(None) => {
                debug!(%id, "move_point: no such point");
                false
            }
            Err(e) => {
                warn!(%id, x, y, error = %e, "move_point rejected");
                false
            }
        }
    }

    /// Removes point `id`. Returns `false` for unknown ids, locked points,
    /// or when only two points remain.
    pub fn remove_point(&mut self, id: &PointId) -> bool {
        let Some(next) = self.points.with_removed(id) else {
            debug!(%id, "remove_point ignored");
            return false;
        };
        match self.commit(next) {
            Ok(()) => {
                debug!(%id, "point removed");
                true
            }
            Err(e) => {
                warn!(%id, error = %e, "remove_point rejected");
                false
            }
        }
    }

    /// Switches the interpolation strategy and rebuilds.
    ///
    /// # Errors
    ///
    /// Fails for a non-finite cardinal tension; the previous strategy stays.
    pub fn set_spline(&mut self, kind: SplineKind) -> CurveResult<()> {
        let previous = self.builder;
        self.builder = CurveBuilder::new(kind);
        let points = self.points.clone();
        if let Err(e) = self.commit(points) {
            self.builder = previous;
            return Err(e);
        }
        debug!(%kind, "spline changed");
        Ok(())
    }

    /// Restores the default endpoint pair.
    pub fn reset(&mut self) -> CurveResult<()> {
        self.commit(ControlPointSet::new())?;
        debug!("session reset");
        Ok(())
    }
}

impl Default for CurveSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CurveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveSession")
            .field("points", &self.points)
            .field("builder", &self.builder)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
