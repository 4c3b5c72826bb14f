//! # Plan
//! Memory planning of the transform pipeline.
//!
//! A plan owns the work buffers of one (shape, axis) pair. Planning
//! the same pair twice keeps the buffers, any other pair reallocates them.
use crate::error::{BasisError, Result};
use crate::Real;
use log::{debug, trace};
use ndarray::prelude::*;
use ndarray::{Data, DataMut, Slice, Zip};

/// Map logical indices and ranges along the transform axis to views.
///
/// Negative indices count from the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceMap {
    axis: usize,
    ndim: usize,
}

impl SliceMap {
    /// Slice map of arrays with `ndim` dimensions along `axis`
    pub fn new(axis: usize, ndim: usize) -> Self {
        debug_assert!(axis < ndim);
        SliceMap { axis, ndim }
    }

    /// Transform axis
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// View of index `i` (the axis is kept with length one)
    pub fn index<'a, A, S, D>(&self, a: &'a ArrayBase<S, D>, i: isize) -> ArrayView<'a, A, D>
    where
        S: Data<Elem = A>,
        D: Dimension,
    {
        let i = Self::resolve(a.shape()[self.axis], i);
        a.slice_axis(Axis(self.axis), Slice::from(i..i + 1))
    }

    /// Mutable view of index `i` (the axis is kept with length one)
    pub fn index_mut<'a, A, S, D>(
        &self,
        a: &'a mut ArrayBase<S, D>,
        i: isize,
    ) -> ArrayViewMut<'a, A, D>
    where
        S: Data<Elem = A> + DataMut,
        D: Dimension,
    {
        let i = Self::resolve(a.shape()[self.axis], i);
        a.slice_axis_mut(Axis(self.axis), Slice::from(i..i + 1))
    }

    /// View of the range `start..end`, `None` is open ended
    pub fn range<'a, A, S, D>(
        &self,
        a: &'a ArrayBase<S, D>,
        start: isize,
        end: Option<isize>,
    ) -> ArrayView<'a, A, D>
    where
        S: Data<Elem = A>,
        D: Dimension,
    {
        a.slice_axis(Axis(self.axis), Slice::new(start, end, 1))
    }

    /// Mutable view of the range `start..end`, `None` is open ended
    pub fn range_mut<'a, A, S, D>(
        &self,
        a: &'a mut ArrayBase<S, D>,
        start: isize,
        end: Option<isize>,
    ) -> ArrayViewMut<'a, A, D>
    where
        S: Data<Elem = A> + DataMut,
        D: Dimension,
    {
        a.slice_axis_mut(Axis(self.axis), Slice::new(start, end, 1))
    }

    fn resolve(len: usize, i: isize) -> usize {
        if i < 0 {
            (len as isize + i) as usize
        } else {
            i as usize
        }
    }
}

/// Work buffers of one planned (shape, axis) pair
#[derive(Debug, Clone)]
pub struct TransformPlan {
    shape: Vec<usize>,
    axis: usize,
    /// Physical space buffer
    pub input: ArrayD<Real>,
    /// Spectral space buffer of padded length
    pub output: ArrayD<Real>,
    /// Spectral space buffer of unpadded length
    pub trunc: Option<ArrayD<Real>>,
    /// Slice map along transform axis
    pub sl: SliceMap,
}

impl TransformPlan {
    fn new(shape: &[usize], axis: usize, n_trunc: Option<usize>) -> Self {
        let trunc = n_trunc.map(|n| {
            let mut trunc_shape = shape.to_vec();
            trunc_shape[axis] = n;
            ArrayD::zeros(trunc_shape)
        });
        TransformPlan {
            shape: shape.to_vec(),
            axis,
            input: ArrayD::zeros(shape),
            output: ArrayD::zeros(shape),
            trunc,
            sl: SliceMap::new(axis, shape.len()),
        }
    }

    /// Planned physical shape
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Planned axis
    pub fn axis(&self) -> usize {
        self.axis
    }
}

/// Plan state of a basis
#[derive(Debug, Clone)]
pub enum PlanState {
    /// No buffers allocated
    Unplanned,
    /// Buffers allocated for one (shape, axis)
    Planned(TransformPlan),
}

impl Default for PlanState {
    fn default() -> Self {
        PlanState::Unplanned
    }
}

impl PlanState {
    /// Is planned for `shape` and `axis`
    pub fn is_planned_for(&self, shape: &[usize], axis: usize) -> bool {
        match self {
            PlanState::Planned(plan) => plan.shape == shape && plan.axis == axis,
            PlanState::Unplanned => false,
        }
    }

    /// Current plan, if any
    pub fn planned(&self) -> Option<&TransformPlan> {
        match self {
            PlanState::Planned(plan) => Some(plan),
            PlanState::Unplanned => None,
        }
    }

    /// Plan for physical `shape` along `axis`. With `n_trunc` an
    /// additional spectral buffer of that length along `axis` is allocated.
    ///
    /// # Errors
    /// `InvalidParameter` if `axis` is out of bounds.
    pub fn plan(
        &mut self,
        shape: &[usize],
        axis: usize,
        n_trunc: Option<usize>,
    ) -> Result<&mut TransformPlan> {
        if axis >= shape.len() {
            return Err(BasisError::invalid(
                "axis",
                format!("axis {} out of bounds for {} dimensions", axis, shape.len()),
            ));
        }
        if self.is_planned_for(shape, axis) {
            trace!("Already planned for shape {:?} along axis {}", shape, axis);
        } else {
            debug!("Plan transform for shape {:?} along axis {}", shape, axis);
            *self = PlanState::Planned(TransformPlan::new(shape, axis, n_trunc));
        }
        match self {
            PlanState::Planned(plan) => Ok(plan),
            PlanState::Unplanned => unreachable!("plan state set above"),
        }
    }
}

/// Returns P^T diag(w), the weighted projection onto the columns of P
pub(crate) fn weighted_projection(p: &Array2<Real>, w: &Array1<Real>) -> Array2<Real> {
    &p.t() * w
}

/// Apply a (columns x points) projection along `axis`
pub(crate) fn project_lanes<S1, S2, D>(
    pw: &Array2<Real>,
    input: &ArrayBase<S1, D>,
    output: &mut ArrayBase<S2, D>,
    axis: usize,
) where
    S1: Data<Elem = Real>,
    S2: Data<Elem = Real> + DataMut,
    D: Dimension,
{
    Zip::from(output.lanes_mut(Axis(axis)))
        .and(input.lanes(Axis(axis)))
        .for_each(|mut out, inp| {
            out.assign(&pw.dot(&inp));
        });
}

/// Evaluate expansion with (points x functions) matrix P along `axis`
pub(crate) fn evaluate_lanes<S1, S2, D>(
    p: &Array2<Real>,
    input: &ArrayBase<S1, D>,
    output: &mut ArrayBase<S2, D>,
    axis: usize,
) where
    S1: Data<Elem = Real>,
    S2: Data<Elem = Real> + DataMut,
    D: Dimension,
{
    Zip::from(output.lanes_mut(Axis(axis)))
        .and(input.lanes(Axis(axis)))
        .par_for_each(|mut out, inp| {
            out.assign(&p.dot(&inp));
        });
}

/// Copy padded spectral buffer into the unpadded one. The leading
/// interior modes and the trailing `n_lift` slots are moved separately.
pub(crate) fn truncate(padded: &ArrayD<Real>, trunc: &mut ArrayD<Real>, sl: &SliceMap, n_lift: usize) {
    let n = trunc.shape()[sl.axis()];
    let n_int = (n - n_lift) as isize;
    sl.range_mut(trunc, 0, Some(n_int))
        .assign(&sl.range(padded, 0, Some(n_int)));
    if n_lift > 0 {
        let k = -(n_lift as isize);
        sl.range_mut(trunc, k, None)
            .assign(&sl.range(padded, k, None));
    }
}

/// Copy unpadded spectral buffer into the padded one. High interior modes
/// are zero, the trailing `n_lift` slots move to the padded tail.
pub(crate) fn pad(trunc: &ArrayD<Real>, padded: &mut ArrayD<Real>, sl: &SliceMap, n_lift: usize) {
    let n = trunc.shape()[sl.axis()];
    let n_int = (n - n_lift) as isize;
    padded.fill(0.);
    sl.range_mut(padded, 0, Some(n_int))
        .assign(&sl.range(trunc, 0, Some(n_int)));
    if n_lift > 0 {
        let k = -(n_lift as isize);
        sl.range_mut(padded, k, None)
            .assign(&sl.range(trunc, k, None));
    }
}

/// Zero the interior modes from floor(2N/3) up to the first lift slot
pub(crate) fn dealias_direct<S, D>(u: &mut ArrayBase<S, D>, sl: &SliceMap, n_lift: usize)
where
    S: Data<Elem = Real> + DataMut,
    D: Dimension,
{
    let n = u.shape()[sl.axis()];
    let start = 2 * n / 3;
    let end = n - n_lift;
    if start < end {
        sl.range_mut(u, start as isize, Some(end as isize)).fill(0.);
    }
}

/// Sizes of a transform: spectral length `n`, physical (padded) length
/// `m` and number of trailing lift slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sizes {
    pub n: usize,
    pub m: usize,
    pub n_lift: usize,
}

impl Sizes {
    /// Length of the truncated buffer, if padded
    pub fn n_trunc(&self) -> Option<usize> {
        if self.m > self.n {
            Some(self.n)
        } else {
            None
        }
    }
}

/// Check length of `data` along `axis`
pub(crate) fn check_len<S, D>(data: &ArrayBase<S, D>, axis: usize, n: usize) -> Result<()>
where
    S: Data,
    D: Dimension,
{
    if axis >= data.ndim() {
        return Err(BasisError::invalid(
            "axis",
            format!("axis {} out of bounds for {} dimensions", axis, data.ndim()),
        ));
    }
    if data.shape()[axis] != n {
        return Err(BasisError::ShapeMismatch {
            axis,
            expected: n,
            actual: data.shape()[axis],
        });
    }
    Ok(())
}

/// Physical to spectral space.
///
/// Projects onto `pw`, runs `spectral` on the padded spectral buffer
/// (mass inversion, boundary treatment) and truncates.
pub(crate) fn forward<S1, S2, D, F>(
    state: &mut PlanState,
    sizes: Sizes,
    pw: &Array2<Real>,
    input: &ArrayBase<S1, D>,
    output: &mut ArrayBase<S2, D>,
    axis: usize,
    spectral: F,
) -> Result<()>
where
    S1: Data<Elem = Real>,
    S2: Data<Elem = Real> + DataMut,
    D: Dimension,
    F: FnOnce(&mut ArrayD<Real>) -> Result<()>,
{
    check_len(input, axis, sizes.m)?;
    check_len(output, axis, sizes.n)?;
    let plan = state.plan(input.shape(), axis, sizes.n_trunc())?;
    trace!("Forward transform along axis {}", axis);
    plan.input.assign(input);
    project_lanes(pw, &plan.input, &mut plan.output, axis);
    spectral(&mut plan.output)?;
    let sl = plan.sl;
    match plan.trunc.as_mut() {
        Some(trunc) => {
            truncate(&plan.output, trunc, &sl, sizes.n_lift);
            output.assign(trunc);
        }
        None => output.assign(&plan.output),
    }
    Ok(())
}

/// Spectral to physical space.
///
/// Pads, optionally dealiases and evaluates the expansion with the
/// (points x functions) matrix `p`.
pub(crate) fn backward<S1, S2, D>(
    state: &mut PlanState,
    sizes: Sizes,
    dealias: bool,
    p: &Array2<Real>,
    input: &ArrayBase<S1, D>,
    output: &mut ArrayBase<S2, D>,
    axis: usize,
) -> Result<()>
where
    S1: Data<Elem = Real>,
    S2: Data<Elem = Real> + DataMut,
    D: Dimension,
{
    check_len(input, axis, sizes.n)?;
    check_len(output, axis, sizes.m)?;
    let plan = state.plan(output.shape(), axis, sizes.n_trunc())?;
    trace!("Backward transform along axis {}", axis);
    let sl = plan.sl;
    match plan.trunc.as_mut() {
        Some(trunc) => {
            trunc.assign(input);
            if dealias {
                dealias_direct(trunc, &sl, sizes.n_lift);
            }
            pad(trunc, &mut plan.output, &sl, sizes.n_lift);
        }
        None => {
            plan.output.assign(input);
            if dealias {
                dealias_direct(&mut plan.output, &sl, sizes.n_lift);
            }
        }
    }
    evaluate_lanes(p, &plan.output, &mut plan.input, axis);
    output.assign(&plan.input);
    Ok(())
}

/// Weighted inner products with the columns of `pw`, followed by
/// `restrict` on the (padded length) result.
pub(crate) fn scalar_product<S1, S2, D, F>(
    state: &mut PlanState,
    sizes: Sizes,
    pw: &Array2<Real>,
    input: &ArrayBase<S1, D>,
    output: &mut ArrayBase<S2, D>,
    axis: usize,
    restrict: F,
) -> Result<()>
where
    S1: Data<Elem = Real>,
    S2: Data<Elem = Real> + DataMut,
    D: Dimension,
    F: FnOnce(&mut ArrayD<Real>) -> Result<()>,
{
    check_len(input, axis, sizes.m)?;
    check_len(output, axis, sizes.m)?;
    let plan = state.plan(input.shape(), axis, sizes.n_trunc())?;
    plan.input.assign(input);
    project_lanes(pw, &plan.input, &mut plan.output, axis);
    restrict(&mut plan.output)?;
    output.assign(&plan.output);
    Ok(())
}
