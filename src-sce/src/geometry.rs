//! Geometric primitives on [`HyperCube`] points: centroid, bounded uniform
//! sampling and homothetic (reflect / contract) transforms.

use rand::Rng;

use crate::error::{Result, SceError};
use crate::hypercube::HyperCube;

/// Uniform draw in `[min, max]`; `min == max` yields `min`
pub(crate) fn uniform_in<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    (min + rng.random::<f64>() * (max - min)).min(max).max(min)
}

/// Per-dimension arithmetic mean of `points`.
///
/// A single point is returned as a clone. Rounding is clamped back into the
/// bounds of the first point.
pub fn centroid<T: HyperCube>(points: &[&T]) -> Result<T> {
    let first = points.first().ok_or(SceError::EmptyPoints("centroid"))?;
    let mut result = (*first).clone();
    if points.len() == 1 {
        return Ok(result);
    }
    let n = points.len() as f64;
    for name in result.variable_names() {
        let mut sum = 0.0;
        for p in points {
            sum += p.value(&name)?;
        }
        let mean = (sum / n).min(result.max_value(&name)?).max(result.min_value(&name)?);
        result.set_value(&name, mean)?;
    }
    Ok(result)
}

/// Independent uniform draw of every dimension within the point's own bounds
pub fn random_within<T: HyperCube, R: Rng + ?Sized>(point: &T, rng: &mut R) -> Result<T> {
    let mut result = point.clone();
    for name in result.variable_names() {
        let v = uniform_in(result.min_value(&name)?, result.max_value(&name)?, rng);
        result.set_value(&name, v)?;
    }
    Ok(result)
}

/// Uniform draw within the smallest box containing all `points`, intersected
/// with the bounds of the first point.
///
/// Bounds are re-read after each assignment so that implementations with
/// cascading bounds between variables are honoured. An inverted interval is
/// reported as [`SceError::InfeasibleBoundingBox`].
pub fn random_within_bounding_box<T: HyperCube, R: Rng + ?Sized>(
    points: &[&T],
    rng: &mut R,
) -> Result<T> {
    let first = points.first().ok_or(SceError::EmptyPoints("bounding box"))?;
    let mut result = (*first).clone();
    for name in result.variable_names() {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for p in points {
            let v = p.value(&name)?;
            lo = lo.min(v);
            hi = hi.max(v);
        }
        lo = lo.max(result.min_value(&name)?);
        hi = hi.min(result.max_value(&name)?);
        if hi < lo {
            return Err(SceError::InfeasibleBoundingBox { name, min: lo, max: hi });
        }
        let v = uniform_in(lo, hi, rng);
        result.set_value(&name, v)?;
    }
    Ok(result)
}

/// `reference + factor * (point - reference)`, dimension by dimension.
///
/// Returns `Ok(None)` as soon as one coordinate falls outside its bounds.
/// Bounds are those of `reference`.
pub fn homothetic_transform<T: HyperCube>(reference: &T, point: &T, factor: f64) -> Result<Option<T>> {
    let mut result = reference.clone();
    for name in result.variable_names() {
        let r = reference.value(&name)?;
        let v = r + factor * (point.value(&name)? - r);
        if v < result.min_value(&name)? || v > result.max_value(&name)? {
            return Ok(None);
        }
        result.set_value(&name, v)?;
    }
    Ok(Some(result))
}
