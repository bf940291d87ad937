// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Coordinate transforms: the abstract [`Transform`] capability and the
//! built-in concrete families.

use std::any::Any;
use std::fmt;

use glam::{DAffine3, DMat3, DVec3};

use crate::error::Error;

/// A coordinate mapping from source space to target space.
///
/// Transforms are owned values: composites embed their elements rather than
/// referencing them, and cloning a composite deep-clones the elements.
///
/// `inverse` returns `None` when the concrete mapping has no exact inverse;
/// callers needing guaranteed invertibility compose through
/// [`InvertibleTransformSequence`] or wrap with
/// [`IterativeInverseTransform`].
pub trait Transform: fmt::Debug + 'static {
    /// Maps a point from source space to target space.
    fn apply(&self, point: DVec3) -> DVec3;

    /// Returns the exact inverse mapping, if one exists.
    fn inverse(&self) -> Option<Box<dyn Transform>> {
        None
    }

    /// Deep-clones into a new boxed transform.
    fn clone_box(&self) -> Box<dyn Transform>;

    /// Downcasting seam for adapters.
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Transform> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A 3D affine transform backed by `glam::DAffine3`.
///
/// The document representation is the row-major 3x4 coefficient array
/// `[m00, m01, m02, t0, m10, m11, m12, t1, m20, m21, m22, t2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    affine: DAffine3,
}

impl AffineTransform {
    pub fn identity() -> Self {
        Self {
            affine: DAffine3::IDENTITY,
        }
    }

    pub fn new(affine: DAffine3) -> Self {
        Self { affine }
    }

    pub fn translation(offset: DVec3) -> Self {
        Self {
            affine: DAffine3::from_translation(offset),
        }
    }

    pub fn scaling(factors: DVec3) -> Self {
        Self {
            affine: DAffine3::from_scale(factors),
        }
    }

    /// Builds from the row-major 3x4 coefficient array.
    pub fn from_row_major(m: &[f64; 12]) -> Self {
        let matrix3 = DMat3::from_cols(
            DVec3::new(m[0], m[4], m[8]),
            DVec3::new(m[1], m[5], m[9]),
            DVec3::new(m[2], m[6], m[10]),
        );
        let translation = DVec3::new(m[3], m[7], m[11]);
        Self {
            affine: DAffine3::from_mat3_translation(matrix3, translation),
        }
    }

    /// Flattens to the row-major 3x4 coefficient array.
    pub fn to_row_major(&self) -> [f64; 12] {
        let m = &self.affine.matrix3;
        let t = self.affine.translation;
        [
            m.x_axis.x, m.y_axis.x, m.z_axis.x, t.x, //
            m.x_axis.y, m.y_axis.y, m.z_axis.y, t.y, //
            m.x_axis.z, m.y_axis.z, m.z_axis.z, t.z,
        ]
    }

    pub fn affine(&self) -> DAffine3 {
        self.affine
    }

    /// Composition: applies `self` first, then `other`.
    pub fn then(&self, other: &AffineTransform) -> AffineTransform {
        AffineTransform {
            affine: other.affine * self.affine,
        }
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform for AffineTransform {
    fn apply(&self, point: DVec3) -> DVec3 {
        self.affine.transform_point3(point)
    }

    fn inverse(&self) -> Option<Box<dyn Transform>> {
        Some(Box::new(AffineTransform {
            affine: self.affine.inverse(),
        }))
    }

    fn clone_box(&self) -> Box<dyn Transform> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An ordered composition: elements apply first to last.
#[derive(Debug, Clone, Default)]
pub struct TransformSequence {
    steps: Vec<Box<dyn Transform>>,
}

impl TransformSequence {
    pub fn new(steps: Vec<Box<dyn Transform>>) -> Self {
        Self { steps }
    }

    pub fn push(&mut self, step: Box<dyn Transform>) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Box<dyn Transform>] {
        &self.steps
    }
}

impl Transform for TransformSequence {
    fn apply(&self, point: DVec3) -> DVec3 {
        self.steps.iter().fold(point, |p, step| step.apply(p))
    }

    fn inverse(&self) -> Option<Box<dyn Transform>> {
        let mut inverses = Vec::with_capacity(self.steps.len());
        for step in self.steps.iter().rev() {
            inverses.push(step.inverse()?);
        }
        Some(Box::new(TransformSequence { steps: inverses }))
    }

    fn clone_box(&self) -> Box<dyn Transform> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An ordered composition whose construction guarantees every element
/// supports an exact inverse, so the composite itself is invertible by
/// inverting and reversing the elements.
#[derive(Debug, Clone)]
pub struct InvertibleTransformSequence {
    steps: Vec<Box<dyn Transform>>,
}

impl InvertibleTransformSequence {
    /// Fails with [`Error::NotInvertible`] if any element lacks an inverse.
    pub fn new(steps: Vec<Box<dyn Transform>>) -> Result<Self, Error> {
        for (i, step) in steps.iter().enumerate() {
            if step.inverse().is_none() {
                return Err(Error::not_invertible(format!(
                    "sequence element {i} has no exact inverse"
                )));
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Box<dyn Transform>] {
        &self.steps
    }
}

impl Transform for InvertibleTransformSequence {
    fn apply(&self, point: DVec3) -> DVec3 {
        self.steps.iter().fold(point, |p, step| step.apply(p))
    }

    fn inverse(&self) -> Option<Box<dyn Transform>> {
        let mut inverses = Vec::with_capacity(self.steps.len());
        for step in self.steps.iter().rev() {
            inverses.push(step.inverse()?);
        }
        Some(Box::new(TransformSequence::new(inverses)))
    }

    fn clone_box(&self) -> Box<dyn Transform> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A 3D landmark-based warp with the polyharmonic kernel φ(r) = r.
///
/// Solved once at construction from equal-length source/target landmark
/// lists; evaluation is `c + B·p + Σ wᵢ·φ(|p − sᵢ|)`. The mapping
/// interpolates the target landmarks exactly, which is what makes the
/// serialized form (source landmarks plus re-evaluated targets) a faithful
/// round trip regardless of how the in-memory kernel was produced.
#[derive(Debug, Clone)]
pub struct LandmarkTransform {
    sources: Vec<DVec3>,
    weights: Vec<DVec3>,
    linear: DMat3,
    offset: DVec3,
}

impl LandmarkTransform {
    /// Solves the (N+4)x(N+4) interpolation system.
    ///
    /// Requires at least four landmarks and a non-degenerate configuration
    /// (not all coplanar); otherwise the system is singular and this returns
    /// [`Error::DegenerateLandmarks`].
    pub fn solve(sources: Vec<DVec3>, targets: &[DVec3]) -> Result<Self, Error> {
        let n = sources.len();
        if targets.len() != n {
            return Err(Error::degenerate_landmarks(format!(
                "landmark list length mismatch: {} source vs {} target",
                n,
                targets.len()
            )));
        }
        if n < 4 {
            return Err(Error::degenerate_landmarks(format!(
                "need at least 4 landmarks, got {n}"
            )));
        }

        let dim = n + 4;
        let mut matrix = vec![vec![0.0f64; dim]; dim];
        let mut rhs = vec![[0.0f64; 3]; dim];
        for j in 0..n {
            for i in 0..n {
                matrix[j][i] = kernel(sources[j].distance(sources[i]));
            }
            matrix[j][n] = 1.0;
            matrix[j][n + 1] = sources[j].x;
            matrix[j][n + 2] = sources[j].y;
            matrix[j][n + 3] = sources[j].z;
            matrix[n][j] = 1.0;
            matrix[n + 1][j] = sources[j].x;
            matrix[n + 2][j] = sources[j].y;
            matrix[n + 3][j] = sources[j].z;
            rhs[j] = [targets[j].x, targets[j].y, targets[j].z];
        }

        let solution = solve_dense(matrix, rhs)
            .ok_or_else(|| Error::degenerate_landmarks("singular landmark system"))?;

        let weights = solution[..n]
            .iter()
            .map(|w| DVec3::new(w[0], w[1], w[2]))
            .collect();
        let offset = DVec3::new(solution[n][0], solution[n][1], solution[n][2]);
        let linear = DMat3::from_cols(
            DVec3::new(solution[n + 1][0], solution[n + 1][1], solution[n + 1][2]),
            DVec3::new(solution[n + 2][0], solution[n + 2][1], solution[n + 2][2]),
            DVec3::new(solution[n + 3][0], solution[n + 3][1], solution[n + 3][2]),
        );

        Ok(Self {
            sources,
            weights,
            linear,
            offset,
        })
    }

    /// The source landmarks the kernel was solved from.
    pub fn landmarks(&self) -> &[DVec3] {
        &self.sources
    }
}

impl Transform for LandmarkTransform {
    fn apply(&self, point: DVec3) -> DVec3 {
        let mut out = self.offset + self.linear * point;
        for (source, weight) in self.sources.iter().zip(&self.weights) {
            out += *weight * kernel(point.distance(*source));
        }
        out
    }

    fn clone_box(&self) -> Box<dyn Transform> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn kernel(r: f64) -> f64 {
    r
}

/// Gaussian elimination with partial pivoting, three right-hand sides at
/// once. Returns `None` for a singular system.
fn solve_dense(mut a: Vec<Vec<f64>>, mut b: Vec<[f64; 3]>) -> Option<Vec<[f64; 3]>> {
    let n = a.len();
    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                let v = a[col][k];
                a[row][k] -= factor * v;
            }
            for d in 0..3 {
                let v = b[col][d];
                b[row][d] -= factor * v;
            }
        }
    }

    for col in (0..n).rev() {
        for d in 0..3 {
            let mut sum = b[col][d];
            for k in col + 1..n {
                sum -= a[col][k] * b[k][d];
            }
            b[col][d] = sum / a[col][col];
        }
    }
    Some(b)
}

/// Wraps a forward-only transform with numeric point inversion (damped
/// Newton iteration over a finite-difference Jacobian).
///
/// The wrapper is a runtime convenience: persistence writes only the wrapped
/// transform, so iterative invertibility does not survive a round trip.
#[derive(Debug, Clone)]
pub struct IterativeInverseTransform {
    forward: Box<dyn Transform>,
    tolerance: f64,
    max_iterations: u32,
    inverted: bool,
}

impl IterativeInverseTransform {
    pub fn new(forward: Box<dyn Transform>) -> Self {
        Self {
            forward,
            tolerance: 1e-9,
            max_iterations: 200,
            inverted: false,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The wrapped forward mapping.
    pub fn forward(&self) -> &dyn Transform {
        self.forward.as_ref()
    }

    /// Solves `forward(x) = target`, starting from `seed`.
    ///
    /// Stops when the residual drops below the configured tolerance or the
    /// iteration cap is reached, returning the best estimate either way.
    pub fn invert_point(&self, target: DVec3, seed: DVec3) -> DVec3 {
        let mut x = seed;
        for _ in 0..self.max_iterations {
            let residual = self.forward.apply(x) - target;
            if residual.length() < self.tolerance {
                return x;
            }
            let jacobian = self.jacobian(x);
            let det = jacobian.determinant();
            let step = if det.abs() > 1e-14 {
                jacobian.inverse() * residual
            } else {
                // Singular Jacobian: fall back to a damped residual step.
                residual * 0.5
            };
            x -= clamp_step(step, residual.length());
        }
        x
    }

    fn jacobian(&self, x: DVec3) -> DMat3 {
        let h = 1e-6 * (1.0 + x.length());
        let dx = (self.forward.apply(x + DVec3::X * h) - self.forward.apply(x - DVec3::X * h))
            / (2.0 * h);
        let dy = (self.forward.apply(x + DVec3::Y * h) - self.forward.apply(x - DVec3::Y * h))
            / (2.0 * h);
        let dz = (self.forward.apply(x + DVec3::Z * h) - self.forward.apply(x - DVec3::Z * h))
            / (2.0 * h);
        DMat3::from_cols(dx, dy, dz)
    }
}

// Keeps a wildly wrong Jacobian estimate from throwing the iterate out of
// the basin of convergence.
fn clamp_step(step: DVec3, residual: f64) -> DVec3 {
    let cap = 10.0 * (residual + 1.0);
    let len = step.length();
    if len > cap {
        step * (cap / len)
    } else {
        step
    }
}

impl Transform for IterativeInverseTransform {
    fn apply(&self, point: DVec3) -> DVec3 {
        if self.inverted {
            self.invert_point(point, point)
        } else {
            self.forward.apply(point)
        }
    }

    fn inverse(&self) -> Option<Box<dyn Transform>> {
        Some(Box::new(Self {
            forward: self.forward.clone(),
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            inverted: !self.inverted,
        }))
    }

    fn clone_box(&self) -> Box<dyn Transform> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
