//! Kalman filter: geodetic constant-velocity estimator.
//!
//! # Design choices
//! - State is kept directly in geodetic coordinates,
//!   x = [lat, lon, v_lat, v_lon]ᵀ (degrees and degrees/s). The spherical
//!   distortion over the ranges involved is far below sensor noise.
//! - All math is `f64` via `nalgebra` fixed-size matrices.
//! - The filter is lazy: it stays uninitialized until the first `update`,
//!   which seeds the position with zero velocity.
//!
//! ## CV transition model
//! F = I₄ with F[0,2] = F[1,3] = dt, i.e. lat += v_lat·dt, lon += v_lon·dt.
//!
//! ## Measurement model
//! H selects the two position components; per-measurement noise enters as a
//! scalar multiplier on the baseline R (see the fusion loop's adaptive
//! gating).

use crate::error::EstimatorError;
use nalgebra::{Matrix2, Matrix2x4, Matrix4, Vector2, Vector4};

/// Initial position/velocity uncertainty on the P diagonal.
const INIT_P: f64 = 100.0;
/// Process noise diagonal.
const DEFAULT_Q: f64 = 0.01;
/// Baseline measurement noise diagonal.
const DEFAULT_R: f64 = 0.1;

/// Constant-velocity Kalman filter over `[lat, lon, v_lat, v_lon]`.
#[derive(Clone, Debug)]
pub struct GeoKalmanFilter {
    x: Vector4<f64>,
    p: Matrix4<f64>,
    q: Matrix4<f64>,
    r: Matrix2<f64>,
    initialized: bool,
}

impl Default for GeoKalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoKalmanFilter {
    pub fn new() -> Self {
        Self {
            x: Vector4::zeros(),
            p: Matrix4::identity() * INIT_P,
            q: Matrix4::identity() * DEFAULT_Q,
            r: Matrix2::identity() * DEFAULT_R,
            initialized: false,
        }
    }

    /// True once the first measurement has seeded the state.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Baseline R diagonal cell; the fusion loop divides its adaptive
    /// variance by this to form the `noise_scale` multiplier.
    pub fn baseline_r_cell(&self) -> f64 {
        self.r[(0, 0)]
    }

    /// Build state transition matrix F for timestep dt.
    fn transition_matrix(dt: f64) -> Matrix4<f64> {
        let mut f = Matrix4::<f64>::identity();
        f[(0, 2)] = dt;
        f[(1, 3)] = dt;
        f
    }

    /// Predict state and covariance forward by `dt` seconds.
    ///
    /// No-op until initialized and for non-positive dt. The caller owns dt
    /// hygiene beyond that: values outside (0, 1.0] are substituted with 0.1
    /// before this is called.
    pub fn predict(&mut self, dt: f64) {
        if !self.initialized || dt <= 0.0 {
            return;
        }
        let f = Self::transition_matrix(dt);
        self.x = f * self.x;
        self.p = f * self.p * f.transpose() + self.q;
    }

    /// Fold in one position measurement.
    ///
    /// The first call initializes the state at the measurement with zero
    /// velocity. Later calls run the standard update with
    /// `S = H·P·Hᵀ + noise_scale·R`. A singular S leaves the state
    /// untouched and reports [`EstimatorError::SingularInnovation`].
    pub fn update(
        &mut self,
        meas_lat: f64,
        meas_lon: f64,
        noise_scale: f64,
    ) -> Result<(), EstimatorError> {
        if !self.initialized {
            self.x = Vector4::new(meas_lat, meas_lon, 0.0, 0.0);
            self.initialized = true;
            return Ok(());
        }

        let mut h = Matrix2x4::<f64>::zeros();
        h[(0, 0)] = 1.0;
        h[(1, 1)] = 1.0;

        let z = Vector2::new(meas_lat, meas_lon);

        // Innovation: y = z − H·x
        let y = z - h * self.x;

        // Innovation covariance: S = H·P·Hᵀ + noise_scale·R
        let s = h * self.p * h.transpose() + self.r * noise_scale;
        let s_inv = s.try_inverse().ok_or(EstimatorError::SingularInnovation)?;

        // Kalman gain: K = P·Hᵀ·S⁻¹
        let k = self.p * h.transpose() * s_inv;

        self.x += k * y;
        self.p = (Matrix4::identity() - k * h) * self.p;
        Ok(())
    }

    /// Current state as `(lat, lon, v_lat, v_lon)`.
    pub fn state(&self) -> (f64, f64, f64, f64) {
        (self.x[0], self.x[1], self.x[2], self.x[3])
    }

    /// Sum of the P diagonal; used as a filter-health metric.
    pub fn covariance_trace(&self) -> f64 {
        self.p.trace()
    }

    #[cfg(test)]
    fn covariance(&self) -> Matrix4<f64> {
        self.p
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
