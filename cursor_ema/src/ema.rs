//! Scalar and per-axis exponential moving averages.

// ════════════════════════════════════════════════════════════════════════════
// ExponentialMovingAverage — one scalar signal
// ════════════════════════════════════════════════════════════════════════════

/// Recursive low-pass filter over a scalar signal.
///
/// `alpha` is the weight of the newest sample.  `1.0` passes samples
/// through untouched; values near `0.0` smooth heavily.
///
/// # Example
/// ```rust
/// use cursor_ema::ExponentialMovingAverage;
///
/// let mut ema = ExponentialMovingAverage::new(0.5);
/// assert_eq!(ema.get(), None);
/// assert_eq!(ema.add(10.0), 10.0);  // first sample initialises
/// assert_eq!(ema.add(20.0), 15.0);  // 10·0.5 + 20·0.5
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ExponentialMovingAverage {
    alpha: f32,
    value: Option<f32>,
}

impl ExponentialMovingAverage {
    /// Create an empty filter.
    ///
    /// `alpha` is clamped into `(0, 1]`; zero, negative and NaN inputs
    /// become the smallest positive step so the filter still moves.
    pub fn new(alpha: f32) -> Self {
        let alpha = if alpha.is_nan() || alpha <= 0.0 {
            f32::EPSILON
        } else {
            alpha.min(1.0)
        };
        ExponentialMovingAverage { alpha, value: None }
    }

    /// Feed one sample and return the updated estimate.
    pub fn add(&mut self, value: f32) -> f32 {
        let next = match self.value {
            None    => value,
            Some(v) => v * (1.0 - self.alpha) + value * self.alpha,
        };
        self.value = Some(next);
        next
    }

    /// Last estimate, or `None` if no sample has been added yet.
    pub fn get(&self) -> Option<f32> { self.value }

    /// Forget the running estimate.
    pub fn reset(&mut self) { self.value = None; }

    pub fn alpha(&self) -> f32 { self.alpha }
}

// ════════════════════════════════════════════════════════════════════════════
// ExponentialCoordinateAverage — a 2-D point stream
// ════════════════════════════════════════════════════════════════════════════

/// Two independent [`ExponentialMovingAverage`]s, one per axis.
///
/// There is no coupling between axes: a jump in `x` never moves `y`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExponentialCoordinateAverage {
    x: ExponentialMovingAverage,
    y: ExponentialMovingAverage,
}

impl ExponentialCoordinateAverage {
    pub fn new(alpha: f32) -> Self {
        ExponentialCoordinateAverage {
            x: ExponentialMovingAverage::new(alpha),
            y: ExponentialMovingAverage::new(alpha),
        }
    }

    /// Feed one `[x, y]` sample and return the smoothed point.
    pub fn add(&mut self, point: [f32; 2]) -> [f32; 2] {
        [self.x.add(point[0]), self.y.add(point[1])]
    }

    /// Smoothed point, once both axes have seen a sample.
    pub fn get(&self) -> Option<[f32; 2]> {
        Some([self.x.get()?, self.y.get()?])
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }

    pub fn alpha(&self) -> f32 { self.x.alpha() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
