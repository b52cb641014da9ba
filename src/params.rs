use crate::error::{ParamsError, Result};

/// Numeric knobs of the voxel graph pipeline.
///
/// Start from [`VoxelGraphParams::default`] and adjust with the `with_*`
/// builders:
///
/// ```
/// use voxgraph::VoxelGraphParams;
///
/// let params = VoxelGraphParams::new()
///     .with_resolution(0.5)
///     .with_merge_threshold(4.0);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelGraphParams {
    /// Fixed lattice spacing in world units.
    ///
    /// `None` derives it from the average shortest box side of the input
    /// divided by [`resolution_divider`](Self::resolution_divider).
    pub resolution: Option<f64>,

    /// Divisor applied to the shortest box side when deriving the resolution.
    pub resolution_divider: f64,

    /// Fraction of `resolution_divider` peeled off the distance field before
    /// thinning. The peel depth is `round(resolution_divider * outer_layer_limit)`.
    pub outer_layer_limit: f64,

    /// How far (in voxels) a run may stray from its chord before a node is placed.
    pub deviation_threshold: f64,

    /// Edges shorter than this many voxels are collapsed.
    pub merge_threshold: f64,

    /// Containment slack of the oriented box during interior fill, as a
    /// fraction of the box diagonal.
    pub box_expansion_factor: f64,
}

impl Default for VoxelGraphParams {
    fn default() -> Self {
        Self {
            resolution: None,
            resolution_divider: 7.0,
            outer_layer_limit: 0.3,
            deviation_threshold: 2.0,
            merge_threshold: 3.0,
            box_expansion_factor: 0.05,
        }
    }
}

impl VoxelGraphParams {
    /// Creates parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the lattice spacing.
    #[must_use]
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Sets the divisor used to derive the resolution.
    #[must_use]
    pub fn with_resolution_divider(mut self, divider: f64) -> Self {
        self.resolution_divider = divider;
        self
    }

    /// Sets the outer layer peel fraction.
    #[must_use]
    pub fn with_outer_layer_limit(mut self, limit: f64) -> Self {
        self.outer_layer_limit = limit;
        self
    }

    /// Sets the run deviation tolerance in voxels.
    #[must_use]
    pub fn with_deviation_threshold(mut self, threshold: f64) -> Self {
        self.deviation_threshold = threshold;
        self
    }

    /// Sets the merge distance in voxels.
    #[must_use]
    pub fn with_merge_threshold(mut self, threshold: f64) -> Self {
        self.merge_threshold = threshold;
        self
    }

    /// Sets the containment slack used during interior fill.
    #[must_use]
    pub fn with_box_expansion_factor(mut self, factor: f64) -> Self {
        self.box_expansion_factor = factor;
        self
    }

    /// Distance values at or below this depth are peeled before thinning.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn peel_depth(&self) -> u32 {
        // validate() keeps the product finite and non-negative.
        (self.resolution_divider * self.outer_layer_limit)
            .round_ties_even()
            .max(0.0) as u32
    }

    /// Checks every knob.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::InvalidParameter`] for the first knob that is
    /// non-finite, non-positive where a positive value is required, or
    /// negative where zero is allowed.
    pub fn validate(&self) -> Result<()> {
        if let Some(resolution) = self.resolution {
            positive("resolution", resolution)?;
        }
        positive("resolution_divider", self.resolution_divider)?;
        non_negative("outer_layer_limit", self.outer_layer_limit)?;
        non_negative("deviation_threshold", self.deviation_threshold)?;
        non_negative("merge_threshold", self.merge_threshold)?;
        non_negative("box_expansion_factor", self.box_expansion_factor)?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParamsError::InvalidParameter { name, value }.into())
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ParamsError::InvalidParameter { name, value }.into())
    }
}
