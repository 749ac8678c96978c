//! Construction-time configuration for an [`RtpProcessor`](crate::processor::RtpProcessor).

use serde::{Deserialize, Serialize};

use crate::error::{Result, RtpError};
use crate::geometry::Geometry;

/// Code parameters: `code_dimension` data symbols per stripe, `stripe_unit_size`
/// bytes per subsymbol. `code_dimension + 1` must be prime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RtpParams {
    pub code_dimension: u32,
    pub stripe_unit_size: usize,
}

impl RtpParams {
    pub fn new(code_dimension: u32, stripe_unit_size: usize) -> Result<Self> {
        let params = Self {
            code_dimension,
            stripe_unit_size,
        };
        params.validate()?;
        Ok(params)
    }

    /// Re-check the invariants this type is supposed to uphold; useful when
    /// `RtpParams` is deserialized from a config file rather than built via
    /// [`RtpParams::new`].
    pub fn validate(&self) -> Result<()> {
        if self.stripe_unit_size == 0 {
            return Err(RtpError::ZeroStripeUnitSize);
        }
        let p = self.code_dimension + 1;
        if !is_prime(p) {
            return Err(RtpError::NonPrimeDimension {
                code_dimension: self.code_dimension,
                p,
            });
        }
        Ok(())
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.code_dimension, self.stripe_unit_size)
    }
}

fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u32;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
