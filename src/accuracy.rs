//! Numerical tolerance used by the geometric predicates.
//!
//! Every diagram carries its own [`Accuracy`]. The process-wide value set with
//! [`set_accuracy`] is only the default picked up by [`crate::Diagram::new`];
//! changing it never affects diagrams that already exist.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::DiagramError;

/// Default tolerance, in model units.
pub const DEFAULT_ACCURACY: f64 = 1e-9;

static GLOBAL_ACCURACY: AtomicU64 = AtomicU64::new(DEFAULT_ACCURACY.to_bits());

/// Sets the process-wide default tolerance.
///
/// # Errors
///
/// Returns [`DiagramError::InvalidParameter`] for negative or non-finite values.
pub fn set_accuracy(value: f64) -> Result<(), DiagramError> {
    let accuracy = Accuracy::new(value)?;
    GLOBAL_ACCURACY.store(accuracy.0.to_bits(), Ordering::Relaxed);
    Ok(())
}

/// Returns the process-wide default tolerance.
pub fn get_accuracy() -> f64 {
    f64::from_bits(GLOBAL_ACCURACY.load(Ordering::Relaxed))
}

/// A length tolerance ε used for coincidence, coplanarity and in-sphere decisions.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Accuracy(f64);

impl Accuracy {
    pub fn new(value: f64) -> Result<Self, DiagramError> {
        if !value.is_finite() || value < 0.0 {
            return Err(DiagramError::InvalidParameter {
                name: "accuracy",
                value,
            });
        }
        Ok(Self(value))
    }

    /// Snapshot of the current process-wide default.
    pub fn global() -> Self {
        Self(get_accuracy())
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self(DEFAULT_ACCURACY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Accuracy::new(-1.0).is_err());
        assert!(Accuracy::new(f64::NAN).is_err());
        assert!(Accuracy::new(f64::INFINITY).is_err());
        assert!(set_accuracy(-1e-3).is_err());
        assert_eq!(Accuracy::new(0.0).unwrap().value(), 0.0);
    }

    #[test]
    fn test_default_value() {
        assert_eq!(Accuracy::default().value(), DEFAULT_ACCURACY);
    }
}
