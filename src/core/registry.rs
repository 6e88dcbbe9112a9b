//! Job type registry: the unit cost of each job type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::QueueError;

/// Mapping from job type to the units one job of that type occupies.
///
/// Zero-cost types are legal; they describe work with no local footprint
/// (for example a remote API call) and are admitted regardless of load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobTypeConfig {
    job_type_units: HashMap<String, f64>,
}

impl JobTypeConfig {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration. Values are checked by [`Self::validate`].
    #[must_use]
    pub fn with_job_type(mut self, job_type: impl Into<String>, units: f64) -> Self {
        self.job_type_units.insert(job_type.into(), units);
        self
    }

    /// Register or overwrite the unit cost of `job_type`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidUnits`] for negative or non-finite units.
    pub fn set_job_type_units(
        &mut self,
        job_type: impl Into<String>,
        units: f64,
    ) -> Result<(), QueueError> {
        let job_type = job_type.into();
        check_units(&job_type, units)?;
        self.job_type_units.insert(job_type, units);
        Ok(())
    }

    /// Unit cost of `job_type`, or `None` if it was never registered.
    #[must_use]
    pub fn job_type_units(&self, job_type: &str) -> Option<f64> {
        self.job_type_units.get(job_type).copied()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.job_type_units.len()
    }

    /// True if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.job_type_units.is_empty()
    }

    /// Iterate over `(job_type, units)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.job_type_units.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Check every registered cost.
    ///
    /// # Errors
    ///
    /// Returns the first [`QueueError::InvalidUnits`] found.
    pub fn validate(&self) -> Result<(), QueueError> {
        self.job_type_units
            .iter()
            .try_for_each(|(job_type, units)| check_units(job_type, *units))
    }
}

fn check_units(job_type: &str, units: f64) -> Result<(), QueueError> {
    if units.is_finite() && units >= 0.0 {
        Ok(())
    } else {
        Err(QueueError::InvalidUnits {
            job_type: job_type.to_owned(),
            units,
        })
    }
}
