//! Queue configuration: capacity plus the job type registry.

use serde::{Deserialize, Serialize};

use crate::core::JobTypeConfig;

/// Environment variable holding the queue's total units.
pub const TOTAL_UNITS_ENV: &str = "RESOURCE_QUEUE_TOTAL_UNITS";

/// Environment variable holding job type costs as `name=units,name=units`.
pub const JOB_TYPES_ENV: &str = "RESOURCE_QUEUE_JOB_TYPES";

/// Root queue configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum concurrent resource units.
    pub total_units: f64,
    /// Unit cost per job type.
    #[serde(default)]
    pub job_types: JobTypeConfig,
}

impl QueueConfig {
    /// Configuration with `total_units` capacity and no job types.
    #[must_use]
    pub fn new(total_units: f64) -> Self {
        Self {
            total_units,
            job_types: JobTypeConfig::new(),
        }
    }

    /// Builder-style job type registration.
    #[must_use]
    pub fn with_job_type(mut self, job_type: impl Into<String>, units: f64) -> Self {
        self.job_types = self.job_types.with_job_type(job_type, units);
        self
    }

    /// Validate capacity and job type costs.
    ///
    /// Job types costing more than `total_units` are allowed here; enqueueing
    /// one is rejected with `CapacityExceeded`.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if !self.total_units.is_finite() || self.total_units <= 0.0 {
            return Err(format!(
                "total_units must be a positive finite number, got {}",
                self.total_units
            ));
        }
        self.job_types.validate().map_err(|e| e.to_string())
    }

    /// Parse queue configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Reads [`TOTAL_UNITS_ENV`] (required) and [`JOB_TYPES_ENV`] (optional).
    ///
    /// # Errors
    ///
    /// Returns a message if a variable is missing or malformed.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_total = lookup(TOTAL_UNITS_ENV).ok_or_else(|| format!("{TOTAL_UNITS_ENV} is not set"))?;
        let total_units = raw_total
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("{TOTAL_UNITS_ENV}: {e}"))?;

        let job_types = match lookup(JOB_TYPES_ENV) {
            Some(raw) => parse_job_types(&raw)?,
            None => JobTypeConfig::new(),
        };

        let cfg = Self {
            total_units,
            job_types,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Parse `name=units` pairs separated by commas. Names may contain spaces.
fn parse_job_types(raw: &str) -> Result<JobTypeConfig, String> {
    let mut job_types = JobTypeConfig::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, units) = entry
            .rsplit_once('=')
            .ok_or_else(|| format!("{JOB_TYPES_ENV}: expected name=units, got `{entry}`"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("{JOB_TYPES_ENV}: empty job type name in `{entry}`"));
        }
        let units = units
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("{JOB_TYPES_ENV}: `{entry}`: {e}"))?;
        job_types
            .set_job_type_units(name, units)
            .map_err(|e| format!("{JOB_TYPES_ENV}: {e}"))?;
    }
    Ok(job_types)
}
