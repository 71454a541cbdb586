//! Descriptive statistics over bucket counts

use crate::error::ComputeUndefined;

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64, ComputeUndefined> {
    if values.is_empty() {
        return Err(ComputeUndefined {
            statistic: "mean",
            samples: 0,
        });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
///
/// Undefined below two values: a single value has no spread to speak of.
pub fn population_stddev(values: &[f64]) -> Result<f64, ComputeUndefined> {
    if values.len() < 2 {
        return Err(ComputeUndefined {
            statistic: "standard deviation",
            samples: values.len(),
        });
    }
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Integer ratio that maps an empty denominator to an explicit error
pub fn ratio(total: u64, count: u64) -> Result<f64, ComputeUndefined> {
    if count == 0 {
        return Err(ComputeUndefined {
            statistic: "mean length",
            samples: 0,
        });
    }
    Ok(total as f64 / count as f64)
}
