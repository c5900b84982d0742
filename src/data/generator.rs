//! Synthetic datasets drawn from a few standard distributions.

use crate::error::{IdmdError, Result};
use polars::prelude::*;
use rand::Rng;
use rand_distr::{Distribution as _, Normal};
use serde::{Deserialize, Serialize};

/// A distribution together with its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// Gaussian with the given mean and standard deviation
    Normal { mean: f64, std: f64 },
    /// Continuous uniform over `[low, high)`
    Uniform { low: f64, high: f64 },
    /// Integers drawn uniformly from `[low, high)`
    RandomInteger { low: i64, high: i64 },
}

impl Distribution {
    pub fn standard_normal() -> Self {
        Self::Normal {
            mean: 0.0,
            std: 1.0,
        }
    }

    pub fn unit_uniform() -> Self {
        Self::Uniform {
            low: 0.0,
            high: 1.0,
        }
    }

    pub fn percent_integers() -> Self {
        Self::RandomInteger { low: 0, high: 100 }
    }

    /// Column name prefix, e.g. "Normal Distribution".
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal { .. } => "Normal Distribution",
            Self::Uniform { .. } => "Uniform Distribution",
            Self::RandomInteger { .. } => "Random Integers",
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Self::Normal { mean, std } => {
                if !mean.is_finite() || !std.is_finite() {
                    return Err(IdmdError::InvalidParams(
                        "mean and std must be finite".to_owned(),
                    ));
                }
                if std < 0.0 {
                    return Err(IdmdError::InvalidParams(format!(
                        "std must be non-negative, got {std}"
                    )));
                }
            }
            Self::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() {
                    return Err(IdmdError::InvalidParams(
                        "bounds must be finite".to_owned(),
                    ));
                }
                if low >= high {
                    return Err(IdmdError::InvalidParams(format!(
                        "low ({low}) must be below high ({high})"
                    )));
                }
                if !(high - low).is_finite() {
                    return Err(IdmdError::InvalidParams(format!(
                        "range {low}..{high} is too wide to sample"
                    )));
                }
            }
            Self::RandomInteger { low, high } => {
                if low >= high {
                    return Err(IdmdError::InvalidParams(format!(
                        "low ({low}) must be below high ({high})"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Generates `cols` independent columns of `rows` draws each.
///
/// Columns are named `"<label> <i>"` for `i` in `1..=cols`.
///
/// # Errors
///
/// `InvalidShape` when either dimension is zero, `InvalidParams` when the
/// distribution parameters are out of domain.
pub fn generate(distribution: Distribution, rows: usize, cols: usize) -> Result<DataFrame> {
    generate_with_rng(distribution, rows, cols, &mut rand::thread_rng())
}

/// Like [`generate`], drawing from the supplied RNG.
pub fn generate_with_rng<R: Rng + ?Sized>(
    distribution: Distribution,
    rows: usize,
    cols: usize,
    rng: &mut R,
) -> Result<DataFrame> {
    if rows == 0 || cols == 0 {
        return Err(IdmdError::InvalidShape(format!(
            "shape must be positive, got ({rows}, {cols})"
        )));
    }
    distribution.validate()?;

    let label = distribution.label();
    let mut columns = Vec::with_capacity(cols);
    for i in 1..=cols {
        let name = format!("{label} {i}");
        let series = match distribution {
            Distribution::Normal { mean, std } => {
                let normal = Normal::new(mean, std)
                    .map_err(|e| IdmdError::InvalidParams(e.to_string()))?;
                let values: Vec<f64> = (0..rows).map(|_| normal.sample(rng)).collect();
                Series::new(name.into(), values)
            }
            Distribution::Uniform { low, high } => {
                let values: Vec<f64> = (0..rows).map(|_| rng.gen_range(low..high)).collect();
                Series::new(name.into(), values)
            }
            Distribution::RandomInteger { low, high } => {
                let values: Vec<i64> = (0..rows).map(|_| rng.gen_range(low..high)).collect();
                Series::new(name.into(), values)
            }
        };
        columns.push(Column::from(series));
    }

    tracing::debug!("Generated {rows}x{cols} table from {label}");
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    fn f64_column(df: &DataFrame, name: &str) -> Float64Chunked {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_normal_distribution_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        let df = generate_with_rng(
            Distribution::Normal {
                mean: 5.0,
                std: 2.0,
            },
            1000,
            1,
            &mut rng,
        )
        .unwrap();

        assert_eq!(df.height(), 1000);
        let ca = f64_column(&df, "Normal Distribution 1");
        assert!((ca.mean().unwrap() - 5.0).abs() < 0.5);
        assert!((ca.std(1).unwrap() - 2.0).abs() < 0.5);
    }

    #[test]
    fn test_random_integers_within_bounds() {
        let df = generate(Distribution::RandomInteger { low: 10, high: 20 }, 500, 1).unwrap();
        assert_eq!(df.height(), 500);
        let col = df.column("Random Integers 1").unwrap();
        assert_eq!(col.dtype(), &DataType::Int64);
        let ca = f64_column(&df, "Random Integers 1");
        assert!(ca.min().unwrap() >= 10.0);
        assert!(ca.max().unwrap() < 20.0);
    }

    #[test]
    fn test_uniform_within_bounds() {
        let df = generate(
            Distribution::Uniform {
                low: 0.0,
                high: 10.0,
            },
            500,
            1,
        )
        .unwrap();
        let ca = f64_column(&df, "Uniform Distribution 1");
        assert!(ca.min().unwrap() >= 0.0);
        assert!(ca.max().unwrap() < 10.0);
    }

    #[test]
    fn test_column_naming() {
        let df = generate(Distribution::standard_normal(), 3, 3).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Normal Distribution 1",
                "Normal Distribution 2",
                "Normal Distribution 3"
            ]
        );
    }

    #[test]
    fn test_invalid_shape() {
        assert!(matches!(
            generate(Distribution::unit_uniform(), 0, 2),
            Err(IdmdError::InvalidShape(_))
        ));
        assert!(matches!(
            generate(Distribution::unit_uniform(), 2, 0),
            Err(IdmdError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_invalid_params() {
        assert!(matches!(
            generate(
                Distribution::Normal {
                    mean: 0.0,
                    std: -1.0
                },
                5,
                1
            ),
            Err(IdmdError::InvalidParams(_))
        ));
        assert!(matches!(
            generate(
                Distribution::Uniform {
                    low: 1.0,
                    high: 1.0
                },
                5,
                1
            ),
            Err(IdmdError::InvalidParams(_))
        ));
        assert!(matches!(
            generate(Distribution::RandomInteger { low: 5, high: 2 }, 5, 1),
            Err(IdmdError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_overflowing_uniform_range_is_rejected() {
        let result = generate(
            Distribution::Uniform {
                low: -1.0e308,
                high: 1.0e308,
            },
            3,
            1,
        );
        assert!(matches!(result, Err(IdmdError::InvalidParams(_))));

        let wide = generate(
            Distribution::Uniform {
                low: -1.0e307,
                high: 1.0e307,
            },
            3,
            1,
        )
        .unwrap();
        assert_eq!(wide.height(), 3);
    }

    #[test]
    fn test_zero_std_is_constant() {
        let df = generate(
            Distribution::Normal {
                mean: 3.0,
                std: 0.0,
            },
            10,
            1,
        )
        .unwrap();
        let ca = f64_column(&df, "Normal Distribution 1");
        assert!(ca.into_iter().flatten().all(|v| (v - 3.0).abs() < f64::EPSILON));
    }
}
