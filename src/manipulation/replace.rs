//! Value replacement in a single column.
//!
//! A replacement is described by a [`ReplacementSpec`]: which values to target
//! ([`ValueSelector`]) and what to put in their place ([`ReplacementPolicy`]).
//! Replacement statistics are always computed over the *retained* values:
//! the non-missing values the selector did not pick.
//!
//! Outliers follow the 1.5 × IQR rule: with Q1/Q3 the linearly interpolated
//! quartiles of the non-missing values, anything strictly outside
//! `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]` is an outlier.

use crate::error::{IdmdError, Result};
use crate::utils::numeric_values;
use polars::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const IQR_MULTIPLIER: f64 = 1.5;

/// Which values of the column get replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSelector {
    /// Numeric zeros
    Zero,
    /// Nulls, and NaN in float columns
    Missing,
    /// Values outside the IQR fences
    Outlier,
    /// Union of `Missing` and `Outlier`
    MissingAndOutlier,
}

impl ValueSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Missing => "missing",
            Self::Outlier => "outlier",
            Self::MissingAndOutlier => "missing_and_outlier",
        }
    }

    pub fn requires_numeric(&self) -> bool {
        matches!(self, Self::Outlier | Self::MissingAndOutlier)
    }
}

impl fmt::Display for ValueSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueSelector {
    type Err = IdmdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "0" | "zero" | "zeros" => Ok(Self::Zero),
            "np.nan" | "nan" | "missing" | "null" => Ok(Self::Missing),
            "outlier" | "outliers" => Ok(Self::Outlier),
            "all" | "missing_and_outlier" => Ok(Self::MissingAndOutlier),
            other => Err(IdmdError::InvalidParams(format!(
                "unknown value selector '{other}'"
            ))),
        }
    }
}

/// What the selected values are replaced with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    Median,
    Min,
    Max,
    /// One value drawn uniformly from the retained values
    RandomSample,
    /// Null
    MissingMarker,
}

impl ReplacementPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::RandomSample => "random_sample",
            Self::MissingMarker => "missing_marker",
        }
    }

    pub fn requires_numeric(&self) -> bool {
        matches!(self, Self::Median | Self::Min | Self::Max)
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplacementPolicy {
    type Err = IdmdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "median" => Ok(Self::Median),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "random" | "random_sample" => Ok(Self::RandomSample),
            "np.nan" | "nan" | "missing" | "missing_marker" | "null" => Ok(Self::MissingMarker),
            other => Err(IdmdError::InvalidParams(format!(
                "unknown replacement policy '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementSpec {
    pub column: String,
    pub selector: ValueSelector,
    pub policy: ReplacementPolicy,
}

impl ReplacementSpec {
    pub fn new(column: impl Into<String>, selector: ValueSelector, policy: ReplacementPolicy) -> Self {
        Self {
            column: column.into(),
            selector,
            policy,
        }
    }
}

impl fmt::Display for ReplacementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.column, self.selector, self.policy)
    }
}

/// Parses `COLUMN:SELECTOR:POLICY`. The column part may itself contain colons.
impl FromStr for ReplacementSpec {
    type Err = IdmdError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(policy), Some(selector), Some(column)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(IdmdError::InvalidParams(format!(
                "expected COLUMN:SELECTOR:POLICY, got '{s}'"
            )));
        };
        if column.is_empty() {
            return Err(IdmdError::InvalidParams("empty column name".to_owned()));
        }
        Ok(Self::new(column, selector.parse()?, policy.parse()?))
    }
}

/// Tukey fences around the interquartile range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower && v <= self.upper
    }
}

/// Fences for `values`, or `None` when there are no values.
pub fn iqr_bounds(values: &[f64]) -> Option<OutlierBounds> {
    let ca = Float64Chunked::from_slice("values".into(), values);
    let q1 = ca.quantile(0.25, QuantileMethod::Linear).ok()??;
    let q3 = ca.quantile(0.75, QuantileMethod::Linear).ok()??;
    let iqr = q3 - q1;
    Some(OutlierBounds {
        q1,
        q3,
        lower: q1 - IQR_MULTIPLIER * iqr,
        upper: q3 + IQR_MULTIPLIER * iqr,
    })
}

fn missing_mask(series: &Series) -> Result<Vec<bool>> {
    if series.dtype().is_float() {
        let cast = series.cast(&DataType::Float64)?;
        Ok(cast
            .f64()?
            .into_iter()
            .map(|v| v.is_none_or(f64::is_nan))
            .collect())
    } else {
        Ok(series
            .is_null()
            .into_iter()
            .map(|v| v.unwrap_or(true))
            .collect())
    }
}

fn zero_mask(col: &Column) -> Result<Vec<bool>> {
    if !col.dtype().is_primitive_numeric() {
        return Ok(vec![false; col.len()]);
    }
    Ok(numeric_values(col)?
        .into_iter()
        .map(|v| v.is_some_and(|x| x == 0.0))
        .collect())
}

fn outlier_mask(col: &Column) -> Result<Vec<bool>> {
    let values = numeric_values(col)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let Some(bounds) = iqr_bounds(&present) else {
        return Ok(vec![false; values.len()]);
    };
    tracing::debug!(
        "Outlier fences for '{}': [{}, {}]",
        col.name(),
        bounds.lower,
        bounds.upper
    );
    Ok(values
        .into_iter()
        .map(|v| v.is_some_and(|x| !bounds.contains(x)))
        .collect())
}

/// Positions the selector targets.
pub fn selection_mask(col: &Column, selector: ValueSelector) -> Result<Vec<bool>> {
    let series = col.as_materialized_series();
    match selector {
        ValueSelector::Zero => zero_mask(col),
        ValueSelector::Missing => missing_mask(series),
        ValueSelector::Outlier => outlier_mask(col),
        ValueSelector::MissingAndOutlier => {
            let missing = missing_mask(series)?;
            let outliers = outlier_mask(col)?;
            Ok(missing
                .into_iter()
                .zip(outliers)
                .map(|(m, o)| m || o)
                .collect())
        }
    }
}

/// Replaces the selected values of one column; see the module docs.
///
/// # Errors
///
/// - `InvalidColumn` if the column does not exist.
/// - `UnsupportedPolicy` for median/min/max or outlier selection on a
///   non-numeric column.
/// - `EmptyRetainedSet` when a statistic or sample is needed but every
///   value was selected or missing.
pub fn replace_values(df: &DataFrame, spec: &ReplacementSpec) -> Result<DataFrame> {
    replace_values_with_rng(df, spec, &mut rand::thread_rng())
}

/// Like [`replace_values`], drawing random samples from the supplied RNG.
pub fn replace_values_with_rng<R: Rng + ?Sized>(
    df: &DataFrame,
    spec: &ReplacementSpec,
    rng: &mut R,
) -> Result<DataFrame> {
    let col = df
        .column(&spec.column)
        .map_err(|_| IdmdError::InvalidColumn(spec.column.clone()))?;

    if !col.dtype().is_primitive_numeric()
        && (spec.selector.requires_numeric() || spec.policy.requires_numeric())
    {
        return Err(IdmdError::UnsupportedPolicy(format!(
            "'{}' on non-numeric column '{}' ({})",
            spec,
            spec.column,
            col.dtype()
        )));
    }

    let mask = selection_mask(col, spec.selector)?;
    let selected = mask.iter().filter(|&&m| m).count();
    if selected == 0 {
        tracing::debug!("No values matched {spec}; column unchanged");
        return Ok(df.clone());
    }

    let series = col.as_materialized_series();
    let missing = missing_mask(series)?;
    let retained: Vec<usize> = mask
        .iter()
        .zip(&missing)
        .enumerate()
        .filter(|(_, (m, miss))| !**m && !**miss)
        .map(|(i, _)| i)
        .collect();

    let replaced = match spec.policy {
        ReplacementPolicy::Median => {
            fill_with_statistic(series, &mask, &retained, spec, |ca| ca.median())?
        }
        ReplacementPolicy::Min => fill_with_statistic(series, &mask, &retained, spec, |ca| ca.min())?,
        ReplacementPolicy::Max => fill_with_statistic(series, &mask, &retained, spec, |ca| ca.max())?,
        ReplacementPolicy::RandomSample => {
            let Some(&source) = retained.choose(rng) else {
                return Err(empty_retained(spec));
            };
            gather(series, &mask, Some(source))?
        }
        ReplacementPolicy::MissingMarker => gather(series, &mask, None)?,
    };

    tracing::debug!("Replaced {selected} values using {spec}");
    let mut out = df.clone();
    out.with_column(replaced)?;
    Ok(out)
}

fn empty_retained(spec: &ReplacementSpec) -> IdmdError {
    IdmdError::EmptyRetainedSet(format!(
        "every value of '{}' is selected or missing",
        spec.column
    ))
}

/// Rebuilds the column by index: unmasked rows keep their own value, masked
/// rows take row `source`, or null when `source` is `None`. Keeps the dtype.
fn gather(series: &Series, mask: &[bool], source: Option<usize>) -> Result<Series> {
    let to_idx = |i: usize| IdxSize::try_from(i).ok();
    let idx: IdxCa = mask
        .iter()
        .enumerate()
        .map(|(i, &m)| if m { source.and_then(to_idx) } else { to_idx(i) })
        .collect();
    Ok(series.take(&idx)?)
}

fn fill_with_statistic(
    series: &Series,
    mask: &[bool],
    retained: &[usize],
    spec: &ReplacementSpec,
    statistic: impl Fn(&Float64Chunked) -> Option<f64>,
) -> Result<Series> {
    let as_f64 = series.cast(&DataType::Float64)?;
    let values = as_f64.f64()?;

    let kept: Vec<f64> = retained
        .iter()
        .filter_map(|&i| values.get(i))
        .collect();
    if kept.is_empty() {
        return Err(empty_retained(spec));
    }
    let kept = Float64Chunked::from_vec("retained".into(), kept);
    let fill = statistic(&kept).ok_or_else(|| empty_retained(spec))?;

    let filled: Vec<Option<f64>> = values
        .into_iter()
        .zip(mask)
        .map(|(v, &m)| if m { Some(fill) } else { v })
        .collect();
    let filled = Series::new(series.name().clone(), filled);

    let original = series.dtype();
    if original.is_integer() && (fill - fill.round()).abs() < f64::EPSILON {
        Ok(filled.cast(original)?)
    } else {
        Ok(filled)
    }
}
