//! The creaming-curve derivation.
//!
//! Rows are ranked by savings per unit cost, most efficient first, and two
//! running totals are taken over that order. Quotients follow IEEE-754: a
//! zero cost gives `+inf`/`-inf` (or NaN when savings are zero too) and the
//! value flows through unchanged.

use crate::error::{Error, Result};
use crate::table::{
    COST_COLUMN, CUMULATIVE_COST_COLUMN, CUMULATIVE_SAVINGS_COLUMN, DERIVED_COLUMNS, NAME_COLUMN,
    RATIO_COLUMN, SAVINGS_COLUMN, Table, Value,
};
use log::debug;
use std::cmp::Ordering;

/// One ranked project, in curve order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CurvePoint {
    pub name: String,
    pub cost: f64,
    pub savings: f64,
    pub ratio: f64,
    pub cumulative_cost: f64,
    pub cumulative_savings: f64,
}

/// Output of [`derive`]: the sorted table with derived columns appended,
/// and the same rows as typed points.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    pub table: Table,
    pub points: Vec<CurvePoint>,
}

/// Compute the creaming curve for a table.
///
/// Any derived columns already present are discarded and recomputed from
/// `Cost $` and `Annual Savings $ K`, so deriving a derived table yields the
/// same result bit for bit.
///
/// # Errors
/// * a required column is missing
/// * a cost or savings cell holds text that is not a number
///
/// # Examples
/// ```
/// use creaming::curve::derive;
/// use creaming::table::{Table, Value};
///
/// let mut table = Table::new(vec!["Cost $".into(), "Annual Savings $ K".into()]);
/// table.push_row(vec![Value::Number(100.0), Value::Number(50.0)]);
/// table.push_row(vec![Value::Number(200.0), Value::Number(150.0)]);
///
/// let curve = derive(&table).unwrap();
/// assert_eq!(curve.points[0].cumulative_cost, 200.0);
/// assert_eq!(curve.points[1].cumulative_savings, 200.0);
/// ```
pub fn derive(table: &Table) -> Result<Curve> {
    let mut base = table.clone();
    base.drop_columns(&DERIVED_COLUMNS);
    base.normalize();

    let cost_col = required(&base, COST_COLUMN)?;
    let savings_col = required(&base, SAVINGS_COLUMN)?;
    let name_col = base.column_index(NAME_COLUMN);

    let mut ranked = Vec::with_capacity(base.len());
    for (i, row) in base.rows.iter().enumerate() {
        let cost = numeric_cell(row, cost_col, i, COST_COLUMN)?;
        let savings = numeric_cell(row, savings_col, i, SAVINGS_COLUMN)?;
        ranked.push((i, cost, savings, savings / cost));
    }

    // Vec::sort_by is stable: equal ratios keep upload order.
    ranked.sort_by(|a, b| descending_nan_last(a.3, b.3));

    let cumulative_costs = running_total(ranked.iter().map(|r| r.1));
    let cumulative_savings = running_total(ranked.iter().map(|r| r.2));

    let mut out = Table::new(base.columns.clone());
    let mut points = Vec::with_capacity(ranked.len());
    for (k, &(i, cost, savings, ratio)) in ranked.iter().enumerate() {
        let mut row = base.rows[i].clone();
        row.push(Value::Number(ratio));
        row.push(Value::Number(cumulative_costs[k]));
        row.push(Value::Number(cumulative_savings[k]));
        out.rows.push(row);

        points.push(CurvePoint {
            name: name_col.map(|c| base.rows[i][c].label()).unwrap_or_default(),
            cost,
            savings,
            ratio,
            cumulative_cost: cumulative_costs[k],
            cumulative_savings: cumulative_savings[k],
        });
    }
    out.columns.extend(DERIVED_COLUMNS.iter().map(|c| c.to_string()));

    debug!(
        "derived curve over {} rows (columns: {:?})",
        points.len(),
        [RATIO_COLUMN, CUMULATIVE_COST_COLUMN, CUMULATIVE_SAVINGS_COLUMN]
    );

    Ok(Curve { table: out, points })
}

fn required(table: &Table, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| Error::Malformed(format!("missing required column '{}'", name)))
}

fn numeric_cell(row: &[Value], col: usize, index: usize, column: &str) -> Result<f64> {
    row[col].numeric().ok_or_else(|| Error::NotNumeric {
        row: index + 1,
        column: column.to_string(),
        value: row[col].label(),
    })
}

/// Descending order for ratios; NaN (missing) sorts after every number.
/// `-0.0` and `0.0` compare equal so their relative order is kept.
pub fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Prefix sums that skip missing values: a NaN input shows up as NaN in its
/// own slot but leaves the running total untouched.
pub fn running_total(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut total = 0.0;
    values
        .map(|v| {
            if v.is_nan() {
                f64::NAN
            } else {
                total += v;
                total
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_sorts_last() {
        let mut v = vec![f64::NAN, 1.0, f64::INFINITY, -2.0, f64::NEG_INFINITY];
        v.sort_by(|a, b| descending_nan_last(*a, *b));
        assert_eq!(v[0], f64::INFINITY);
        assert_eq!(v[1], 1.0);
        assert_eq!(v[2], -2.0);
        assert_eq!(v[3], f64::NEG_INFINITY);
        assert!(v[4].is_nan());
    }

    #[test]
    fn running_total_skips_missing() {
        let totals = running_total([1.0, f64::NAN, 2.0].into_iter());
        assert_eq!(totals[0], 1.0);
        assert!(totals[1].is_nan());
        assert_eq!(totals[2], 3.0);
    }
}
