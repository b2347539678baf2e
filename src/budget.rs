use crate::curve::CurvePoint;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Spending threshold in the same units as cumulative cost.
///
/// Zero means "no threshold": nothing is partitioned.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize)]
pub struct Budget(f64);

impl Budget {
    /// Reject negative and non-finite amounts.
    pub fn new(amount: f64) -> Result<Self> {
        if amount.is_finite() && amount >= 0.0 {
            Ok(Budget(amount))
        } else {
            Err(Error::Budget(amount))
        }
    }

    pub fn amount(self) -> f64 {
        self.0
    }

    pub fn is_set(self) -> bool {
        self.0 > 0.0
    }

    /// Classify one cumulative cost against this budget.
    pub fn classify(self, cumulative_cost: f64) -> BudgetClass {
        if !self.is_set() {
            BudgetClass::Unpartitioned
        } else if cumulative_cost <= self.0 {
            BudgetClass::WithinBudget
        } else {
            // NaN compares false and lands here too
            BudgetClass::OutsideBudget
        }
    }

    /// Classify every point of a curve, in curve order.
    pub fn partition(self, points: &[CurvePoint]) -> Vec<BudgetClass> {
        points
            .iter()
            .map(|p| self.classify(p.cumulative_cost))
            .collect()
    }
}

impl<'de> Deserialize<'de> for Budget {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let amount = f64::deserialize(d)?;
        Budget::new(amount).map_err(serde::de::Error::custom)
    }
}

/// Where a row falls relative to the budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetClass {
    WithinBudget,
    OutsideBudget,
    /// Budget is zero; every row shares one neutral category.
    Unpartitioned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_is_unpartitioned() {
        let budget = Budget::new(0.0).unwrap();
        assert_eq!(budget.classify(-5.0), BudgetClass::Unpartitioned);
        assert_eq!(budget.classify(1e9), BudgetClass::Unpartitioned);
    }

    #[test]
    fn threshold_is_inclusive() {
        let budget = Budget::new(250.0).unwrap();
        assert_eq!(budget.classify(250.0), BudgetClass::WithinBudget);
        assert_eq!(budget.classify(250.5), BudgetClass::OutsideBudget);
        assert_eq!(budget.classify(f64::NAN), BudgetClass::OutsideBudget);
    }

    #[test]
    fn invalid_budgets_rejected() {
        assert!(Budget::new(-1.0).is_err());
        assert!(Budget::new(f64::INFINITY).is_err());
        assert!(serde_json::from_str::<Budget>("-3").is_err());
        assert_eq!(serde_json::from_str::<Budget>("100").unwrap().amount(), 100.0);
    }
}
