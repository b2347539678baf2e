use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

/// Label column; optional, used for chart annotations.
pub const NAME_COLUMN: &str = "Project Summary Name";
/// Project cost, required.
pub const COST_COLUMN: &str = "Cost $";
/// Annual savings, required.
pub const SAVINGS_COLUMN: &str = "Annual Savings $ K";
/// Annual savings divided by cost.
pub const RATIO_COLUMN: &str = "Savings ratio";
/// Running total of cost in ratio order.
pub const CUMULATIVE_COST_COLUMN: &str = "Cumulative cost";
/// Running total of savings in ratio order.
pub const CUMULATIVE_SAVINGS_COLUMN: &str = "Cumulative Savings";

/// Columns appended by the derivation, in output order.
pub const DERIVED_COLUMNS: [&str; 3] = [
    RATIO_COLUMN,
    CUMULATIVE_COST_COLUMN,
    CUMULATIVE_SAVINGS_COLUMN,
];

lazy_static! {
    // "$1,250.50", "-$ 300", "1,000,000"
    static ref CURRENCY_REGEX: Regex =
        Regex::new(r"^(-)?\s*\$?\s*(-)?\s*([0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)(\.[0-9]*)?$").unwrap();
}

/// A single grid cell.
///
/// Serialises to a JSON number, string or `null`. Non-finite numbers have no
/// JSON representation and are sent as their text form (`"inf"`, `"NaN"`),
/// which [`Value::numeric`] parses back.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "RawValue")]
pub enum Value {
    Number(f64),
    Text(String),
    Empty,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
    Empty,
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Number(n) => Value::Number(n),
            RawValue::Text(s) => Value::Text(s),
            RawValue::Empty => Value::Empty,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Value::Number(n) => serializer.serialize_str(&n.to_string()),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Empty => serializer.serialize_none(),
        }
    }
}

impl Value {
    /// Numeric reading of the cell.
    ///
    /// `Empty` and blank text are missing values and read as NaN. Text is
    /// accepted when it is a plain float or a currency amount like
    /// `"$1,250.50"`. Returns `None` for anything else.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Empty => Some(f64::NAN),
            Value::Text(s) => parse_number(s),
        }
    }

    /// Display text used for labels.
    pub fn label(&self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::Text(s) => s.clone(),
            Value::Empty => String::new(),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(f64::NAN);
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return Some(n);
    }

    let caps = CURRENCY_REGEX.captures(trimmed)?;
    let negative = caps.get(1).is_some() || caps.get(2).is_some();
    let mut digits = caps[3].replace(',', "");
    if let Some(frac) = caps.get(4) {
        digits.push_str(frac.as_str());
    }
    let n = digits.parse::<f64>().ok()?;
    Some(if negative { -n } else { n })
}

/// One edit made in the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    /// Append a row of empty cells.
    AddRow,
    /// Delete the row at `row` (0-based).
    RemoveRow { row: usize },
    /// Overwrite one cell, addressing the column by header.
    SetCell {
        row: usize,
        column: String,
        value: Value,
    },
}

/// Ordered headers plus ordered rows.
///
/// Every row holds exactly one value per header once [`Table::normalize`]
/// has run; all constructors in this crate keep that shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row, padding with `Empty` or truncating to the header width.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Empty);
        self.rows.push(row);
    }

    /// Pad or truncate every row to the header width.
    pub fn normalize(&mut self) {
        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, Value::Empty);
        }
    }

    /// Cell at (`row`, column named `name`).
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.get(col)
    }

    /// Set every cell of `name` to `value`, appending the column if absent.
    pub fn fill_column(&mut self, name: &str, value: Value) {
        match self.column_index(name) {
            Some(col) => {
                for row in &mut self.rows {
                    row[col] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
    }

    /// Append a column from a list of values, one per row.
    pub fn push_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Remove the named columns where present.
    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();
        let mut idx = 0;
        self.columns.retain(|_| {
            idx += 1;
            keep[idx - 1]
        });
        for row in &mut self.rows {
            let mut idx = 0;
            row.retain(|_| {
                idx += 1;
                keep[idx - 1]
            });
        }
    }

    /// Apply one grid edit.
    pub fn apply(&mut self, edit: &Edit) -> Result<()> {
        match edit {
            Edit::AddRow => {
                self.push_row(Vec::new());
            }
            Edit::RemoveRow { row } => {
                if *row >= self.rows.len() {
                    return Err(Error::Edit(format!(
                        "row {} out of range ({} rows)",
                        row,
                        self.rows.len()
                    )));
                }
                self.rows.remove(*row);
            }
            Edit::SetCell { row, column, value } => {
                let col = self
                    .column_index(column)
                    .ok_or_else(|| Error::Edit(format!("unknown column '{}'", column)))?;
                let rows = self.rows.len();
                let target = self
                    .rows
                    .get_mut(*row)
                    .ok_or_else(|| Error::Edit(format!("row {} out of range ({} rows)", row, rows)))?;
                target[col] = value.clone();
            }
        }
        Ok(())
    }

    /// Apply edits in order, stopping at the first invalid one.
    pub fn apply_all(&mut self, edits: &[Edit]) -> Result<()> {
        for edit in edits {
            self.apply(edit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_currency_text() {
        assert_eq!(parse_number("$1,250.50"), Some(1250.5));
        assert_eq!(parse_number(" -$300 "), Some(-300.0));
        assert_eq!(parse_number("$-42"), Some(-42.0));
        assert_eq!(parse_number("1,000,000"), Some(1_000_000.0));
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert!(parse_number("").unwrap().is_nan());
        assert_eq!(parse_number("twelve"), None);
        assert_eq!(parse_number("1,00"), None);
    }

    #[test]
    fn non_finite_numbers_serialise_as_text() {
        let row = vec![
            Value::Number(f64::INFINITY),
            Value::Number(1.5),
            Value::Empty,
            Value::Text("x".into()),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"["inf",1.5,null,"x"]"#);

        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0].numeric(), Some(f64::INFINITY));
        assert_eq!(back[2], Value::Empty);
    }

    #[test]
    fn edits_apply_in_order() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.push_row(vec![Value::Number(1.0), Value::Number(2.0)]);

        table
            .apply_all(&[
                Edit::AddRow,
                Edit::SetCell {
                    row: 1,
                    column: "b".into(),
                    value: Value::Number(9.0),
                },
                Edit::RemoveRow { row: 0 },
            ])
            .unwrap();

        assert_eq!(table.rows, vec![vec![Value::Empty, Value::Number(9.0)]]);
    }

    #[test]
    fn bad_edits_are_rejected() {
        let mut table = Table::new(vec!["a".into()]);
        assert!(table.apply(&Edit::RemoveRow { row: 0 }).is_err());
        table.push_row(vec![]);
        let err = table.apply(&Edit::SetCell {
            row: 0,
            column: "zzz".into(),
            value: Value::Empty,
        });
        assert!(matches!(err, Err(Error::Edit(_))));
    }

    #[test]
    fn short_rows_from_json_do_not_panic() {
        let mut table: Table =
            serde_json::from_str(r#"{"columns":["a","b"],"rows":[[1]]}"#).unwrap();
        assert_eq!(table.get(0, "b"), None);

        table.normalize();
        assert_eq!(table.get(0, "b"), Some(&Value::Empty));
    }

    #[test]
    fn drop_columns_keeps_order() {
        let mut table = Table::new(vec!["a".into(), "b".into(), "c".into()]);
        table.push_row(vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
        ]);
        table.drop_columns(&["b"]);
        assert_eq!(table.columns, vec!["a", "c"]);
        assert_eq!(table.rows[0], vec![Value::Number(1.0), Value::Number(3.0)]);
    }
}
