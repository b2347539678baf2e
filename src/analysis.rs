//! One interaction, end to end.
//!
//! Every change in the UI (new upload, grid edit, budget change) re-runs
//! [`analyze`] on the current table. Nothing is cached between runs.

use crate::budget::{Budget, BudgetClass};
use crate::curve::{Curve, derive};
use crate::downloader::to_xlsx;
use crate::error::Result;
use crate::graph::{GraphOptions, render_png};
use crate::slides::{SlideImage, slide_title, to_pptx};
use crate::table::{Edit, Table};
use log::info;

/// Derived table plus its budget partition.
#[derive(Clone, Debug, PartialEq)]
pub struct Analysis {
    pub curve: Curve,
    /// Budget class per row, in curve order.
    pub classes: Vec<BudgetClass>,
    pub budget: Budget,
}

/// The three downloadable/displayable outputs of one run.
#[derive(Clone, Debug)]
pub struct Artifacts {
    pub chart_png: Vec<u8>,
    pub xlsx: Vec<u8>,
    pub pptx: Vec<u8>,
}

/// Apply grid edits to `table`, derive the curve and partition it by `budget`.
///
/// The input table is left untouched.
pub fn analyze(table: &Table, edits: &[Edit], budget: Budget) -> Result<Analysis> {
    let mut edited = table.clone();
    edited.normalize();
    edited.apply_all(edits)?;

    let curve = derive(&edited)?;
    let classes = budget.partition(&curve.points);
    info!(
        "analysis: {} rows, {} edits, budget {}, {} within budget",
        curve.points.len(),
        edits.len(),
        budget.amount(),
        classes
            .iter()
            .filter(|c| **c == BudgetClass::WithinBudget)
            .count()
    );

    Ok(Analysis {
        curve,
        classes,
        budget,
    })
}

impl Analysis {
    /// Derived table in curve order.
    pub fn table(&self) -> &Table {
        &self.curve.table
    }

    /// Slide title for this run's budget.
    pub fn title(&self) -> String {
        slide_title(self.budget)
    }

    pub fn chart_png(&self, options: &GraphOptions) -> Result<Vec<u8>> {
        render_png(&self.curve.points, &self.classes, self.budget, options)
    }

    pub fn spreadsheet(&self) -> Result<Vec<u8>> {
        to_xlsx(&self.curve.table, &self.classes)
    }

    /// Render the chart and wrap it in a one-slide presentation.
    pub fn presentation(&self, options: &GraphOptions) -> Result<Vec<u8>> {
        let png = self.chart_png(options)?;
        self.presentation_with(&png, options)
    }

    fn presentation_with(&self, png: &[u8], options: &GraphOptions) -> Result<Vec<u8>> {
        to_pptx(
            &self.title(),
            SlideImage {
                png,
                width: options.width,
                height: options.height,
            },
        )
    }

    /// Chart, spreadsheet and presentation, rendering the chart once.
    pub fn artifacts(&self, options: &GraphOptions) -> Result<Artifacts> {
        let chart_png = self.chart_png(options)?;
        let xlsx = self.spreadsheet()?;
        let pptx = self.presentation_with(&chart_png, options)?;
        Ok(Artifacts {
            chart_png,
            xlsx,
            pptx,
        })
    }
}
