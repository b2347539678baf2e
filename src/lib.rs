/*!
# Creaming Curve Analyzer

Ranks projects by cost-efficiency and shows how much annual saving each
extra dollar of spend buys.

## Overview

A creaming curve orders projects by savings per unit cost, most efficient
first, then plots cumulative cost against cumulative savings. Read against a
budget it shows which projects fit and where returns start to diminish.

The crate ingests a project table (XLSX or CSV), applies grid edits, derives
the curve, partitions it by a budget and renders three artifacts: a PNG
chart, a styled XLSX workbook and a one-slide PPTX deck.

## Pipeline

Every interaction is one call to [`analysis::analyze`]:

```text
upload ──► loader::ingest ──► Table
                               │  + edits, budget
                               ▼
                      analysis::analyze ──► Analysis
                               │
          ┌────────────────────┼────────────────────┐
          ▼                    ▼                    ▼
   graph::render_png   downloader::to_xlsx   slides::to_pptx
```

Nothing is stored between calls. The web frontend keeps the table in the
browser and posts it back with each change.

## Expected columns

- `Project Summary Name`: label shown on the chart
- `Cost $`: required
- `Annual Savings $ K`: required

Other columns pass through untouched. If either required column is missing,
both are reset to zero and a warning is reported.

## Modules

- **table**: cell values, the table type and grid edits
- **loader**: XLSX/CSV ingestion and the required-column check
- **curve**: ratio, ranking and running totals
- **budget**: budget threshold and row classification
- **graph**: scatter chart drawn with plotters
- **fonts**: TrueType registration for chart text
- **downloader**: XLSX and CSV export
- **slides**: PPTX export
- **analysis**: the per-interaction pipeline
- **app**: HTTP routes (feature `web`)

## REST API Endpoints

- `GET /` - page with upload control, grid, budget input and chart
- `POST /api/upload` - multipart upload, returns the ingested table
- `POST /api/analyze` - derived table, budget classes and chart
- `POST /api/export/xlsx` - spreadsheet download
- `POST /api/export/pptx` - presentation download
*/

pub mod analysis;
#[cfg(feature = "web")]
pub mod app;
pub mod budget;
pub mod config;
pub mod curve;
pub mod downloader;
pub mod error;
pub mod fonts;
pub mod format;
pub mod graph;
pub mod loader;
pub mod slides;
pub mod table;

pub use analysis::{Analysis, Artifacts, analyze};
pub use budget::{Budget, BudgetClass};
pub use curve::{Curve, CurvePoint, derive};
pub use error::{Error, Result};
pub use loader::{Ingested, ingest};
pub use table::{Edit, Table, Value};
