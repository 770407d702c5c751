//! Artifact export — JSON run summaries and the CSV decision tape.
//!
//! All persisted artifacts include a `schema_version` field. Unknown
//! versions are rejected on load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::runner::{RunSummary, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunSummary` to pretty JSON.
pub fn export_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize RunSummary to JSON")
}

/// Deserialize a `RunSummary` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunSummary> {
    let summary: RunSummary =
        serde_json::from_str(json).context("failed to deserialize RunSummary from JSON")?;
    if summary.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            summary.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(summary)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the decision tape as CSV, one row per evaluated SKU.
///
/// Columns: product_id, sku_id, mark, new_price, new_promotion_price,
/// directives, error
pub fn export_decisions_csv(summary: &RunSummary) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "product_id",
        "sku_id",
        "mark",
        "new_price",
        "new_promotion_price",
        "directives",
        "error",
    ])?;

    for product in &summary.products {
        for r in &product.results {
            let directives = r
                .directives
                .iter()
                .map(|d| format!("{d:?}"))
                .collect::<Vec<_>>()
                .join("; ");
            wtr.write_record([
                &product.product_id.to_string(),
                &r.sku_id.map_or_else(String::new, |s| s.to_string()),
                &r.mark,
                &r.new_price.map_or_else(String::new, |p| format!("{p:.2}")),
                &r.new_promotion_price
                    .map_or_else(String::new, |p| format!("{p:.2}")),
                &directives,
                r.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Paths of the artifacts one run produced.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub summary: PathBuf,
    pub decisions_csv: Option<PathBuf>,
}

/// Write the artifact set for one run under `output_dir`.
///
/// Creates `summary.json` and, when requested, `decisions.csv`.
pub fn save_artifacts(
    summary: &RunSummary,
    output_dir: &Path,
    with_csv: bool,
) -> Result<ArtifactPaths> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir {}", output_dir.display()))?;

    let summary_path = output_dir.join("summary.json");
    fs::write(&summary_path, export_json(summary)?)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;

    let decisions_csv = if with_csv {
        let csv_path = output_dir.join("decisions.csv");
        fs::write(&csv_path, export_decisions_csv(summary)?)
            .with_context(|| format!("failed to write {}", csv_path.display()))?;
        Some(csv_path)
    } else {
        None
    };

    Ok(ArtifactPaths {
        summary: summary_path,
        decisions_csv,
    })
}

/// Load a previously saved run summary.
pub fn load_summary(path: &Path) -> Result<RunSummary> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
