use std::path::Path;

use crate::runner::SimReport;

/// A saved run, used to check later runs with the same seed for drift.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub label: String,
    pub report: SimReport,
}

/// Load a baseline from a JSON file. Returns None if the file doesn't exist.
pub fn load_baseline(path: &Path) -> Option<Baseline> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save a baseline to a JSON file.
pub fn save_baseline(path: &Path, baseline: &Baseline) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(baseline).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// Placement differences between `current` and a baseline of the same seed.
/// Timings are ignored.
pub fn compare(current: &SimReport, baseline: &Baseline) -> Vec<String> {
    let base = &baseline.report;
    let mut diffs = Vec::new();

    if current.world_seed != base.world_seed {
        diffs.push(format!(
            "world seed {} differs from baseline seed {}",
            current.world_seed, base.world_seed
        ));
        return diffs;
    }

    let names = current.by_building.keys().chain(base.by_building.keys());
    let mut seen = std::collections::BTreeSet::new();
    for rdns in names {
        if !seen.insert(rdns) {
            continue;
        }
        let now = current.by_building.get(rdns).copied().unwrap_or(0);
        let then = base.by_building.get(rdns).copied().unwrap_or(0);
        if now != then {
            diffs.push(format!("{rdns}: {then} -> {now} spawns"));
        }
    }
    if current.chunks_processed != base.chunks_processed {
        diffs.push(format!(
            "chunks processed: {} -> {}",
            base.chunks_processed, current.chunks_processed
        ));
    }
    if current.enter_events != base.enter_events {
        diffs.push(format!(
            "enter events: {} -> {}",
            base.enter_events, current.enter_events
        ));
    }
    diffs
}

/// Format a run as markdown summary tables.
pub fn format_markdown(report: &SimReport) -> String {
    let mut out = String::new();
    out.push_str("| Seed | Catalog | Chunks | Spawned | Blocks | Cleared | Enter | Exit | Region (bytes) | Eval (ms) | Download (ms) |\n");
    out.push_str("|------|---------|--------|---------|--------|---------|-------|------|----------------|-----------|---------------|\n");
    out.push_str(&format!(
        "| {} | {} | {}/{} | {} | {} | {} | {} | {} | {} | {:.2} | {:.2} |\n",
        report.world_seed,
        report.catalog_size,
        report.chunks_processed,
        report.chunks_loaded,
        report.spawned,
        report.blocks_placed,
        report.blocks_cleared,
        report.enter_events,
        report.exit_events,
        report.region_bytes,
        report.evaluate_ms,
        report.download.elapsed_ms,
    ));
    if report.resumed {
        out.push_str("\nCatalog resumed from snapshot; buildings loaded on demand.\n");
    }

    if !report.by_building.is_empty() {
        out.push_str("\n| Building | Spawns |\n|----------|--------|\n");
        for (rdns, count) in &report.by_building {
            out.push_str(&format!("| {} | {} |\n", rdns, count));
        }
    }
    if !report.empty_reasons.is_empty() {
        out.push_str("\n| Empty chunk reason | Chunks |\n|--------------------|--------|\n");
        for (reason, count) in &report.empty_reasons {
            out.push_str(&format!("| {} | {} |\n", reason, count));
        }
    }
    out
}

/// Format a comparison report.
pub fn format_comparison(diffs: &[String]) -> String {
    if diffs.is_empty() {
        return "Placements match the baseline.\n".to_string();
    }
    let mut out = format!("PLACEMENT DRIFT ({} differences):\n", diffs.len());
    for diff in diffs {
        out.push_str(&format!("  - {}\n", diff));
    }
    out
}
