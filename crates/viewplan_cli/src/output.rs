//! Terminal and JSON output.
use serde::Serialize;
use viewplan_core::{BatchViewAssignment, PlanSummary, ViewAssignment};

#[derive(Serialize)]
struct JsonSummary<'a, T> {
    run_id: String,
    kind: &'static str,
    participants: usize,
    rows: &'a [T],
}

/// Prints the outcome of a persisted run.
pub fn print_summary<T: Serialize>(summary: &PlanSummary<T>, json: bool) {
    if json {
        let output = JsonSummary {
            run_id: summary.run_id.to_string(),
            kind: summary.kind.as_str(),
            participants: summary.participants,
            rows: &summary.rows,
        };
        print_json(&output);
        return;
    }
    println!(
        "Stored {} {} rows for {} participants (run {})",
        summary.rows.len(),
        summary.kind.as_str(),
        summary.participants,
        summary.run_id,
    );
}

/// Prints unsaved per-participant rows.
pub fn print_views(rows: &[ViewAssignment], json: bool) {
    if json {
        print_json(&rows);
        return;
    }
    println!("participant | item | order");
    println!("------------|------|------");
    for row in rows {
        println!(
            "{:>11} | {:>4} | {:>5}",
            row.participant_id, row.item_id, row.view_order
        );
    }
    println!("\n{} rows (not stored)", rows.len());
}

/// Prints unsaved batch rows.
pub fn print_batch_views(rows: &[BatchViewAssignment], json: bool) {
    if json {
        print_json(&rows);
        return;
    }
    println!("participant | batch | item | order");
    println!("------------|-------|------|------");
    for row in rows {
        println!(
            "{:>11} | {:>5} | {:>4} | {:>5}",
            row.participant_id, row.batch_id, row.item_id, row.view_order
        );
    }
    println!("\n{} rows (not stored)", rows.len());
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => crate::bail(format!("Failed to encode JSON: {e}")),
    }
}
