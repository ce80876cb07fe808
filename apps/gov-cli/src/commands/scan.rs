// scan.rs — Run the escalation scanner once.

use std::path::Path;

use gov_suggest::EscalationScanner;

use crate::commands::{domain_err, open_store};

pub fn execute(state: &Path, project_id: &str, days: i64) -> anyhow::Result<()> {
    let store = open_store(state)?;
    let outcome = EscalationScanner::new(&store)
        .scan(project_id, days)
        .map_err(|err| domain_err!(err))?;

    println!(
        "Scanned {} stale suggestion(s), created {} escalation(s).",
        outcome.scanned,
        outcome.created.len()
    );
    for suggestion in &outcome.created {
        println!(
            "  {}  {}  {}",
            suggestion.id,
            suggestion.trigger_key.as_deref().unwrap_or("-"),
            suggestion.rationale
        );
    }
    Ok(())
}
