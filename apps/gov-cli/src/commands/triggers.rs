// triggers.rs — Automation rule management and event matching.

use std::fs;
use std::path::Path;

use gov_trigger::{TriggerMatcher, TriggerRule};

use crate::commands::{domain_err, open_store};

pub fn add(state: &Path, file: &Path) -> anyhow::Result<()> {
    let json = fs::read_to_string(file)
        .map_err(|err| anyhow::anyhow!("invalid_argument: cannot read {}: {err}", file.display()))?;
    let rule: TriggerRule = serde_json::from_str(&json)
        .map_err(|err| anyhow::anyhow!("invalid_argument: malformed rule: {err}"))?;

    let store = open_store(state)?;
    TriggerMatcher::new(&store)
        .add_rule(&rule)
        .map_err(|err| domain_err!(err))?;
    println!("{}", rule.id);
    Ok(())
}

pub fn match_rules(
    state: &Path,
    project_id: &str,
    artifact_type: &str,
    event_type: &str,
) -> anyhow::Result<()> {
    let store = open_store(state)?;
    let fired = TriggerMatcher::new(&store)
        .matches(project_id, artifact_type, event_type)
        .map_err(|err| domain_err!(err))?;

    if fired.is_empty() {
        println!("No matching rules.");
        return Ok(());
    }
    for m in &fired {
        println!(
            "{}  [{:?}] {}  severity={}  auto_execute={}",
            m.rule_id, m.scope, m.ai_intent, m.severity, m.auto_execute
        );
        for step in &m.ai_steps {
            println!("    - {step}");
        }
    }
    Ok(())
}
