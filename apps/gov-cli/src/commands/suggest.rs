// suggest.rs — Suggestion subcommands: new, show, decide.

use std::path::Path;

use clap::Subcommand;
use uuid::Uuid;

use gov_suggest::{NewSuggestion, Outcome, SuggestionLifecycle};

use crate::commands::{domain_err, open_store, parse_actor};

#[derive(Subcommand)]
pub enum SuggestCommands {
    /// Propose a suggestion against an artifact.
    New {
        project_id: String,
        artifact_id: String,
        /// Artifact kind the suggestion targets.
        #[arg(long, default_value = "change_requests")]
        target_type: String,
        #[arg(long = "type", default_value = "manual")]
        suggestion_type: String,
        #[arg(long, default_value = "")]
        rationale: String,
        #[arg(long, default_value = "0.5")]
        confidence: f64,
        /// Idempotence key; re-proposing the same key returns the
        /// existing proposed suggestion.
        #[arg(long)]
        trigger_key: Option<String>,
        /// Acting user as <user-id>:<role>.
        #[arg(long = "as")]
        actor: String,
    },
    /// Print a suggestion as JSON.
    Show { suggestion_id: Uuid },
    /// Apply or reject a proposed suggestion.
    Decide {
        suggestion_id: Uuid,
        /// apply|reject
        outcome: String,
        /// Acting user as <user-id>:<role>.
        #[arg(long = "as")]
        actor: String,
    },
}

pub fn execute(cmd: &SuggestCommands, state: &Path) -> anyhow::Result<()> {
    let store = open_store(state)?;
    let lifecycle = SuggestionLifecycle::new(&store);

    match cmd {
        SuggestCommands::New {
            project_id,
            artifact_id,
            target_type,
            suggestion_type,
            rationale,
            confidence,
            trigger_key,
            actor,
        } => {
            let mut new = NewSuggestion::new(project_id, artifact_id, target_type, suggestion_type)
                .with_rationale(rationale)
                .with_confidence(*confidence);
            if let Some(key) = trigger_key {
                new = new.with_trigger_key(key);
            }
            let actor = parse_actor(actor)?.to_ref();
            let suggestion = lifecycle
                .propose(new, &actor)
                .map_err(|err| domain_err!(err))?;
            println!("{}", suggestion.id);
        }
        SuggestCommands::Show { suggestion_id } => {
            let suggestion = lifecycle
                .get(*suggestion_id)
                .map_err(|err| domain_err!(err))?;
            println!("{}", serde_json::to_string_pretty(&suggestion)?);
        }
        SuggestCommands::Decide {
            suggestion_id,
            outcome,
            actor,
        } => {
            let outcome = match outcome.as_str() {
                "apply" => Outcome::Applied,
                "reject" => Outcome::Rejected,
                other => anyhow::bail!("invalid_argument: unknown outcome '{other}'"),
            };
            let actor = parse_actor(actor)?.to_ref();
            let suggestion = lifecycle
                .decide(*suggestion_id, outcome, &actor)
                .map_err(|err| domain_err!(err))?;
            println!("{} -> {}", suggestion.id, suggestion.status);
        }
    }
    Ok(())
}
