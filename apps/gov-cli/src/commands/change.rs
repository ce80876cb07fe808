// change.rs — Change request subcommands: new, show, transition.

use std::path::Path;

use clap::Subcommand;
use uuid::Uuid;

use gov_workflow::{ChangeRequest, ChangeStateMachine, ChangeStatus, Priority, RolePolicy};

use crate::commands::{domain_err, open_store, parse_actor};

#[derive(Subcommand)]
pub enum ChangeCommands {
    /// Create a draft change request.
    New {
        project_id: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// low|medium|high|critical
        #[arg(long, default_value = "medium")]
        priority: String,
        /// May be given multiple times.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Print a change request as JSON.
    Show { change_id: Uuid },
}

pub fn execute(cmd: &ChangeCommands, state: &Path) -> anyhow::Result<()> {
    let store = open_store(state)?;
    let machine = ChangeStateMachine::new(&store);

    match cmd {
        ChangeCommands::New {
            project_id,
            title,
            description,
            priority,
            tags,
        } => {
            let mut change = ChangeRequest::new(project_id, title)
                .with_description(description)
                .with_priority(parse_priority(priority)?);
            for tag in tags {
                change = change.with_tag(tag);
            }
            machine.create(&change).map_err(|err| domain_err!(err))?;
            println!("{}", change.id);
        }
        ChangeCommands::Show { change_id } => {
            let change = machine.get(*change_id).map_err(|err| domain_err!(err))?;
            println!("{}", serde_json::to_string_pretty(&change)?);
        }
    }
    Ok(())
}

pub fn transition(
    state: &Path,
    change_id: Uuid,
    actor: &str,
    to: ChangeStatus,
    comment: Option<&str>,
) -> anyhow::Result<()> {
    let store = open_store(state)?;
    let machine = ChangeStateMachine::new(&store);
    let actor = parse_actor(actor)?;

    let event = machine
        .transition(change_id, &actor, to, comment, &RolePolicy::default())
        .map_err(|err| domain_err!(err))?;
    println!("{} -> {} (event {})", change_id, to, event.event_id);
    Ok(())
}

fn parse_priority(s: &str) -> anyhow::Result<Priority> {
    match s {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        "critical" => Ok(Priority::Critical),
        other => anyhow::bail!("invalid_argument: unknown priority '{other}'"),
    }
}
