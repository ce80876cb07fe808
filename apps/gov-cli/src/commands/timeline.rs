// timeline.rs — Audit timeline query.

use std::path::Path;

use clap::ValueEnum;
use uuid::Uuid;

use gov_audit::{AuditLog, TimelineSubject};

use crate::commands::{domain_err, open_store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SubjectKind {
    Change,
    Artifact,
    Project,
}

pub fn execute(state: &Path, subject: &str, kind: SubjectKind, limit: usize) -> anyhow::Result<()> {
    let subject = match kind {
        SubjectKind::Change => {
            let id: Uuid = subject
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid_argument: '{subject}' is not a change id"))?;
            TimelineSubject::Change(id)
        }
        SubjectKind::Artifact => TimelineSubject::Artifact(subject.to_string()),
        SubjectKind::Project => TimelineSubject::Project(subject.to_string()),
    };

    let store = open_store(state)?;
    let events = AuditLog::new(&store)
        .timeline(&subject, limit)
        .map_err(|err| domain_err!(err))?;

    if events.is_empty() {
        println!("No events.");
        return Ok(());
    }

    println!("{:<26} {:<22} {:<20} COMMENT", "TIMESTAMP", "ACTION", "ACTOR");
    println!("{}", "-".repeat(88));
    for event in &events {
        println!(
            "{:<26} {:<22} {:<20} {}",
            event.created_at.format("%Y-%m-%d %H:%M:%S"),
            format!("{:?}", event.action_type),
            event.actor.user_id,
            event.comment.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
