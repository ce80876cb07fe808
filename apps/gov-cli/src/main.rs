//! # gov-cli
//!
//! Operator CLI for the governance workflow engine, over a JSON-file
//! store:
//! - `gov init` — seed an empty state file
//! - `gov change new/show` — create and inspect change requests
//! - `gov transition` — move a change through the approval workflow
//! - `gov timeline` — read a subject's audit trail
//! - `gov suggest new/decide` — propose and decide suggestions
//! - `gov scan` — escalate suggestions left undecided past a window
//! - `gov trigger-add` / `gov match` — manage and query automation rules
//! - `gov diff` / `gov apply` — structured revision diffs

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Governance workflow engine CLI.
#[derive(Parser)]
#[command(name = "gov", version, about)]
struct Cli {
    /// Path to the JSON state file.
    #[arg(long, default_value = "gov-state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed an empty state file.
    Init,
    /// Manage change requests.
    Change {
        #[command(subcommand)]
        command: commands::change::ChangeCommands,
    },
    /// Move a change request to a new status.
    Transition {
        /// Change request id.
        change_id: uuid::Uuid,
        /// Acting user as <user-id>:<role> (viewer|member|approver|owner).
        #[arg(long = "as")]
        actor: String,
        /// Target status (draft|submitted|approved|changes_requested|rejected).
        #[arg(long)]
        to: gov_workflow::ChangeStatus,
        /// Optional comment recorded on the audit event.
        #[arg(long)]
        comment: Option<String>,
    },
    /// Show a subject's audit timeline in chronological order.
    Timeline {
        /// Subject id: a change uuid, artifact id, or project id.
        subject: String,
        /// What kind of subject the id names.
        #[arg(long, default_value = "change")]
        kind: commands::timeline::SubjectKind,
        /// Maximum events to return (clamped to [10, 500]).
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Manage suggestions.
    Suggest {
        #[command(subcommand)]
        command: commands::suggest::SuggestCommands,
    },
    /// Escalate suggestions left undecided past the staleness window.
    Scan {
        project_id: String,
        /// Staleness window in days (clamped to [1, 60]).
        #[arg(long, default_value = "7")]
        days: i64,
    },
    /// List automation rules that fire for an artifact event.
    Match {
        project_id: String,
        artifact_type: String,
        event_type: String,
    },
    /// Add an automation rule from a JSON file.
    TriggerAdd {
        /// Path to a JSON trigger rule.
        #[arg(long)]
        file: PathBuf,
    },
    /// Diff two revision JSON files.
    Diff {
        base: PathBuf,
        head: PathBuf,
    },
    /// Apply a diff JSON file to a base revision.
    Apply {
        base: PathBuf,
        diff: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Init => commands::init::execute(&cli.state),
        Commands::Change { command } => commands::change::execute(command, &cli.state),
        Commands::Transition {
            change_id,
            actor,
            to,
            comment,
        } => commands::change::transition(&cli.state, *change_id, actor, *to, comment.as_deref()),
        Commands::Timeline {
            subject,
            kind,
            limit,
        } => commands::timeline::execute(&cli.state, subject, *kind, *limit),
        Commands::Suggest { command } => commands::suggest::execute(command, &cli.state),
        Commands::Scan { project_id, days } => commands::scan::execute(&cli.state, project_id, *days),
        Commands::Match {
            project_id,
            artifact_type,
            event_type,
        } => commands::triggers::match_rules(&cli.state, project_id, artifact_type, event_type),
        Commands::TriggerAdd { file } => commands::triggers::add(&cli.state, file),
        Commands::Diff { base, head } => commands::diff::diff(base, head),
        Commands::Apply { base, diff } => commands::diff::apply(base, diff),
    }
}
