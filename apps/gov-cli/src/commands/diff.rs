// diff.rs — Revision diff and apply over JSON files.

use std::fs;
use std::path::Path;

use gov_diff::{Revision, RevisionDiff};

use crate::commands::domain_err;

pub fn diff(base: &Path, head: &Path) -> anyhow::Result<()> {
    let base = read_json::<Revision>(base)?;
    let head = read_json::<Revision>(head)?;
    let diff = gov_diff::diff(&base, &head).map_err(|err| domain_err!(err))?;
    println!("{}", serde_json::to_string_pretty(&diff)?);
    Ok(())
}

pub fn apply(base: &Path, diff: &Path) -> anyhow::Result<()> {
    let base = read_json::<Revision>(base)?;
    let diff = read_json::<RevisionDiff>(diff)?;
    let head = gov_diff::apply(&base, &diff).map_err(|err| domain_err!(err))?;
    println!("{}", serde_json::to_string_pretty(&head)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("invalid_argument: cannot read {}: {err}", path.display()))?;
    serde_json::from_str(&json)
        .map_err(|err| anyhow::anyhow!("invalid_argument: malformed {}: {err}", path.display()))
}
