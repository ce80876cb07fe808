// init.rs — Seed an empty state file.

use std::path::Path;

use crate::commands::{domain_err, open_store};

pub fn execute(state: &Path) -> anyhow::Result<()> {
    if state.exists() {
        anyhow::bail!(
            "invalid_argument: state file {} already exists",
            state.display()
        );
    }
    let store = open_store(state)?;
    store.flush().map_err(|err| domain_err!(err))?;
    println!("Initialized empty state at {}", state.display());
    Ok(())
}
