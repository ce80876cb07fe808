// mod.rs — CLI command implementations.
//
// Every command opens the file store fresh, re-registering the proposed
// trigger-key index the way a schema migration would, and prints domain
// errors as `kind: message` so scripts can branch on the kind.

pub mod change;
pub mod diff;
pub mod init;
pub mod scan;
pub mod suggest;
pub mod timeline;
pub mod triggers;

use std::path::Path;

use gov_store::FileStore;
use gov_suggest::trigger_key_index;

/// Open the state file with the engine's unique indexes registered.
pub(crate) fn open_store(state: &Path) -> anyhow::Result<FileStore> {
    let store = FileStore::open(state)
        .map_err(|err| anyhow::anyhow!("{}: {}", err.kind(), err))?
        .with_index(trigger_key_index());
    Ok(store)
}

/// Parse `<user-id>:<role>` into an actor. The user id doubles as the
/// display name; the CLI has no user directory to resolve real names from.
pub(crate) fn parse_actor(spec: &str) -> anyhow::Result<gov_workflow::Actor> {
    let (user_id, role) = spec
        .rsplit_once(':')
        .ok_or_else(|| anyhow::anyhow!("invalid_argument: expected <user-id>:<role>, got '{spec}'"))?;
    let role = role
        .parse::<gov_workflow::Role>()
        .map_err(|err| anyhow::anyhow!("invalid_argument: {err}"))?;
    Ok(gov_workflow::Actor::new(user_id, user_id, role))
}

/// Format a domain error as `kind: message`.
macro_rules! domain_err {
    ($err:expr) => {{
        let err = $err;
        anyhow::anyhow!("{}: {}", err.kind(), err)
    }};
}
pub(crate) use domain_err;
