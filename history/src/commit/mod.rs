mod change_applier;
mod commit;
mod commit_id;
mod transaction;
mod world_context;

pub use change_applier::ChangeApplier;
pub use commit::{Commit, CommitBuilder};
pub use commit_id::{CommitId, CommitIdGenerator};
pub use transaction::{apply_commit, can_apply, create_commit};
pub use world_context::WorldContext;
