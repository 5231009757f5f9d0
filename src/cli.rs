use crate::command::sync::SyncArgs;
use clap::Parser;

/// Copy the replace directives of one go.mod into another.
///
/// Existing replace directives in the target are removed, the source's are
/// added, and the target's blocks are sorted before it is rewritten.
#[derive(Parser)]
#[command(name = "go-replace-sync", version, about, long_about = None)]
pub struct SyncCli {
    #[command(flatten)]
    pub args: SyncArgs,
}
