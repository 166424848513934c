//! Publish workflow
//!
//! Turns an edited content record into a commit on the shared work branch and
//! makes sure exactly one open pull request carries it:
//! 1. Resolve targets - slug to path, work and base branches
//! 2. Ensure branch - create the work branch from base if missing
//! 3. Read revision - fetch the current marker from the work branch
//! 4. Write file - create or compare-and-swap update
//! 5. Resolve PR - reuse the open PR or create one

mod progress;
mod workflow;

pub use progress::{NoopProgress, Phase, ProgressCallback};
pub use workflow::{
    FileStatus, PublishOptions, PublishOutcome, PublishPreview, PublishTarget, PublishWorkflow,
};
