//! Process-wide span carrying the command and run identifier.

use once_cell::sync::OnceCell;
use tracing::{Span, span::Entered};
use uuid::Uuid;

use crate::init::build_sha;

static RUN_ID: OnceCell<Uuid> = OnceCell::new();

/// Identifier shared by every log line of this process.
#[must_use]
pub fn run_id() -> Uuid {
    *RUN_ID.get_or_init(Uuid::new_v4)
}

/// Guard that keeps the top-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the top-level span for `command`.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "uplink",
            command = %command,
            run_id = %run_id(),
            build_sha = %build_sha()
        )));
        Self {
            _guard: span.enter(),
        }
    }
}
