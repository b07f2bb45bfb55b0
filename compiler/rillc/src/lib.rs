//! Rillc - Rill projects
//!
//! Ties the other crates together for a host:
//! - [`Project`]: named sources sharing one interner, each analyzed once
//!   per edit and evaluated with the sources it borrows
//! - [`Reactor`]: stream changes in, reevaluations out
//! - JSON persistence of what a person wrote, nothing more
//!
//! ```text
//! text ──SourceParser──► Ast ──Analyzer──► Analysis (conflicts, graphs)
//!                         │
//!                         └──Evaluator──► Value ◄── streams, borrows
//! ```

mod errors;
mod parser;
mod project;
mod reactor;
mod source;
pub mod testing;

pub use errors::{ProjectError, ReactorError};
pub use parser::{ParseError, SourceParser};
pub use project::{AnalysisStatus, Project, SerializedProject, SerializedSource};
pub use reactor::{Reactor, Reevaluation};
pub use source::Source;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
