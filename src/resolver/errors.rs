//! Resolution error types.

use thiserror::Error;

/// Error in the module topology of a loaded package set.
///
/// Environment failures (copying, writing, fetching, reloading) are not
/// represented here; they surface as the underlying I/O or process error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("does not support multiple modules: {}", modules.join(", "))]
    MultipleModules { modules: Vec<String> },

    #[error(
        "no module owns the loaded packages; they might not be managed by modules \
         or they are standard library packages"
    )]
    NoModule,
}
