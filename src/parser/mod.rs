//! Source positions of request syntax trees.
//!
//! Requests are parsed by a separate collaborator; this module only carries
//! the location types its syntax trees are annotated with.

mod utils;

pub use self::utils::{SourcePosition, Span, Spanning};
