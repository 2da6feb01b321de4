//! Rules checked on top of the document walk.

pub(crate) mod abstract_selections;
pub(crate) mod arguments;
pub(crate) mod no_fragment_cycles;
