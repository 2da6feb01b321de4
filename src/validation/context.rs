use std::fmt;

use fnv::FnvHashMap;
use itertools::Itertools as _;

use crate::{
    ast::{Definition, Document, Fragment},
    parser::{SourcePosition, Spanning},
    schema::model::SchemaModel,
};

/// Query validation error
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RuleError {
    locations: Vec<SourcePosition>,
    message: String,
}

#[doc(hidden)]
pub struct ValidatorContext<'a> {
    pub schema: &'a SchemaModel,
    errors: Vec<RuleError>,
    fragments: FnvHashMap<&'a str, &'a Spanning<Fragment<'a>>>,
}

impl RuleError {
    #[doc(hidden)]
    pub fn new(message: &str, locations: &[SourcePosition]) -> Self {
        Self {
            message: message.into(),
            locations: locations.to_vec(),
        }
    }

    /// Access the message for a validation error
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Access the positions of the validation error
    ///
    /// All validation errors contain at least one source position, but some
    /// validators supply extra context through multiple positions.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. At {}",
            self.message,
            self.locations.iter().format(", "),
        )
    }
}

impl std::error::Error for RuleError {}

impl<'a> ValidatorContext<'a> {
    #[doc(hidden)]
    pub fn new(schema: &'a SchemaModel, document: &'a Document<'a>) -> Self {
        Self {
            schema,
            errors: Vec::new(),
            fragments: document
                .iter()
                .filter_map(|def| match def {
                    Definition::Fragment(frag) => Some((frag.item.name.item, frag)),
                    Definition::Operation(_) => None,
                })
                .collect(),
        }
    }

    #[doc(hidden)]
    pub fn append_errors(&mut self, mut errors: Vec<RuleError>) {
        self.errors.append(&mut errors);
    }

    #[doc(hidden)]
    pub fn report_error(&mut self, message: &str, locations: &[SourcePosition]) {
        self.errors.push(RuleError::new(message, locations))
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[doc(hidden)]
    pub fn into_errors(mut self) -> Vec<RuleError> {
        self.errors.sort();
        self.errors
    }

    /// Fragment definition of the request, by name.
    pub(crate) fn fragment(&self, name: &str) -> Option<&'a Spanning<Fragment<'a>>> {
        self.fragments.get(name).copied()
    }
}
