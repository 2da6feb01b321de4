//! Request syntax tree consumed by the validator.
//!
//! The tree is produced by a parser outside of this crate, and only carries
//! what validation looks at: selections, arguments, directives and fragments.

use std::slice;

use crate::parser::{SourcePosition, Spanning};

/// A JSON-like value passed as an argument in a request.
///
/// Lists and objects variants are _spanned_, i.e. they contain a reference to
/// their position in the source file, if available.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum InputValue {
    Null,
    Int(i32),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    Variable(String),
    List(Vec<Spanning<InputValue>>),
    Object(Vec<(Spanning<String>, Spanning<InputValue>)>),
}

/// Arguments of a field or a directive, in request order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments<'a> {
    #[doc(hidden)]
    pub items: Vec<(Spanning<&'a str>, Spanning<InputValue>)>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Field<'a> {
    pub alias: Option<Spanning<&'a str>>,
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a>>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Option<Vec<Selection<'a>>>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct FragmentSpread<'a> {
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct InlineFragment<'a> {
    pub type_condition: Option<Spanning<&'a str>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

/// Entry in a selection set
///
/// This enum represents one of the three variants of a selection: a field, a
/// fragment spread, or an inline fragment. Each of the variants references
/// their location in the query source.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Selection<'a> {
    Field(Spanning<Field<'a>>),
    FragmentSpread(Spanning<FragmentSpread<'a>>),
    InlineFragment(Spanning<InlineFragment<'a>>),
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Directive<'a> {
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a>>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Operation<'a> {
    pub operation_type: OperationType,
    pub name: Option<Spanning<&'a str>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Fragment<'a> {
    pub name: Spanning<&'a str>,
    pub type_condition: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

/// Top-level definition of a request document.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Definition<'a> {
    Operation(Spanning<Operation<'a>>),
    Fragment(Spanning<Fragment<'a>>),
}

/// Request document.
pub type Document<'a> = [Definition<'a>];
/// Owned request document.
pub type OwnedDocument<'a> = Vec<Definition<'a>>;

impl<'a> Arguments<'a> {
    /// Adds an argument, without source positions.
    #[must_use]
    pub fn with(mut self, name: &'a str, value: InputValue) -> Self {
        self.items
            .push((Spanning::unlocated(name), Spanning::unlocated(value)));
        self
    }

    #[doc(hidden)]
    pub fn iter(&self) -> slice::Iter<'_, (Spanning<&'a str>, Spanning<InputValue>)> {
        self.items.iter()
    }

    #[doc(hidden)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[doc(hidden)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[doc(hidden)]
    pub fn get(&self, key: &str) -> Option<&Spanning<InputValue>> {
        self.items
            .iter()
            .filter(|&(k, _)| k.item == key)
            .map(|(_, v)| v)
            .next()
    }
}

impl<'a> Field<'a> {
    /// Creates a field selection without arguments or subselections, located
    /// at `position`.
    pub fn new(name: &'a str, position: SourcePosition) -> Self {
        Self {
            alias: None,
            name: Spanning::zero_width(&position, name),
            arguments: None,
            directives: None,
            selection_set: None,
        }
    }

    /// Sets the alias of this field.
    #[must_use]
    pub fn alias(mut self, alias: &'a str) -> Self {
        self.alias = Some(Spanning::new(self.name.span, alias));
        self
    }

    /// Sets the arguments of this field, located where the field is.
    #[must_use]
    pub fn arguments(mut self, arguments: Arguments<'a>) -> Self {
        self.arguments = Some(Spanning::new(self.name.span, arguments));
        self
    }

    /// Adds a directive to this field.
    #[must_use]
    pub fn directive(mut self, directive: Directive<'a>) -> Self {
        self.directives
            .get_or_insert_with(Vec::new)
            .push(Spanning::new(self.name.span, directive));
        self
    }

    /// Sets the subselections of this field.
    #[must_use]
    pub fn selection_set(mut self, selections: Vec<Selection<'a>>) -> Self {
        self.selection_set = Some(selections);
        self
    }

    /// Name the value of this field is returned under.
    pub fn alias_or_name(&self) -> &Spanning<&'a str> {
        self.alias.as_ref().unwrap_or(&self.name)
    }

    /// Wraps this field into a [`Selection`].
    pub fn into_selection(self) -> Selection<'a> {
        Selection::Field(Spanning::new(self.name.span, self))
    }
}

impl<'a> Directive<'a> {
    /// Creates a directive without source positions.
    pub fn new(name: &'a str, arguments: Option<Arguments<'a>>) -> Self {
        Self {
            name: Spanning::unlocated(name),
            arguments: arguments.map(Spanning::unlocated),
        }
    }
}

impl<'a> Selection<'a> {
    /// Creates a fragment spread of the named fragment, located at `position`.
    pub fn spread(name: &'a str, position: SourcePosition) -> Self {
        Self::FragmentSpread(Spanning::zero_width(
            &position,
            FragmentSpread {
                name: Spanning::zero_width(&position, name),
                directives: None,
            },
        ))
    }

    /// Creates an inline fragment, located at `position`.
    pub fn inline(
        type_condition: Option<&'a str>,
        selection_set: Vec<Selection<'a>>,
        position: SourcePosition,
    ) -> Self {
        Self::InlineFragment(Spanning::zero_width(
            &position,
            InlineFragment {
                type_condition: type_condition.map(|t| Spanning::zero_width(&position, t)),
                directives: None,
                selection_set,
            },
        ))
    }

    /// Start position of this selection.
    pub fn start(&self) -> SourcePosition {
        match self {
            Self::Field(f) => f.start(),
            Self::FragmentSpread(s) => s.start(),
            Self::InlineFragment(i) => i.start(),
        }
    }
}

impl<'a> Definition<'a> {
    /// Creates a query operation over the given selections.
    pub fn query(selection_set: Vec<Selection<'a>>) -> Self {
        Self::operation(OperationType::Query, selection_set)
    }

    /// Creates an anonymous operation of the given type.
    pub fn operation(operation_type: OperationType, selection_set: Vec<Selection<'a>>) -> Self {
        Self::Operation(Spanning::unlocated(Operation {
            operation_type,
            name: None,
            directives: None,
            selection_set,
        }))
    }

    /// Creates a fragment definition.
    pub fn fragment(
        name: &'a str,
        type_condition: &'a str,
        selection_set: Vec<Selection<'a>>,
    ) -> Self {
        Self::Fragment(Spanning::unlocated(Fragment {
            name: Spanning::unlocated(name),
            type_condition: Spanning::unlocated(type_condition),
            directives: None,
            selection_set,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{Arguments, Field, InputValue, Selection};
    use crate::parser::SourcePosition;

    #[test]
    fn arguments_lookup_by_name() {
        let args = Arguments::default()
            .with("rank", InputValue::Int(1))
            .with("title", InputValue::String("Up".into()));

        assert_eq!(args.len(), 2);
        assert_eq!(args.get("rank").map(|v| &v.item), Some(&InputValue::Int(1)));
        assert!(args.get("missing").is_none());
    }

    #[test]
    fn aliased_field_is_returned_under_alias() {
        let at = SourcePosition::new(4, 1, 2);
        let field = Field::new("film", at).alias("movie");

        assert_eq!(field.alias_or_name().item, "movie");
        assert_eq!(field.into_selection().start(), at);
        assert_eq!(Selection::spread("Frag", at).start(), at);
    }
}
