use fnv::{FnvHashMap, FnvHashSet};

use crate::{
    ast::{Definition, Document, Selection},
    parser::Spanning,
    validation::{RuleError, ValidatorContext},
};

struct CycleDetector<'a> {
    visited: FnvHashSet<&'a str>,
    spreads: &'a FnvHashMap<&'a str, Vec<Spanning<&'a str>>>,
    path_indices: FnvHashMap<&'a str, usize>,
    errors: Vec<RuleError>,
}

pub(crate) fn validate<'a>(ctx: &mut ValidatorContext<'a>, document: &'a Document<'a>) {
    let mut fragment_order = Vec::new();
    let mut spreads = FnvHashMap::default();
    for def in document {
        if let Definition::Fragment(fragment) = def {
            let name = fragment.item.name.item;
            fragment_order.push(name);
            let mut found = Vec::new();
            collect_spreads(&fragment.item.selection_set, &mut found);
            spreads.insert(name, found);
        }
    }

    let mut detector = CycleDetector {
        visited: FnvHashSet::default(),
        spreads: &spreads,
        path_indices: FnvHashMap::default(),
        errors: Vec::new(),
    };

    for frag in &fragment_order {
        if !detector.visited.contains(frag) {
            let mut path = Vec::new();
            detector.detect_from(frag, &mut path);
        }
    }

    ctx.append_errors(detector.errors);
}

fn collect_spreads<'a>(selections: &'a [Selection<'a>], found: &mut Vec<Spanning<&'a str>>) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                if let Some(selection_set) = &field.item.selection_set {
                    collect_spreads(selection_set, found);
                }
            }
            Selection::FragmentSpread(spread) => {
                found.push(Spanning::new(spread.span, spread.item.name.item));
            }
            Selection::InlineFragment(inline) => {
                collect_spreads(&inline.item.selection_set, found);
            }
        }
    }
}

impl<'a> CycleDetector<'a> {
    fn detect_from(&mut self, from: &'a str, path: &mut Vec<&'a Spanning<&'a str>>) {
        self.visited.insert(from);

        let Some(nodes) = self.spreads.get(from) else {
            return;
        };

        self.path_indices.insert(from, path.len());

        for node in nodes {
            let name = node.item;

            if let Some(index) = self.path_indices.get(name).copied() {
                let err_pos = path.get(index).copied().unwrap_or(node);

                self.errors
                    .push(RuleError::new(&error_message(name), &[err_pos.start()]));
            } else if !self.visited.contains(name) {
                path.push(node);
                self.detect_from(name, path);
                path.pop();
            }
        }

        self.path_indices.remove(from);
    }
}

fn error_message(frag_name: &str) -> String {
    format!(r#"Cannot spread fragment "{frag_name}""#)
}
