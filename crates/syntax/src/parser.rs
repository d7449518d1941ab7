use crate::ast::{
    Argument, FieldSelection, FragmentDefinition, FragmentSpread, InlineFragment, ObjectField,
    OperationNode, QueryDocument, Selection, Value, VariableDefinition,
};
use crate::{LineIndex, ParseError, QuerySource, Result};
use apollo_parser::cst::{self, CstNode};
use query_analyzer_types::{OperationKind, Origin};
use std::collections::HashSet;
use std::sync::Arc;

/// Parse one query document.
///
/// Fails on the first syntax error, on a fragment defined twice, on a spread
/// of a fragment the document does not define, and on a document with no
/// operations or fragments. Type system definitions are ignored.
#[tracing::instrument(skip(source), fields(file = %source.file, line = source.start_line))]
pub fn parse(source: &QuerySource) -> Result<QueryDocument> {
    let tree = apollo_parser::Parser::new(&source.text).parse();
    let index = LineIndex::new(&source.text);

    if let Some(error) = tree.errors().next() {
        let origin = source.origin_at(&index, error.index());
        tracing::debug!(message = error.message(), %origin, "Syntax error");
        return Err(ParseError::Syntax {
            message: error.message().to_string(),
            line: origin.line,
            column: origin.column,
        });
    }

    let mut lowering = Lowering {
        source,
        index,
        spreads: Vec::new(),
    };

    let mut operations = Vec::new();
    let mut fragments: Vec<FragmentDefinition> = Vec::new();
    let mut fragment_names = HashSet::new();

    for definition in tree.document().definitions() {
        match definition {
            cst::Definition::OperationDefinition(op) => {
                operations.push(lowering.operation(&op));
            }
            cst::Definition::FragmentDefinition(frag) => {
                let Some(fragment) = lowering.fragment(&frag) else {
                    continue;
                };
                if !fragment_names.insert(Arc::clone(&fragment.name)) {
                    return Err(ParseError::DuplicateFragment {
                        name: fragment.name.to_string(),
                        line: fragment.origin.line,
                        column: fragment.origin.column,
                    });
                }
                fragments.push(fragment);
            }
            _ => {
                tracing::trace!("Skipping non-executable definition");
            }
        }
    }

    if operations.is_empty() && fragments.is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    if let Some((name, origin)) = lowering
        .spreads
        .iter()
        .find(|(name, _)| !fragment_names.contains(name))
    {
        return Err(ParseError::UndefinedFragment {
            name: name.to_string(),
            line: origin.line,
            column: origin.column,
        });
    }

    tracing::debug!(
        operations = operations.len(),
        fragments = fragments.len(),
        "Parsed query document"
    );
    Ok(QueryDocument::new(operations, fragments))
}

/// CST → document model, tracking spreads for the undefined-fragment check.
struct Lowering<'a> {
    source: &'a QuerySource,
    index: LineIndex<'a>,
    spreads: Vec<(Arc<str>, Origin)>,
}

impl Lowering<'_> {
    fn origin<N: CstNode>(&self, node: &N) -> Origin {
        let offset: usize = node.syntax().text_range().start().into();
        self.source.origin_at(&self.index, offset)
    }

    fn operation(&mut self, op: &cst::OperationDefinition) -> OperationNode {
        let kind = match op.operation_type() {
            Some(ty) if ty.mutation_token().is_some() => OperationKind::Mutation,
            Some(ty) if ty.subscription_token().is_some() => OperationKind::Subscription,
            _ => OperationKind::Query,
        };

        let variables = op
            .variable_definitions()
            .into_iter()
            .flat_map(|vars| vars.variable_definitions())
            .filter_map(|var| self.variable(&var))
            .collect();

        OperationNode {
            name: op.name().map(|n| Arc::from(n.text().as_str())),
            kind,
            variables,
            selections: self.selection_set(op.selection_set()),
            origin: self.origin(op),
        }
    }

    fn variable(&self, var: &cst::VariableDefinition) -> Option<VariableDefinition> {
        let name = Arc::from(var.variable()?.name()?.text().as_str());
        let type_name = named_type(&var.ty()?)?;
        let default_value = var
            .default_value()
            .and_then(|default| default.value())
            .map(|value| self.value(&value));

        Some(VariableDefinition {
            name,
            type_name,
            default_value,
            origin: self.origin(var),
        })
    }

    fn fragment(&mut self, frag: &cst::FragmentDefinition) -> Option<FragmentDefinition> {
        let name = Arc::from(frag.fragment_name()?.name()?.text().as_str());
        let type_condition =
            Arc::from(frag.type_condition()?.named_type()?.name()?.text().as_str());

        Some(FragmentDefinition {
            name,
            type_condition,
            selections: self.selection_set(frag.selection_set()),
            origin: self.origin(frag),
        })
    }

    fn selection_set(&mut self, set: Option<cst::SelectionSet>) -> Vec<Selection> {
        set.into_iter()
            .flat_map(|set| set.selections())
            .filter_map(|selection| self.selection(&selection))
            .collect()
    }

    fn selection(&mut self, selection: &cst::Selection) -> Option<Selection> {
        match selection {
            cst::Selection::Field(field) => {
                let name_node = field.name()?;
                let origin = self.origin(&name_node);
                let arguments = field
                    .arguments()
                    .into_iter()
                    .flat_map(|args| args.arguments())
                    .filter_map(|arg| {
                        Some(Argument {
                            name: Arc::from(arg.name()?.text().as_str()),
                            value: self.value(&arg.value()?),
                            origin: self.origin(&arg),
                        })
                    })
                    .collect();

                Some(Selection::Field(FieldSelection {
                    name: Arc::from(name_node.text().as_str()),
                    alias: field
                        .alias()
                        .and_then(|alias| alias.name())
                        .map(|n| Arc::from(n.text().as_str())),
                    arguments,
                    selections: self.selection_set(field.selection_set()),
                    origin,
                }))
            }
            cst::Selection::FragmentSpread(spread) => {
                let name: Arc<str> = Arc::from(spread.fragment_name()?.name()?.text().as_str());
                let origin = self.origin(spread);
                self.spreads.push((Arc::clone(&name), origin.clone()));
                Some(Selection::FragmentSpread(FragmentSpread { name, origin }))
            }
            cst::Selection::InlineFragment(inline) => {
                let type_condition = inline
                    .type_condition()
                    .and_then(|cond| cond.named_type())
                    .and_then(|named| named.name())
                    .map(|n| Arc::from(n.text().as_str()));

                Some(Selection::InlineFragment(InlineFragment {
                    type_condition,
                    selections: self.selection_set(inline.selection_set()),
                    origin: self.origin(inline),
                }))
            }
        }
    }

    fn value(&self, value: &cst::Value) -> Value {
        match value {
            cst::Value::Variable(var) => Value::Variable(
                var.name()
                    .map_or_else(|| Arc::from(""), |n| Arc::from(n.text().as_str())),
            ),
            cst::Value::StringValue(s) => {
                Value::String(s.syntax().text().to_string().trim_matches('"').to_string())
            }
            cst::Value::IntValue(i) => Value::Int(i.syntax().text().to_string()),
            cst::Value::FloatValue(f) => Value::Float(f.syntax().text().to_string()),
            cst::Value::BooleanValue(b) => Value::Boolean(b.syntax().text() == "true"),
            cst::Value::NullValue(_) => Value::Null,
            cst::Value::EnumValue(e) => Value::Enum {
                value: e
                    .name()
                    .map_or_else(|| Arc::from(""), |n| Arc::from(n.text().as_str())),
                origin: self.origin(e),
            },
            cst::Value::ListValue(list) => {
                Value::List(list.values().map(|item| self.value(&item)).collect())
            }
            cst::Value::ObjectValue(obj) => Value::Object(
                obj.object_fields()
                    .filter_map(|field| {
                        Some(ObjectField {
                            name: Arc::from(field.name()?.text().as_str()),
                            value: self.value(&field.value()?),
                        })
                    })
                    .collect(),
            ),
        }
    }
}

/// The named type inside any list/non-null wrappers.
fn named_type(ty: &cst::Type) -> Option<Arc<str>> {
    match ty {
        cst::Type::NamedType(named) => Some(Arc::from(named.name()?.text().as_str())),
        cst::Type::ListType(list) => named_type(&list.ty()?),
        cst::Type::NonNullType(non_null) => {
            if let Some(named) = non_null.named_type() {
                Some(Arc::from(named.name()?.text().as_str()))
            } else {
                named_type(&non_null.list_type()?.ty()?)
            }
        }
    }
}
