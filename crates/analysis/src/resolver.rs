use crate::{Finding, FindingKind, ResolveError};
use query_analyzer_schema::{SchemaModel, TypeDef, TypeDefKind};
use query_analyzer_syntax::{
    FieldSelection, FragmentDefinition, OperationNode, QueryDocument, Selection, Value,
};
use query_analyzer_types::Origin;
use std::collections::HashSet;

const TYPENAME: &str = "__typename";

/// Walk every selection of `document` against `schema`.
///
/// Findings come out in document order: operations first, then fragments
/// that no selection spreads. Valid references are included so callers can
/// tell "resolved fine" apart from "never reached". A fragment cycle fails
/// the whole document before any selection is walked.
#[tracing::instrument(skip_all, fields(operations = document.operations.len()))]
pub fn resolve(document: &QueryDocument, schema: &SchemaModel) -> Result<Vec<Finding>, ResolveError> {
    check_fragment_cycles(document)?;

    let mut resolver = Resolver {
        document,
        schema,
        findings: Vec::new(),
    };

    for operation in &document.operations {
        resolver.operation(operation);
    }

    let spread = spread_names(document);
    for fragment in document.fragments() {
        if !spread.contains(&*fragment.name) {
            resolver.unspread_fragment(fragment);
        }
    }

    tracing::debug!(findings = resolver.findings.len(), "Resolved document");
    Ok(resolver.findings)
}

struct Resolver<'a> {
    document: &'a QueryDocument,
    schema: &'a SchemaModel,
    findings: Vec<Finding>,
}

impl<'a> Resolver<'a> {
    fn operation(&mut self, operation: &OperationNode) {
        let Some(root) = self.schema.root_type(operation.kind) else {
            let kind = operation.kind.as_str();
            self.findings.push(Finding::breaking(
                FindingKind::RootOperation,
                operation.origin.clone(),
                kind,
                format!("schema does not support {kind} operations"),
            ));
            return;
        };

        for variable in &operation.variables {
            if self.schema.get(&variable.type_name).is_none() {
                self.findings.push(Finding::breaking(
                    FindingKind::Variable,
                    variable.origin.clone(),
                    &*variable.type_name,
                    format!("type {} does not exist", variable.type_name),
                ));
                continue;
            }
            if let Some(default) = &variable.default_value {
                self.value(default, &variable.type_name);
            }
        }

        self.selections(&operation.selections, root);
    }

    fn unspread_fragment(&mut self, fragment: &FragmentDefinition) {
        if let Some(condition) = self.condition_type(&fragment.type_condition, &fragment.origin) {
            tracing::trace!(fragment = %fragment.name, "Walking unspread fragment");
            self.selections(&fragment.selections, condition);
        }
    }

    fn selections(&mut self, selections: &[Selection], parent: &'a TypeDef) {
        for selection in selections {
            match selection {
                Selection::Field(field) => self.field(field, parent),
                Selection::FragmentSpread(spread) => {
                    let Some(fragment) = self.document.fragment(&spread.name) else {
                        continue;
                    };
                    self.fragment(
                        &fragment.type_condition,
                        &fragment.selections,
                        parent,
                        &spread.origin,
                    );
                }
                Selection::InlineFragment(inline) => match &inline.type_condition {
                    Some(condition) => {
                        self.fragment(condition, &inline.selections, parent, &inline.origin);
                    }
                    None => self.selections(&inline.selections, parent),
                },
            }
        }
    }

    fn field(&mut self, field: &FieldSelection, parent: &'a TypeDef) {
        if &*field.name == TYPENAME {
            return;
        }

        let target = format!("{}.{}", parent.name, field.name);
        let Some(definition) = parent.field(&field.name) else {
            self.findings
                .push(Finding::missing(FindingKind::Field, field.origin.clone(), target));
            return;
        };

        self.findings.push(Finding::existing(
            FindingKind::Field,
            field.origin.clone(),
            target.clone(),
            definition.deprecation.as_ref(),
        ));

        for argument in &field.arguments {
            let arg_target = format!("{target}({})", argument.name);
            match definition.argument(&argument.name) {
                Some(arg_def) => {
                    self.findings.push(Finding::existing(
                        FindingKind::Argument,
                        argument.origin.clone(),
                        arg_target,
                        arg_def.deprecation.as_ref(),
                    ));
                    self.value(&argument.value, arg_def.type_ref.named_type());
                }
                None => self.findings.push(Finding::missing(
                    FindingKind::Argument,
                    argument.origin.clone(),
                    arg_target,
                )),
            }
        }

        for required in definition.required_arguments() {
            if field.arguments.iter().all(|a| *a.name != *required.name) {
                self.findings.push(Finding::breaking(
                    FindingKind::Argument,
                    field.origin.clone(),
                    format!("{target}({})", required.name),
                    format!("required argument {} not provided", required.name),
                ));
            }
        }

        let Some(return_type) = self.schema.get(definition.type_ref.named_type()) else {
            return;
        };
        if field.selections.is_empty() {
            if return_type.kind.is_composite() {
                self.findings.push(Finding::breaking(
                    FindingKind::Selection,
                    field.origin.clone(),
                    target,
                    format!(
                        "{} type {} must have a selection of subfields",
                        return_type.kind.as_str(),
                        return_type.name
                    ),
                ));
            }
        } else if return_type.kind.is_composite() {
            self.selections(&field.selections, return_type);
        } else {
            self.findings.push(Finding::breaking(
                FindingKind::Selection,
                field.origin.clone(),
                target,
                format!(
                    "cannot select fields on {} type {}",
                    return_type.kind.as_str(),
                    return_type.name
                ),
            ));
        }
    }

    /// Resolve a fragment body at `parent`.
    ///
    /// On an object parent the body only applies when the object satisfies
    /// the condition. On an abstract parent it applies when the possible
    /// types overlap, and the narrower of the two types is walked.
    fn fragment(
        &mut self,
        condition: &str,
        selections: &[Selection],
        parent: &'a TypeDef,
        origin: &Origin,
    ) {
        let Some(condition_type) = self.condition_type(condition, origin) else {
            return;
        };

        let schema = self.schema;
        if schema.satisfies(&parent.name, condition) {
            self.selections(selections, parent);
            return;
        }

        let applies = match parent.kind {
            TypeDefKind::Object => false,
            _ => schema.overlaps(&parent.name, condition),
        };
        if applies {
            self.selections(selections, condition_type);
        } else {
            tracing::trace!(parent = %parent.name, condition, "Skipping fragment");
        }
    }

    /// Look up a type condition, reporting it when it cannot be used.
    fn condition_type(&mut self, condition: &str, origin: &Origin) -> Option<&'a TypeDef> {
        let schema = self.schema;
        let Some(ty) = schema.get(condition) else {
            self.findings.push(Finding::breaking(
                FindingKind::TypeCondition,
                origin.clone(),
                condition,
                format!("type {condition} does not exist"),
            ));
            return None;
        };
        if !ty.kind.is_composite() {
            self.findings.push(Finding::breaking(
                FindingKind::TypeCondition,
                origin.clone(),
                condition,
                format!("fragment cannot condition on {} type {condition}", ty.kind.as_str()),
            ));
            return None;
        }
        Some(ty)
    }

    /// Check enum literals in an input value of named type `type_name`.
    fn value(&mut self, value: &Value, type_name: &str) {
        let schema = self.schema;
        match value {
            Value::Enum { value, origin } => {
                let Some(ty) = schema.get(type_name) else {
                    return;
                };
                if ty.kind != TypeDefKind::Enum {
                    return;
                }
                let target = format!("{type_name}.{value}");
                match ty.enum_value(value) {
                    Some(def) => self.findings.push(Finding::existing(
                        FindingKind::EnumValue,
                        origin.clone(),
                        target,
                        def.deprecation.as_ref(),
                    )),
                    None => self.findings.push(Finding::missing(
                        FindingKind::EnumValue,
                        origin.clone(),
                        target,
                    )),
                }
            }
            Value::List(items) => {
                for item in items {
                    self.value(item, type_name);
                }
            }
            Value::Object(fields) => {
                let Some(ty) = schema.get(type_name) else {
                    return;
                };
                for field in fields {
                    if let Some(def) = ty.input_field(&field.name) {
                        self.value(&field.value, def.type_ref.named_type());
                    }
                }
            }
            _ => {}
        }
    }
}

/// Names of every fragment spread anywhere in the document.
fn spread_names(document: &QueryDocument) -> HashSet<&str> {
    fn collect<'d>(selections: &'d [Selection], names: &mut HashSet<&'d str>) {
        for selection in selections {
            match selection {
                Selection::Field(field) => collect(&field.selections, names),
                Selection::FragmentSpread(spread) => {
                    names.insert(&spread.name);
                }
                Selection::InlineFragment(inline) => collect(&inline.selections, names),
            }
        }
    }

    let mut names = HashSet::new();
    for operation in &document.operations {
        collect(&operation.selections, &mut names);
    }
    for fragment in document.fragments() {
        collect(&fragment.selections, &mut names);
    }
    names
}

/// Depth-first search over fragment spreads, carrying the fragment names on
/// the current path. Fragments are visited in document order so the
/// reported cycle is stable.
fn check_fragment_cycles(document: &QueryDocument) -> Result<(), ResolveError> {
    fn visit<'d>(
        document: &'d QueryDocument,
        selections: &'d [Selection],
        path: &mut Vec<&'d str>,
        done: &mut HashSet<&'d str>,
    ) -> Result<(), ResolveError> {
        for selection in selections {
            match selection {
                Selection::Field(field) => visit(document, &field.selections, path, done)?,
                Selection::InlineFragment(inline) => {
                    visit(document, &inline.selections, path, done)?;
                }
                Selection::FragmentSpread(spread) => {
                    let name: &str = &spread.name;
                    if let Some(start) = path.iter().position(|on_path| *on_path == name) {
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(ToString::to_string).collect();
                        cycle.push(name.to_string());
                        return Err(ResolveError::FragmentCycle {
                            path: cycle,
                            origin: spread.origin.clone(),
                        });
                    }
                    if done.contains(name) {
                        continue;
                    }
                    let Some(fragment) = document.fragment(name) else {
                        continue;
                    };
                    path.push(&fragment.name);
                    visit(document, &fragment.selections, path, done)?;
                    path.pop();
                    done.insert(&fragment.name);
                }
            }
        }
        Ok(())
    }

    let mut done = HashSet::new();
    for fragment in document.fragments() {
        if done.contains(&*fragment.name) {
            continue;
        }
        let mut path = vec![&*fragment.name];
        visit(document, &fragment.selections, &mut path, &mut done)?;
        done.insert(&fragment.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_analyzer_syntax::{parse, QuerySource};
    use query_analyzer_test_utils::sdl_to_introspection;
    use query_analyzer_types::Severity;

    const SDL: &str = r#"
type Query {
  order(id: ID!): Order
  orders(first: Int, sortKey: SortKey, filter: OrderFilter): [Order!]!
  node(id: ID!): Node
  search(query: String!): [SearchResult!]!
  status: Status
}

interface Node { id: ID! }

type Order implements Node {
  id: ID!
  name: String!
  legacyTotal: Float @deprecated(reason: "Use totalSet")
  status: Status
  tags(limit: Int, legacy: Boolean @deprecated(reason: "Ignored")): [String!]!
}

type Customer implements Node {
  id: ID!
  email: String
}

union SearchResult = Order | Customer

enum SortKey { CREATED_AT NAME @deprecated(reason: "Use CREATED_AT") }
enum Status { OPEN CLOSED }

input OrderFilter {
  status: Status
  statuses: [Status!]
  nested: OrderFilter
}
"#;

    fn schema() -> SchemaModel {
        SchemaModel::from_json_str(&sdl_to_introspection(SDL).to_string()).unwrap()
    }

    fn run(query: &str) -> Result<Vec<Finding>, ResolveError> {
        let document = parse(&QuerySource::new(query, "test.graphql")).unwrap();
        resolve(&document, &schema())
    }

    fn reportable(findings: &[Finding]) -> Vec<(String, Severity)> {
        findings
            .iter()
            .filter(|f| f.severity.is_reportable())
            .map(|f| (f.target.clone(), f.severity))
            .collect()
    }

    #[test]
    fn test_valid_fields() {
        let findings = run("{ order(id: 1) { id name status } }").unwrap();
        let targets: Vec<_> = findings.iter().map(|f| f.target.as_str()).collect();
        assert_eq!(
            targets,
            vec!["Query.order", "Query.order(id)", "Order.id", "Order.name", "Order.status"]
        );
        assert!(findings.iter().all(|f| f.severity == Severity::Valid));
    }

    #[test]
    fn test_missing_and_deprecated_fields() {
        let findings = run("{ order(id: 1) { legacyTotal shopAddress } }").unwrap();
        assert_eq!(
            reportable(&findings),
            vec![
                ("Order.legacyTotal".to_string(), Severity::Deprecated),
                ("Order.shopAddress".to_string(), Severity::Breaking),
            ]
        );
        let missing = findings.iter().find(|f| f.target == "Order.shopAddress").unwrap();
        assert_eq!(missing.reason, "Order.shopAddress does not exist");
        assert_eq!(missing.kind, FindingKind::Field);
    }

    #[test]
    fn test_missing_field_is_not_descended() {
        let findings = run("{ gone { id name } }").unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].target, "Query.gone");
    }

    #[test]
    fn test_typename_produces_nothing() {
        let findings = run("{ __typename order(id: 1) { __typename } }").unwrap();
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| !f.target.contains("__typename")));
    }

    #[test]
    fn test_arguments() {
        let findings = run("{ order(id: 1) { tags(limit: 2, legacy: true, bogus: 1) } }").unwrap();
        assert_eq!(
            reportable(&findings),
            vec![
                ("Order.tags(legacy)".to_string(), Severity::Deprecated),
                ("Order.tags(bogus)".to_string(), Severity::Breaking),
            ]
        );
        let legacy = findings.iter().find(|f| f.target == "Order.tags(legacy)").unwrap();
        assert_eq!(legacy.reason, "Ignored");
        assert_eq!(legacy.kind, FindingKind::Argument);
    }

    #[test]
    fn test_enum_literals() {
        let findings = run("{ a: orders(sortKey: NAME) { id } b: orders(sortKey: TOTAL) { id } }")
            .unwrap();
        assert_eq!(
            reportable(&findings),
            vec![
                ("SortKey.NAME".to_string(), Severity::Deprecated),
                ("SortKey.TOTAL".to_string(), Severity::Breaking),
            ]
        );
    }

    #[test]
    fn test_enum_literals_in_input_objects_and_lists() {
        let findings = run(
            "{ orders(filter: {status: OPEN, statuses: [CLOSED, VOID], nested: {status: PENDING}}) { id } }",
        )
        .unwrap();
        let enums: Vec<_> = findings
            .iter()
            .filter(|f| f.kind == FindingKind::EnumValue)
            .map(|f| (f.target.as_str(), f.severity))
            .collect();
        assert_eq!(
            enums,
            vec![
                ("Status.OPEN", Severity::Valid),
                ("Status.CLOSED", Severity::Valid),
                ("Status.VOID", Severity::Breaking),
                ("Status.PENDING", Severity::Breaking),
            ]
        );
    }

    #[test]
    fn test_variable_default_enum() {
        let findings = run("query($sort: SortKey = NAME) { orders(sortKey: $sort) { id } }").unwrap();
        assert_eq!(
            reportable(&findings),
            vec![("SortKey.NAME".to_string(), Severity::Deprecated)]
        );
    }

    #[test]
    fn test_selection_on_leaf() {
        let findings = run("{ status { value } }").unwrap();
        let selection = findings.iter().find(|f| f.kind == FindingKind::Selection).unwrap();
        assert_eq!(selection.severity, Severity::Breaking);
        assert_eq!(selection.reason, "cannot select fields on enum type Status");

        let findings = run("{ order(id: 1) { tags { x } } }").unwrap();
        let selection = findings.iter().find(|f| f.kind == FindingKind::Selection).unwrap();
        assert_eq!(selection.reason, "cannot select fields on scalar type String");
    }

    #[test]
    fn test_composite_without_selection() {
        let findings = run("{ order(id: 1) node(id: 1) search(query: \"x\") status }").unwrap();
        let selections: Vec<_> = findings
            .iter()
            .filter(|f| f.kind == FindingKind::Selection)
            .map(|f| (f.target.as_str(), f.reason.as_str()))
            .collect();
        assert_eq!(
            selections,
            vec![
                ("Query.order", "object type Order must have a selection of subfields"),
                ("Query.node", "interface type Node must have a selection of subfields"),
                (
                    "Query.search",
                    "union type SearchResult must have a selection of subfields"
                ),
            ]
        );
    }

    #[test]
    fn test_required_arguments_not_provided() {
        let findings = run("{ order { id } search { __typename } orders { id } }").unwrap();
        assert_eq!(
            reportable(&findings),
            vec![
                ("Query.order(id)".to_string(), Severity::Breaking),
                ("Query.search(query)".to_string(), Severity::Breaking),
            ]
        );
        let missing = findings.iter().find(|f| f.target == "Query.order(id)").unwrap();
        assert_eq!(missing.kind, FindingKind::Argument);
        assert_eq!(missing.reason, "required argument id not provided");
    }

    #[test]
    fn test_unknown_variable_type() {
        let findings =
            run("query($sort: SortOrder = NAME, $id: ID!) { order(id: $id) { id } }").unwrap();
        assert_eq!(
            reportable(&findings),
            vec![("SortOrder".to_string(), Severity::Breaking)]
        );
        let variable = findings.iter().find(|f| f.kind == FindingKind::Variable).unwrap();
        assert_eq!(variable.reason, "type SortOrder does not exist");
    }

    #[test]
    fn test_missing_root_type() {
        let findings = run("mutation { orderUpdate { id } }").unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::RootOperation);
        assert_eq!(findings[0].severity, Severity::Breaking);
        assert_eq!(findings[0].target, "mutation");
    }

    #[test]
    fn test_mismatched_fragment_on_object_is_skipped() {
        let findings = run(
            "{ order(id: 1) { ...CustomerFields ... on Customer { nope } } }
             fragment CustomerFields on Customer { email alsoNope }",
        )
        .unwrap();
        assert!(reportable(&findings).is_empty());
        assert!(findings.iter().all(|f| !f.target.starts_with("Customer.")));
    }

    #[test]
    fn test_fragments_on_abstract_types() {
        let findings = run(
            "{ node(id: 1) { id ... on Order { name legacyTotal } ... on Customer { email } }
               search(query: \"x\") { ... on Node { id } ... on Order { name } } }",
        )
        .unwrap();
        let targets: Vec<_> = findings.iter().map(|f| f.target.as_str()).collect();
        assert_eq!(
            targets,
            vec![
                "Query.node",
                "Query.node(id)",
                "Node.id",
                "Order.name",
                "Order.legacyTotal",
                "Customer.email",
                "Query.search",
                "Query.search(query)",
                "Node.id",
                "Order.name",
            ]
        );
    }

    #[test]
    fn test_union_field_selection_breaks() {
        let findings = run("{ search(query: \"x\") { id } }").unwrap();
        assert_eq!(
            reportable(&findings),
            vec![("SearchResult.id".to_string(), Severity::Breaking)]
        );
    }

    #[test]
    fn test_unknown_type_condition() {
        let findings = run("{ node(id: 1) { ... on DraftOrder { id } } }").unwrap();
        let condition = findings
            .iter()
            .find(|f| f.kind == FindingKind::TypeCondition)
            .unwrap();
        assert_eq!(condition.target, "DraftOrder");
        assert_eq!(condition.reason, "type DraftOrder does not exist");
    }

    #[test]
    fn test_unspread_fragments_are_walked() {
        let findings = run(
            "fragment OrderBits on Order { legacyTotal ...More }
             fragment More on Order { gone }
             fragment Broken on Missing { id }",
        )
        .unwrap();
        assert_eq!(
            reportable(&findings),
            vec![
                ("Order.legacyTotal".to_string(), Severity::Deprecated),
                ("Order.gone".to_string(), Severity::Breaking),
                ("Missing".to_string(), Severity::Breaking),
            ]
        );
    }

    #[test]
    fn test_fragment_cycle() {
        let err = run(
            "{ order(id: 1) { ...A } }
             fragment A on Order { id ...B }
             fragment B on Order { name ...A }",
        )
        .unwrap_err();
        let ResolveError::FragmentCycle { path, origin } = err;
        assert_eq!(path, vec!["A", "B", "A"]);
        assert_eq!(origin.line, 3);
    }

    #[test]
    fn test_self_spread_is_a_cycle() {
        let err = run("fragment A on Order { id ...A }").unwrap_err();
        assert_eq!(err.to_string(), "fragment cycle: A -> A");
    }

    #[test]
    fn test_shared_fragment_is_not_a_cycle() {
        let findings = run(
            "{ order(id: 1) { ...A ...B } }
             fragment A on Order { ...C }
             fragment B on Order { ...C }
             fragment C on Order { id }",
        )
        .unwrap();
        let ids = findings.iter().filter(|f| f.target == "Order.id").count();
        assert_eq!(ids, 2);
    }

    #[test]
    fn test_deterministic() {
        let query = "{ node(id: 1) { ... on Order { legacyTotal tags(legacy: true) } } orders(sortKey: NAME) { gone } }";
        assert_eq!(run(query).unwrap(), run(query).unwrap());
    }
}
