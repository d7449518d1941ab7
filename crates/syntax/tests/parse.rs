use query_analyzer_syntax::{parse, ParseError, QuerySource, Selection};

const ORDER_QUERY: &str = r"query OrderDetails($id: ID!) {
  order(id: $id) {
    ...OrderSummary
    billingAddress {
      city
    }
  }
}

fragment OrderSummary on Order {
  name
  totalPrice
}";

fn field_names(selections: &[Selection]) -> Vec<String> {
    selections
        .iter()
        .map(|selection| match selection {
            Selection::Field(field) => field.name.to_string(),
            Selection::FragmentSpread(spread) => format!("...{}", spread.name),
            Selection::InlineFragment(inline) => format!(
                "... on {}",
                inline.type_condition.as_deref().unwrap_or("<none>")
            ),
        })
        .collect()
}

#[test]
fn embedded_query_reports_host_positions() {
    let source = QuerySource::new(ORDER_QUERY, "app/Orders.php")
        .at(18, 1)
        .with_identifier("ORDER_QUERY");
    let doc = parse(&source).unwrap();

    let op = &doc.operations[0];
    assert_eq!(op.name.as_deref(), Some("OrderDetails"));
    assert_eq!(op.origin.to_string(), "app/Orders.php:18:1");

    let Selection::Field(order) = &op.selections[0] else {
        panic!("expected order field");
    };
    assert_eq!(order.origin.to_string(), "app/Orders.php:19:3");
    assert_eq!(
        field_names(&order.selections),
        vec!["...OrderSummary", "billingAddress"]
    );

    let fragment = doc.fragment("OrderSummary").unwrap();
    assert_eq!(fragment.origin.line, 27);
    assert_eq!(field_names(&fragment.selections), vec!["name", "totalPrice"]);
}

#[test]
fn first_line_offsets_by_start_column() {
    let source = QuerySource::new("{ shop { name } }", "src/shop.ts").at(7, 21);
    let doc = parse(&source).unwrap();
    let Selection::Field(shop) = &doc.operations[0].selections[0] else {
        panic!("expected shop field");
    };
    assert_eq!((shop.origin.line, shop.origin.column), (7, 23));
}

#[test]
fn undefined_fragment_message() {
    let err = parse(&QuerySource::new(
        "query {\n  order(id: 1) {\n    ...Missing\n  }\n}",
        "q.graphql",
    ))
    .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r#"unknown fragment "Missing" at 3:5"#);
}

#[test]
fn duplicate_fragment_message() {
    let err = parse(&QuerySource::new(
        "fragment A on Order { id }\nfragment A on Order { name }",
        "q.graphql",
    ))
    .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"fragment "A" is defined more than once (second definition at 2:1)"#
    );
}

#[test]
fn syntax_error_is_positioned_in_host() {
    let source = QuerySource::new("query {\n  shop {\n    name(\n  }\n}", "app/Shop.php").at(10, 1);
    let err = parse(&source).unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
    let (line, column) = err.position().unwrap();
    assert!((10..=14).contains(&line), "line {line} outside the query");
    assert!(column >= 1);
}

#[test]
fn empty_document_is_rejected() {
    let err = parse(&QuerySource::new("# just a comment\n", "q.graphql")).unwrap_err();
    assert_eq!(err, ParseError::EmptyDocument);
    assert_eq!(err.position(), None);
}
