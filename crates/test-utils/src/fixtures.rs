//! Shared schema fixtures.
//!
//! A small commerce API in two versions. [`CURRENT_SCHEMA`] is what the code
//! under test is written against; [`TARGET_SCHEMA`] is the upgrade target.
//! Use these when a test needs realistic types (interfaces, unions, enums,
//! input objects). When the exact schema shape is the point of the test,
//! prefer an inline fixture.
//!
//! Differences between the two versions:
//!
//! - `Order.billingAddress` deprecated in current, removed in target
//! - `Order.totalPrice` deprecated in current, removed in target
//! - `Order.lineItems(reverse:)` removed in target
//! - `Order.shopAddress` added in target
//! - `Customer.email` deprecated in target
//! - `OrderSortKeys.CUSTOMER_NAME` deprecated in both
//! - `MetafieldType.JSON_STRING` deprecated in current, removed in target
//! - `Shop.legacyPlan` removed in target (valid in current)

/// Upgrade-from version.
pub const CURRENT_VERSION: &str = "2024-10";

/// Upgrade-to version.
pub const TARGET_VERSION: &str = "2025-01";

pub const CURRENT_SCHEMA: &str = r#"
type Query {
  shop: Shop!
  order(id: ID!): Order
  orders(first: Int, sortKey: OrderSortKeys, reverse: Boolean, query: String): OrderConnection!
  node(id: ID!): Node
  nodes(ids: [ID!]!): [Node]!
  search(term: String!): [SearchResult!]!
}

type Mutation {
  orderUpdate(input: OrderInput!): OrderUpdatePayload
}

interface Node {
  id: ID!
}

type Shop {
  name: String!
  email: String
  legacyPlan: String
}

type Order implements Node {
  id: ID!
  name: String!
  billingAddress: MailingAddress @deprecated(reason: "Use Order.shopAddress instead")
  shippingAddress: MailingAddress
  totalPrice: Money! @deprecated(reason: "Use `totalPriceSet` instead.")
  totalPriceSet: MoneyBag!
  lineItems(first: Int, reverse: Boolean): LineItemConnection!
  displayFinancialStatus: OrderDisplayFinancialStatus
  customer: Customer
  tags: [String!]!
}

type Customer implements Node {
  id: ID!
  displayName: String!
  email: String
}

type Product implements Node {
  id: ID!
  title: String!
}

union SearchResult = Order | Product | Customer

type MailingAddress {
  address1: String
  city: String
}

type MoneyBag {
  shopMoney: MoneyV2!
}

type MoneyV2 {
  amount: Decimal!
  currencyCode: CurrencyCode!
}

type LineItemConnection {
  nodes: [LineItem!]!
}

type LineItem implements Node {
  id: ID!
  title: String!
  quantity: Int!
}

type OrderConnection {
  edges: [OrderEdge!]!
  nodes: [Order!]!
}

type OrderEdge {
  cursor: String!
  node: Order!
}

type OrderUpdatePayload {
  order: Order
  userErrors: [UserError!]!
}

type UserError {
  field: [String!]
  message: String!
}

input OrderInput {
  id: ID!
  tags: [String!]
  metafields: [MetafieldInput!]
}

input MetafieldInput {
  namespace: String
  key: String
  type: MetafieldType
  value: String
}

enum OrderSortKeys {
  CREATED_AT
  PROCESSED_AT
  TOTAL_PRICE
  ID
  CUSTOMER_NAME @deprecated(reason: "Sort by `ID` instead.")
}

enum OrderDisplayFinancialStatus {
  PAID
  PENDING
  REFUNDED
}

enum MetafieldType {
  SINGLE_LINE_TEXT_FIELD
  JSON
  JSON_STRING @deprecated(reason: "Use `JSON` instead.")
}

enum CurrencyCode {
  USD
  CAD
  EUR
}

scalar Money
scalar Decimal
"#;

pub const TARGET_SCHEMA: &str = r#"
type Query {
  shop: Shop!
  order(id: ID!): Order
  orders(first: Int, sortKey: OrderSortKeys, reverse: Boolean, query: String): OrderConnection!
  node(id: ID!): Node
  nodes(ids: [ID!]!): [Node]!
  search(term: String!): [SearchResult!]!
}

type Mutation {
  orderUpdate(input: OrderInput!): OrderUpdatePayload
}

interface Node {
  id: ID!
}

type Shop {
  name: String!
  email: String
}

type Order implements Node {
  id: ID!
  name: String!
  shopAddress: MailingAddress
  shippingAddress: MailingAddress
  totalPriceSet: MoneyBag!
  lineItems(first: Int): LineItemConnection!
  displayFinancialStatus: OrderDisplayFinancialStatus
  customer: Customer
  tags: [String!]!
}

type Customer implements Node {
  id: ID!
  displayName: String!
  email: String @deprecated(reason: "Use `defaultEmailAddress.emailAddress` instead.")
  defaultEmailAddress: CustomerEmailAddress
}

type CustomerEmailAddress {
  emailAddress: String
}

type Product implements Node {
  id: ID!
  title: String!
}

union SearchResult = Order | Product | Customer

type MailingAddress {
  address1: String
  city: String
}

type MoneyBag {
  shopMoney: MoneyV2!
}

type MoneyV2 {
  amount: Decimal!
  currencyCode: CurrencyCode!
}

type LineItemConnection {
  nodes: [LineItem!]!
}

type LineItem implements Node {
  id: ID!
  title: String!
  quantity: Int!
}

type OrderConnection {
  edges: [OrderEdge!]!
  nodes: [Order!]!
}

type OrderEdge {
  cursor: String!
  node: Order!
}

type OrderUpdatePayload {
  order: Order
  userErrors: [UserError!]!
}

type UserError {
  field: [String!]
  message: String!
}

input OrderInput {
  id: ID!
  tags: [String!]
  metafields: [MetafieldInput!]
}

input MetafieldInput {
  namespace: String
  key: String
  type: MetafieldType
  value: String
}

enum OrderSortKeys {
  CREATED_AT
  PROCESSED_AT
  TOTAL_PRICE
  ID
  CUSTOMER_NAME @deprecated(reason: "Sort by `ID` instead.")
}

enum OrderDisplayFinancialStatus {
  PAID
  PENDING
  REFUNDED
}

enum MetafieldType {
  SINGLE_LINE_TEXT_FIELD
  JSON
}

enum CurrencyCode {
  USD
  CAD
  EUR
}

scalar Decimal
"#;
