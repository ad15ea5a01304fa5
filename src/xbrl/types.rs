use chrono::{NaiveDate, NaiveDateTime};
use num_rational::Ratio;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;

use super::classify::StatementCategory;

/// Declared type of a concept, as reported by the XBRL toolkit.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ConceptType {
    Fraction,
    Integer,
    Monetary,
    PerShare,
    Shares,
    Numeric,
    Date,
    Boolean,
    TextBlock,
    Tuple,
    Other,
}

impl ConceptType {
    /// True for the generic numeric family (monetary, per-share, share
    /// counts and plain numerics) that all follow the reported-decimals
    /// rounding rule.
    pub fn is_generic_numeric(&self) -> bool {
        matches!(
            self,
            ConceptType::Monetary
                | ConceptType::PerShare
                | ConceptType::Shares
                | ConceptType::Numeric
        )
    }
}

/// Declared balance attribute of a concept.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Balance {
    Credit,
    Debit,
    #[default]
    None,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Instant,
    #[default]
    Duration,
}

/// One reported fact, exactly as the external toolkit hands it over.
/// Read-only to this crate.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFact {
    /// Taxonomy namespace prefix, eg `ifrs-full` or a filer prefix.
    pub prefix: String,
    /// Concept local name, eg `ProfitLoss`.
    pub name: String,
    #[serde(default)]
    pub concept_type: Option<ConceptType>,
    #[serde(default)]
    pub is_nil: bool,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub numerator: Option<String>,
    #[serde(default)]
    pub denominator: Option<String>,
    /// Reported decimals attribute: an integer literal, "INF", or absent.
    #[serde(default)]
    pub decimals: Option<String>,
    #[serde(default)]
    pub balance: Balance,
    #[serde(default)]
    pub period_type: PeriodType,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    /// End-exclusive period end, as reported by the toolkit.
    #[serde(default)]
    pub period_end: Option<NaiveDateTime>,
    /// Entity identifier (LEI for ESEF filings).
    pub entity_id: String,
    #[serde(default)]
    pub currency: Option<String>,
    /// Dimensional scenario, expected to be a single `prefix:member` token.
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    /// Presentation role id the fact appears under, if any.
    #[serde(default)]
    pub role: Option<String>,
}

impl RawFact {
    pub fn qname(&self) -> String {
        format!("{}:{}", self.prefix, self.name)
    }
}

/// Summation-item edge: `child` contributes additively to `parent`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationEdge {
    pub parent: String,
    pub child: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Wider-narrower anchoring edge: `narrower` is a filer-defined concept
/// equivalent to (or narrower than) the standard `wider` concept.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorEdge {
    pub wider: String,
    pub narrower: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationEdge {
    pub parent: String,
    pub child: String,
}

/// One presentation role of the filing, with its parent-child tree.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRole {
    pub uri: String,
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub edges: Vec<PresentationEdge>,
}

/// Everything the toolkit emits for one filing.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingData {
    #[serde(default)]
    pub facts: Vec<RawFact>,
    #[serde(default)]
    pub calculation_edges: Vec<CalculationEdge>,
    #[serde(default)]
    pub anchor_edges: Vec<AnchorEdge>,
    #[serde(default)]
    pub roles: Vec<PresentationRole>,
}

/// Coerced scalar value of a fact.
#[derive(Clone, Debug, PartialEq)]
pub enum FactValue {
    Fraction(Ratio<i128>),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
    Bool(bool),
    Text(String),
}

impl FactValue {
    pub fn is_zero(&self) -> bool {
        match self {
            FactValue::Fraction(r) => *r.numer() == 0,
            FactValue::Integer(i) => *i == 0,
            FactValue::Decimal(d) => d.is_zero(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FactValue::Fraction(_) | FactValue::Integer(_) | FactValue::Decimal(_)
        )
    }

    /// Apply the balance sign convention. Non-numeric values pass through
    /// unchanged; callers apply this exactly once per fact.
    pub fn signed(self, multiplier: i64) -> FactValue {
        if multiplier >= 0 {
            return self;
        }
        match self {
            FactValue::Fraction(r) => FactValue::Fraction(-r),
            FactValue::Integer(i) => FactValue::Integer(-i),
            FactValue::Decimal(d) => FactValue::Decimal(-d),
            other => other,
        }
    }
}

impl fmt::Display for FactValue {
    /// Exact rendering; numeric values never pass through a float.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Fraction(r) => {
                if *r.denom() == 1 {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            FactValue::Integer(i) => write!(f, "{}", i),
            FactValue::Decimal(d) => write!(f, "{}", d.normalize()),
            FactValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FactValue::Bool(b) => write!(f, "{}", b),
            FactValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One cleaned output record, ready to be flattened into a tabular row.
///
/// Invariants: `wider_anchor_or_xml_name` always falls back to `xml_name`
/// when no anchor mapping exists, and `value` carries the balance sign
/// convention already applied.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedFact {
    pub lei: String,
    pub period_end: NaiveDate,
    pub statement_category: Option<StatementCategory>,
    pub xml_name: String,
    pub wider_anchor: Option<String>,
    pub wider_anchor_or_xml_name: String,
    pub xml_name_parent: Option<String>,
    pub value: FactValue,
    pub currency: String,
    pub is_extension: bool,
    pub is_total: bool,
    pub has_resolved_group: bool,
    pub statement_item_group: Option<String>,
    pub membership: Option<String>,
    pub legal_name: Option<String>,
    pub label: Option<String>,
    /// Document-order index, used for stable output ordering.
    pub sort_key: usize,
}

/// Local part of a qualified name, eg `ifrs-full:Assets` -> `Assets`.
pub fn local_name(qname: &str) -> &str {
    match qname.rsplit_once(':') {
        Some((_, local)) => local,
        None => qname,
    }
}

/// Last path segment of a link role URI.
pub fn clean_linkrole(role: &str) -> &str {
    match role.rsplit_once('/') {
        Some((_, last)) => last,
        None => role,
    }
}
