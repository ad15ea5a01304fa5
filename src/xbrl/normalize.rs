use chrono::{Days, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::error::NormalizeError;

use super::anchor::AnchorMap;
use super::classify::StatementClassifier;
use super::coerce::coerce;
use super::hierarchy::ConceptHierarchy;
use super::types::{Balance, ConceptType, FactValue, NormalizedFact, RawFact};

/// Prefix of the reference taxonomy; concepts under any other prefix are
/// filer extensions.
pub const REFERENCE_TAXONOMY_PREFIX: &str = "ifrs-full";

/// Concepts that carry the reporting entity's legal name.
const LEGAL_NAME_CONCEPTS: [&str; 2] = ["NameOfUltimateParentOfGroup", "NameOfParentEntity"];

/// Line items that represent a total or subtotal of other items.
static KNOWN_TOTALS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        // Cash flow statement
        "CashFlowsFromUsedInOperationsBeforeChangesInWorkingCapital",
        "CashFlowsFromUsedInOperatingActivities",
        "CashFlowsFromUsedInFinancingActivities",
        "CashFlowsFromUsedInInvestingActivities",
        "IncreaseDecreaseInCashAndCashEquivalents",
        "IncreaseDecreaseInCashAndCashEquivalentsBeforeEffectOfExchangeRateChanges",
        // Balance sheet
        "NoncurrentAssets",
        "CurrentAssets",
        "Assets",
        "NoncurrentLiabilities",
        "CurrentLiabilities",
        "EquityAndLiabilities",
        // Income statement
        "GrossProfit",
        "ProfitLossFromOperatingActivities",
        "ProfitLossBeforeTax",
        "ProfitLoss",
        "ComprehensiveIncome",
    ])
});

/// Curated line-item groups, used to aggregate comparable records across
/// companies that tag at different granularities.
static STATEMENT_ITEM_GROUPS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Revenue", "revenue"),
        ("OtherIncome", "other_income"),
        ("CostOfSales", "cost_of_sales"),
        ("GrossProfit", "gross_profit"),
        ("DistributionCosts", "operating_expenses"),
        ("AdministrativeExpense", "operating_expenses"),
        ("EmployeeBenefitsExpense", "operating_expenses"),
        ("DepreciationAndAmortisationExpense", "depreciation_amortisation"),
        ("ProfitLossFromOperatingActivities", "operating_profit"),
        ("FinanceIncome", "net_financial_items"),
        ("FinanceCosts", "net_financial_items"),
        ("ProfitLossBeforeTax", "profit_before_tax"),
        ("IncomeTaxExpenseContinuingOperations", "income_tax"),
        ("ProfitLoss", "profit_loss"),
        ("PropertyPlantAndEquipment", "fixed_assets"),
        ("Goodwill", "intangible_assets"),
        ("IntangibleAssetsOtherThanGoodwill", "intangible_assets"),
        ("Inventories", "inventories"),
        ("TradeAndOtherCurrentReceivables", "receivables"),
        ("CashAndCashEquivalents", "cash"),
        ("Equity", "equity"),
        ("IssuedCapital", "equity"),
        ("RetainedEarnings", "equity"),
        ("LongtermBorrowings", "borrowings"),
        ("ShorttermBorrowings", "borrowings"),
        ("CashFlowsFromUsedInOperatingActivities", "cash_flow_operating"),
        ("CashFlowsFromUsedInInvestingActivities", "cash_flow_investing"),
        ("CashFlowsFromUsedInFinancingActivities", "cash_flow_financing"),
    ])
});

/// Multiplier reproducing the statement-level sign convention: credit
/// balances count positive, debit balances negative, everything else is
/// left untouched.
pub fn sign_multiplier(balance: Balance) -> i64 {
    match balance {
        Balance::Credit => 1,
        Balance::Debit => -1,
        Balance::None => 1,
    }
}

pub fn is_extension(prefix: &str) -> bool {
    prefix != REFERENCE_TAXONOMY_PREFIX
}

pub fn is_total(name: &str) -> bool {
    KNOWN_TOTALS.contains(name)
}

pub fn statement_item_group(name: &str) -> Option<&'static str> {
    STATEMENT_ITEM_GROUPS.get(name).copied()
}

/// Split a dimensional scenario into (axis prefix, member name). Anything
/// that is not a single `prefix:member` token yields (None, None) rather
/// than raising.
pub fn membership(scenario: Option<&str>) -> (Option<String>, Option<String>) {
    let scenario = match scenario {
        Some(s) => s,
        None => return (None, None),
    };

    let items: Vec<&str> = scenario.split(':').collect();
    if items.len() != 2 {
        return (None, None);
    }

    (Some(items[0].to_string()), Some(items[1].to_string()))
}

/// The toolkit reports an end-exclusive datetime; the financial period
/// ends the day before.
pub fn period_end_date(end: NaiveDateTime) -> NaiveDate {
    (end - Days::new(1)).date()
}

/// Legal name of the reporting entity, from the well-known parent-name
/// concepts.
pub fn legal_name(facts: &[RawFact]) -> Option<String> {
    for fact in facts {
        if fact.prefix == REFERENCE_TAXONOMY_PREFIX
            && LEGAL_NAME_CONCEPTS.contains(&fact.name.as_str())
        {
            if let Ok(Some(FactValue::Text(name))) = coerce(fact) {
                return Some(name);
            }
        }
    }
    None
}

/// Read-only per-filing context shared by all of the filing's facts.
pub struct FilingContext<'a> {
    pub hierarchy: &'a ConceptHierarchy,
    pub anchors: &'a AnchorMap,
    pub classifier: &'a StatementClassifier,
    /// Concept local name -> cleaned link role, from the calculation graph.
    /// Fallback for facts the toolkit reported without a role.
    pub concept_roles: &'a HashMap<String, String>,
    pub legal_name: Option<&'a str>,
}

/// Turn one raw fact into a normalized record. `Ok(None)` means the fact
/// carries nothing worth keeping (metadata, no period, nil value).
pub fn normalize_fact(
    fact: &RawFact,
    sort_key: usize,
    ctx: &FilingContext<'_>,
) -> Result<Option<NormalizedFact>, NormalizeError> {
    // Per-share and share-count facts are metadata, not line items.
    if matches!(
        fact.concept_type,
        Some(ConceptType::PerShare) | Some(ConceptType::Shares)
    ) {
        return Ok(None);
    }

    let period_end = match fact.period_end {
        Some(end) => period_end_date(end),
        None => return Ok(None),
    };

    let value = match coerce(fact)? {
        Some(v) => v,
        None => return Ok(None),
    };

    let xml_name = fact.name.clone();

    let role = fact
        .role
        .as_deref()
        .or_else(|| ctx.concept_roles.get(&xml_name).map(String::as_str));
    let statement_category = ctx.classifier.classify(&xml_name, role);

    let wider_anchor = ctx.anchors.resolve(&xml_name).map(str::to_string);
    let wider_anchor_or_xml_name = wider_anchor.clone().unwrap_or_else(|| xml_name.clone());

    let xml_name_parent = ctx.hierarchy.parent_of(&xml_name).map(str::to_string);

    let group = statement_item_group(&xml_name);
    let (_, membership_name) = membership(fact.scenario.as_deref());

    let signed_value = value.signed(sign_multiplier(fact.balance));

    Ok(Some(NormalizedFact {
        lei: fact.entity_id.clone(),
        period_end,
        statement_category,
        is_total: is_total(&wider_anchor_or_xml_name),
        is_extension: is_extension(&fact.prefix),
        has_resolved_group: group.is_some(),
        statement_item_group: group.map(str::to_string),
        xml_name,
        wider_anchor,
        wider_anchor_or_xml_name,
        xml_name_parent,
        value: signed_value,
        currency: fact.currency.clone().unwrap_or_default(),
        membership: membership_name,
        legal_name: ctx.legal_name.map(str::to_string),
        label: fact.label.clone(),
        sort_key,
    }))
}
