use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use strum::{Display, EnumIter};

use super::types::{clean_linkrole, PresentationRole};

/// Canonical statement categories. The serialized names follow the output
/// table conventions, eg `cash_flow_statement`.
#[derive(
    Clone, Copy, Debug, Display, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum StatementCategory {
    #[strum(serialize = "balance_sheet")]
    #[serde(rename = "balance_sheet")]
    BalanceSheet,
    #[strum(serialize = "income_statement")]
    #[serde(rename = "income_statement")]
    IncomeStatement,
    #[strum(serialize = "cash_flow_statement")]
    #[serde(rename = "cash_flow_statement")]
    CashFlow,
    #[strum(serialize = "changes_equity")]
    #[serde(rename = "changes_equity")]
    ChangesInEquity,
    #[strum(serialize = "other_comprehensive_income_after_tax")]
    #[serde(rename = "other_comprehensive_income_after_tax")]
    OtherComprehensiveIncomeAfterTax,
    #[strum(serialize = "other_comprehensive_income_pre_tax")]
    #[serde(rename = "other_comprehensive_income_pre_tax")]
    OtherComprehensiveIncomeBeforeTax,
    #[strum(serialize = "general_information")]
    #[serde(rename = "general_information")]
    General,
    #[strum(serialize = "unclassified")]
    #[serde(rename = "unclassified")]
    Unclassified,
}

impl StatementCategory {
    pub fn is_other_comprehensive_income(&self) -> bool {
        matches!(
            self,
            StatementCategory::OtherComprehensiveIncomeAfterTax
                | StatementCategory::OtherComprehensiveIncomeBeforeTax
        )
    }
}

/// Role names observed in the wild, mapped to their statement category.
/// Standard IFRS role ids first, then the long tail of filer-chosen names
/// (many of them Swedish). Immutable configuration, consulted before the
/// per-filing heuristic.
static ROLE_ALIASES: Lazy<HashMap<&'static str, StatementCategory>> = Lazy::new(|| {
    use StatementCategory::*;

    HashMap::from([
        // Standard taxonomy roles
        ("ias_1_role-110000", General),
        ("ias_1_role-210000", BalanceSheet),
        ("ias_1_role-210000_extended", BalanceSheet),
        ("ias_1_role-220000", BalanceSheet),
        ("ias_1_role-220000_extended", BalanceSheet),
        ("ias_1_role-310000", IncomeStatement),
        ("ias_1_role-310000_extended", IncomeStatement),
        ("ias_1_role-320000", IncomeStatement),
        ("ias_1_role-320000_extended", IncomeStatement),
        ("ias_1_role-410000", OtherComprehensiveIncomeAfterTax),
        ("ias_1_role-410000_extended", OtherComprehensiveIncomeAfterTax),
        ("ias_1_role-420000", OtherComprehensiveIncomeBeforeTax),
        ("ias_1_role-420000_extended", OtherComprehensiveIncomeBeforeTax),
        ("ias_7_role-510000", CashFlow),
        ("ias_7_role-520000", CashFlow),
        ("ias_7_role-520000_extended", CashFlow),
        ("ias_1_role-610000", ChangesInEquity),
        ("ias_1_role-610000_extended", ChangesInEquity),
        // Balance sheet
        ("ConsolidatedBalanceSheets", BalanceSheet),
        ("EgetKapitalOchSkulder", BalanceSheet),
        ("FinancialPosition", BalanceSheet),
        ("KoncernensBalansrkning", BalanceSheet),
        ("Koncernensbalansraekning", BalanceSheet),
        ("Rapportöverfinansiellställningförkoncernen", BalanceSheet),
        ("RapportverFinansiellStllningFrKoncernen", BalanceSheet),
        ("RapportOEverFinansiellStaellning", BalanceSheet),
        ("StatementOfFinancialPosition", BalanceSheet),
        ("StatementoffinancialpositioncurrentnoncurrentStatement", BalanceSheet),
        ("Table1StatementOfFinancialPositionAbstract", BalanceSheet),
        ("Tillgangar", BalanceSheet),
        // Cash flow
        ("CashFlowStatement", CashFlow),
        ("ConsolidatedStatementsOfCashFlows", CashFlow),
        ("KassafldesanalysFrKoncernen", CashFlow),
        ("Koncernenskassafloedesanalys", CashFlow),
        ("RapportOEverKassafloeden", CashFlow),
        ("Rapportöverkassaflödenförkoncernen", CashFlow),
        ("StatementOfCashFlows", CashFlow),
        ("Table1StatementOfCashFlowsAbstract", CashFlow),
        ("StatementofcashflowsindirectmethodStatement", CashFlow),
        // Changes in equity
        ("ChangesinEquity", ChangesInEquity),
        ("ChangesinEquity2", ChangesInEquity),
        ("ConsolidatedStatementsOfChangesInEquity", ChangesInEquity),
        ("RapportOEverFoeraendringarIEgetKapital", ChangesInEquity),
        ("SammanstllningverFrndringAvEgetKapitalIKoncernen", ChangesInEquity),
        ("StatementofchangesinequityStatement", ChangesInEquity),
        // Income statement
        ("ConsolidatedStatementsOfComprehensiveIncomeLoss", IncomeStatement),
        ("ConsolidatedStatementsOfOperations", IncomeStatement),
        ("ComprehensiveIncome", IncomeStatement),
        ("IncomeStatement", IncomeStatement),
        ("IncomeStatement2", IncomeStatement),
        ("KoncernensResultatrkningOchvrigtTotalresultat", IncomeStatement),
        ("KoncernensRapportverTotalresultatAlternate1", IncomeStatement),
        ("KoncernensRapportverTotalresultat", IncomeStatement),
        ("Koncernensrapportoevertotalresultat", IncomeStatement),
        ("KoncernensResultatrkning", IncomeStatement),
        ("KoncernensResultatrkningAlternate1", IncomeStatement),
        ("ProfitOrLoss", IncomeStatement),
        ("ProfitLoss", IncomeStatement),
        ("RapportOEverTotalresultat", IncomeStatement),
        ("RapportOEverTotalresultat2", IncomeStatement),
        ("Rapportöverresultatochövrigttotalresultatförkoncernen", IncomeStatement),
        ("Resultat", IncomeStatement),
        ("StatementOfComprehensiveIncome", IncomeStatement),
        ("StatementOfComprehensiveIncome2", IncomeStatement),
        ("Table1ProfitOrLossAbstract", IncomeStatement),
        ("Table1StatementOfComprehensiveIncomeAbstract", IncomeStatement),
        (
            "StatementofcomprehensiveincomeOCIcomponentspresentednetoftaxStatement",
            IncomeStatement,
        ),
        (
            "StatementofcomprehensiveincomeOCIcomponentspresentednetoftaxStatement_1",
            IncomeStatement,
        ),
        (
            "StatementofcomprehensiveincomeprofitorlossbyfunctionofexpenseStatement",
            IncomeStatement,
        ),
        (
            "StatementofcomprehensiveincomeprofitorlossbyfunctionofexpenseStatement_1",
            IncomeStatement,
        ),
        (
            "StatementofcomprehensiveincomeprofitorlossbynatureofexpenseStatement",
            IncomeStatement,
        ),
        (
            "StatementofcomprehensiveincomeprofitorlossbynatureofexpenseStatement_1",
            IncomeStatement,
        ),
    ])
});

/// Concept closures of the reference taxonomy, one per heuristically
/// matchable category. Derived offline from the canonical taxonomy's
/// presentation linkbase and bundled with the crate; immutable at runtime.
static REFERENCE_CLOSURES: Lazy<BTreeMap<StatementCategory, BTreeSet<String>>> =
    Lazy::new(|| {
        let raw: HashMap<String, Vec<String>> =
            serde_json::from_str(include_str!("../../static/statement_definition.json"))
                .expect("bundled statement definition artifact is valid JSON");

        let mut closures = BTreeMap::new();
        for (key, concepts) in raw {
            let category = match key.as_str() {
                "BalanceSheet" => StatementCategory::BalanceSheet,
                "IncomeStatement" => StatementCategory::IncomeStatement,
                "CashFlow" => StatementCategory::CashFlow,
                "ChangesInEquity" => StatementCategory::ChangesInEquity,
                other => panic!("unknown category {other:?} in statement definition artifact"),
            };
            closures.insert(category, concepts.into_iter().collect());
        }
        closures
    });

/// All concept identifiers reachable from a presentation role: every edge
/// target plus the declared roots (roots have no incoming edge).
pub fn role_closure(role: &PresentationRole) -> BTreeSet<String> {
    let mut closure: BTreeSet<String> =
        role.edges.iter().map(|e| e.child.clone()).collect();
    for root in &role.roots {
        closure.insert(root.clone());
    }
    closure
}

/// Pick each category's best-matching filer role by maximal closure
/// intersection. Pure so the scoring stays testable apart from fact
/// classification.
///
/// Roles are visited in lexicographic order of role id and a later role
/// must score strictly higher to displace an earlier one, which makes the
/// tie-break deterministic across runs. A category with no overlapping
/// role is absent from the result.
pub fn best_roles_per_category(
    filer_closures: &BTreeMap<String, BTreeSet<String>>,
    reference: &BTreeMap<StatementCategory, BTreeSet<String>>,
) -> BTreeMap<StatementCategory, String> {
    let mut best: BTreeMap<StatementCategory, String> = BTreeMap::new();

    for (category, reference_closure) in reference {
        let mut max_score = 0usize;
        let mut best_role: Option<&str> = None;

        for (role, closure) in filer_closures {
            let score = closure.intersection(reference_closure).count();
            if score > max_score {
                max_score = score;
                best_role = Some(role);
            }
        }

        match best_role {
            Some(role) => {
                best.insert(*category, role.to_string());
            }
            None => {
                log::warn!("unable to find link role for {}", category);
            }
        }
    }

    best
}

/// Per-filing statement classifier: a static alias lookup backed by the
/// cached best-role heuristic. Built once per filing, before fact
/// iteration, and discarded with the filing.
#[derive(Debug, Default)]
pub struct StatementClassifier {
    /// Cleaned filer role name -> category, from the heuristic.
    base_names: HashMap<String, StatementCategory>,
}

impl StatementClassifier {
    pub fn for_filing(roles: &[PresentationRole]) -> Self {
        let filer_closures: BTreeMap<String, BTreeSet<String>> = roles
            .iter()
            .map(|role| (role.uri.clone(), role_closure(role)))
            .collect();

        let best = best_roles_per_category(&filer_closures, &REFERENCE_CLOSURES);

        let mut base_names = HashMap::new();
        for (category, role) in best {
            log::debug!("matched {} to filer role {}", category, role);
            base_names.insert(clean_linkrole(&role).to_string(), category);
        }

        StatementClassifier { base_names }
    }

    /// Category of one fact. `None` means the fact has no resolvable role
    /// at all (entity-identification facts and the like); `Unclassified`
    /// means it has a role nothing matched.
    pub fn classify(&self, concept_name: &str, role: Option<&str>) -> Option<StatementCategory> {
        // Filers frequently nest OCI line items inside an income statement
        // role; keying on the concept name keeps the two statements
        // separable regardless of what the role matching says.
        if concept_name.contains("Comprehensive") {
            if concept_name.contains("BeforeTax") {
                return Some(StatementCategory::OtherComprehensiveIncomeBeforeTax);
            }
            return Some(StatementCategory::OtherComprehensiveIncomeAfterTax);
        }

        let role = role?;
        let cleaned = clean_linkrole(role);

        if let Some(category) = ROLE_ALIASES.get(role).or_else(|| ROLE_ALIASES.get(cleaned)) {
            return Some(*category);
        }

        if let Some(category) = self
            .base_names
            .get(cleaned)
            .or_else(|| self.base_names.get(role))
        {
            return Some(*category);
        }

        Some(StatementCategory::Unclassified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xbrl::types::PresentationEdge;

    fn role(uri: &str, roots: &[&str], edges: &[(&str, &str)]) -> PresentationRole {
        PresentationRole {
            uri: uri.to_string(),
            roots: roots.iter().map(|s| s.to_string()).collect(),
            edges: edges
                .iter()
                .map(|(parent, child)| PresentationEdge {
                    parent: parent.to_string(),
                    child: child.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_alias_lookup_handles_full_uris() {
        let classifier = StatementClassifier::default();
        assert_eq!(
            classifier.classify(
                "ProfitLoss",
                Some("http://www.esma.europa.eu/xbrl/role/all/ias_1_role-310000"),
            ),
            Some(StatementCategory::IncomeStatement)
        );
        assert_eq!(
            classifier.classify("Assets", Some("ias_1_role-210000")),
            Some(StatementCategory::BalanceSheet)
        );
    }

    #[test]
    fn test_no_role_is_unresolvable_not_unclassified() {
        let classifier = StatementClassifier::default();
        assert_eq!(classifier.classify("NameOfParentEntity", None), None);
    }

    #[test]
    fn test_unknown_role_is_unclassified() {
        let classifier = StatementClassifier::default();
        assert_eq!(
            classifier.classify("SomeItem", Some("NotesToTheAccounts")),
            Some(StatementCategory::Unclassified)
        );
    }

    #[test]
    fn test_comprehensive_override_beats_alias() {
        let classifier = StatementClassifier::default();
        assert_eq!(
            classifier.classify("OtherComprehensiveIncomeNetOfTax", Some("ias_1_role-310000")),
            Some(StatementCategory::OtherComprehensiveIncomeAfterTax)
        );
        assert_eq!(
            classifier.classify("OtherComprehensiveIncomeBeforeTax", Some("ias_1_role-310000")),
            Some(StatementCategory::OtherComprehensiveIncomeBeforeTax)
        );
    }

    #[test]
    fn test_heuristic_matches_filer_named_role() {
        let roles = [role(
            "http://acme.example/role/FinansiellStallning",
            &["ifrs-full:StatementOfFinancialPositionAbstract"],
            &[
                ("ifrs-full:Assets", "ifrs-full:CurrentAssets"),
                ("ifrs-full:Assets", "ifrs-full:NoncurrentAssets"),
                ("ifrs-full:CurrentAssets", "ifrs-full:Inventories"),
                ("ifrs-full:EquityAndLiabilities", "ifrs-full:CurrentLiabilities"),
            ],
        )];
        let classifier = StatementClassifier::for_filing(&roles);

        assert_eq!(
            classifier.classify("Assets", Some("http://acme.example/role/FinansiellStallning")),
            Some(StatementCategory::BalanceSheet)
        );
    }

    #[test]
    fn test_best_role_tie_break_is_lexicographic() {
        let closure: BTreeSet<String> = ["ifrs-full:Assets", "ifrs-full:CurrentAssets"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let filer_closures = BTreeMap::from([
            ("role-b".to_string(), closure.clone()),
            ("role-a".to_string(), closure),
        ]);
        let reference = BTreeMap::from([(
            StatementCategory::BalanceSheet,
            ["ifrs-full:Assets", "ifrs-full:CurrentAssets"]
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<String>>(),
        )]);

        let best = best_roles_per_category(&filer_closures, &reference);
        assert_eq!(
            best.get(&StatementCategory::BalanceSheet).map(String::as_str),
            Some("role-a")
        );
    }

    #[test]
    fn test_no_overlap_yields_no_base_role() {
        let filer_closures = BTreeMap::from([(
            "role-x".to_string(),
            ["acme:SomethingCustom"]
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<String>>(),
        )]);
        let reference = BTreeMap::from([(
            StatementCategory::CashFlow,
            ["ifrs-full:CashFlowsFromUsedInOperatingActivities"]
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<String>>(),
        )]);

        assert!(best_roles_per_category(&filer_closures, &reference).is_empty());
    }
}
