use esef_normalizer::xbrl::{clean_records, process_filing, FilingData, StatementCategory};
use serde_json::json;

fn filing_from_json(value: serde_json::Value) -> FilingData {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_income_statement_scenario() {
    let filing = filing_from_json(json!({
        "facts": [
            {
                "prefix": "ifrs-full",
                "name": "ProfitLoss",
                "conceptType": "monetary",
                "value": "1000000",
                "decimals": "-3",
                "balance": "credit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR",
                "role": "ias_1_role-310000"
            },
            {
                "prefix": "ifrs-full",
                "name": "IncomeTaxExpenseContinuingOperations",
                "conceptType": "monetary",
                "value": "200000",
                "decimals": "-3",
                "balance": "debit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR",
                "role": "ias_1_role-310000"
            }
        ],
        "calculationEdges": [
            {
                "parent": "ifrs-full:ProfitLoss",
                "child": "ifrs-full:IncomeTaxExpenseContinuingOperations"
            }
        ]
    }));

    let processed = process_filing(&filing).unwrap();
    assert_eq!(processed.records.len(), 2);
    assert_eq!(processed.skipped_facts, 0);

    let profit = &processed.records[0];
    assert_eq!(profit.xml_name, "ProfitLoss");
    assert_eq!(
        profit.statement_category,
        Some(StatementCategory::IncomeStatement)
    );
    assert_eq!(profit.value.to_string(), "1000000");
    assert!(profit.is_total);
    assert_eq!(profit.period_end.to_string(), "2022-12-31");

    let tax = &processed.records[1];
    assert_eq!(
        tax.statement_category,
        Some(StatementCategory::IncomeStatement)
    );
    assert_eq!(tax.value.to_string(), "-200000");
    assert_eq!(tax.xml_name_parent.as_deref(), Some("ProfitLoss"));
    assert!(!tax.is_total);
}

#[test]
fn test_oci_override_inside_income_statement_role() {
    let filing = filing_from_json(json!({
        "facts": [
            {
                "prefix": "ifrs-full",
                "name": "OtherComprehensiveIncomeNetOfTax",
                "conceptType": "monetary",
                "value": "5000",
                "decimals": "0",
                "balance": "credit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR",
                "role": "ias_1_role-310000"
            }
        ]
    }));

    let processed = process_filing(&filing).unwrap();
    let record = &processed.records[0];
    assert_eq!(
        record.statement_category,
        Some(StatementCategory::OtherComprehensiveIncomeAfterTax)
    );
    assert!(record
        .statement_category
        .unwrap()
        .is_other_comprehensive_income());
}

#[test]
fn test_anchor_fallback_and_extension_flag() {
    let filing = filing_from_json(json!({
        "facts": [
            {
                "prefix": "acme",
                "name": "TicketIncome",
                "conceptType": "monetary",
                "value": "700",
                "decimals": "0",
                "balance": "credit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR"
            },
            {
                "prefix": "acme",
                "name": "UnanchoredItem",
                "conceptType": "monetary",
                "value": "300",
                "decimals": "0",
                "balance": "credit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR"
            }
        ],
        "anchorEdges": [
            { "wider": "ifrs-full:Revenue", "narrower": "acme:TicketIncome" }
        ]
    }));

    let processed = process_filing(&filing).unwrap();

    let anchored = &processed.records[0];
    assert!(anchored.is_extension);
    assert_eq!(anchored.wider_anchor.as_deref(), Some("Revenue"));
    assert_eq!(anchored.wider_anchor_or_xml_name, "Revenue");
    // No role anywhere: the fact is unresolvable, not unclassified.
    assert_eq!(anchored.statement_category, None);

    let unanchored = &processed.records[1];
    assert_eq!(unanchored.wider_anchor, None);
    assert_eq!(unanchored.wider_anchor_or_xml_name, "UnanchoredItem");
}

#[test]
fn test_cyclic_calculation_graph_is_filing_fatal() {
    let filing = filing_from_json(json!({
        "facts": [],
        "calculationEdges": [
            { "parent": "a:One", "child": "a:Two" },
            { "parent": "a:Two", "child": "a:One" }
        ]
    }));

    assert!(process_filing(&filing).is_err());
}

#[test]
fn test_malformed_value_skips_only_that_fact() {
    let filing = filing_from_json(json!({
        "facts": [
            {
                "prefix": "ifrs-full",
                "name": "Revenue",
                "conceptType": "monetary",
                "value": "not-a-number",
                "decimals": "0",
                "balance": "credit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR"
            },
            {
                "prefix": "ifrs-full",
                "name": "CostOfSales",
                "conceptType": "monetary",
                "value": "400",
                "decimals": "0",
                "balance": "debit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR"
            }
        ]
    }));

    let processed = process_filing(&filing).unwrap();
    assert_eq!(processed.skipped_facts, 1);
    assert_eq!(processed.records.len(), 1);
    assert_eq!(processed.records[0].xml_name, "CostOfSales");
}

#[test]
fn test_zero_and_duplicate_filtering() {
    let filing = filing_from_json(json!({
        "facts": [
            {
                "prefix": "ifrs-full",
                "name": "Revenue",
                "conceptType": "monetary",
                "value": "0",
                "decimals": "0",
                "balance": "credit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR"
            },
            {
                "prefix": "ifrs-full",
                "name": "Revenue",
                "conceptType": "monetary",
                "value": "500",
                "decimals": "0",
                "balance": "credit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR"
            },
            {
                "prefix": "ifrs-full",
                "name": "Revenue",
                "conceptType": "monetary",
                "value": "500",
                "decimals": "0",
                "balance": "credit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR"
            }
        ]
    }));

    let processed = process_filing(&filing).unwrap();
    assert_eq!(processed.records.len(), 3);

    let cleaned = clean_records(processed.records, 2020);
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].value.to_string(), "500");
    // Last-seen duplicate survives.
    assert_eq!(cleaned[0].sort_key, 2);

    // A second pass removes nothing further.
    let again = clean_records(cleaned.clone(), 2020);
    assert_eq!(again, cleaned);
}

#[test]
fn test_legal_name_flows_into_records() {
    let filing = filing_from_json(json!({
        "facts": [
            {
                "prefix": "ifrs-full",
                "name": "NameOfParentEntity",
                "conceptType": "other",
                "value": "Acme Group AB",
                "entityId": "549300ABCDEFGHIJKL12"
            },
            {
                "prefix": "ifrs-full",
                "name": "Revenue",
                "conceptType": "monetary",
                "value": "500",
                "decimals": "0",
                "balance": "credit",
                "periodEnd": "2023-01-01T00:00:00",
                "entityId": "549300ABCDEFGHIJKL12",
                "currency": "EUR"
            }
        ]
    }));

    let processed = process_filing(&filing).unwrap();
    // The name fact itself has no period and is dropped.
    assert_eq!(processed.records.len(), 1);
    assert_eq!(
        processed.records[0].legal_name.as_deref(),
        Some("Acme Group AB")
    );
}
