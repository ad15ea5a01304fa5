use num_rational::Ratio;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::NormalizeError;

use super::types::{ConceptType, FactValue, RawFact};

/// Reported decimals are clamped to this inclusive range before rounding.
const MAX_DECIMALS: i32 = 28;

/// Coerce a raw typed fact value into a normalized scalar.
///
/// Returns `Ok(None)` for facts that carry no usable value (absent or
/// tuple-typed concept, explicit nil); those are dropped downstream.
/// Malformed literals surface as a coercion error tagged with the concept
/// name, which the pipeline handles at fact granularity.
pub fn coerce(fact: &RawFact) -> Result<Option<FactValue>, NormalizeError> {
    let concept_type = match fact.concept_type {
        Some(ConceptType::Tuple) | None => return Ok(None),
        Some(t) => t,
    };

    if fact.is_nil {
        return Ok(None);
    }

    if concept_type == ConceptType::Fraction {
        return parse_fraction(fact).map(Some);
    }

    let val = match fact.value.as_deref() {
        Some(v) => v.trim(),
        None => return Ok(None),
    };

    if concept_type == ConceptType::Integer {
        let parsed = val
            .parse::<i64>()
            .map_err(|e| NormalizeError::coercion(&fact.name, format!("bad integer {val:?}: {e}")))?;
        return Ok(Some(FactValue::Integer(parsed)));
    }

    if concept_type.is_generic_numeric() {
        let parsed = Decimal::from_str(val)
            .map_err(|e| NormalizeError::coercion(&fact.name, format!("bad numeric {val:?}: {e}")))?;
        let dec = effective_decimals(fact.decimals.as_deref(), val)
            .map_err(|reason| NormalizeError::coercion(&fact.name, reason))?;
        return Ok(Some(FactValue::Decimal(round_to_decimals(parsed, dec))));
    }

    match concept_type {
        ConceptType::Date => {
            let parsed = chrono::NaiveDate::parse_from_str(val, "%Y-%m-%d").map_err(|e| {
                NormalizeError::coercion(&fact.name, format!("bad date {val:?}: {e}"))
            })?;
            Ok(Some(FactValue::Date(parsed)))
        }
        ConceptType::Boolean => {
            let truthy = val == "1" || val.eq_ignore_ascii_case("true");
            Ok(Some(FactValue::Bool(truthy)))
        }
        ConceptType::TextBlock => {
            let collapsed = val.split_whitespace().collect::<Vec<_>>().join(" ");
            Ok(Some(FactValue::Text(collapsed)))
        }
        _ => Ok(Some(FactValue::Text(val.to_string()))),
    }
}

fn parse_fraction(fact: &RawFact) -> Result<FactValue, NormalizeError> {
    let (num, den) = match (fact.numerator.as_deref(), fact.denominator.as_deref()) {
        (Some(n), Some(d)) => (n.trim(), d.trim()),
        _ => {
            return Err(NormalizeError::coercion(
                &fact.name,
                "fraction fact without numerator/denominator",
            ))
        }
    };

    let numerator = num
        .parse::<i128>()
        .map_err(|e| NormalizeError::coercion(&fact.name, format!("bad numerator {num:?}: {e}")))?;
    let denominator = den
        .parse::<i128>()
        .map_err(|e| NormalizeError::coercion(&fact.name, format!("bad denominator {den:?}: {e}")))?;

    if denominator == 0 {
        return Err(NormalizeError::coercion(&fact.name, "zero denominator"));
    }

    Ok(FactValue::Fraction(Ratio::new(numerator, denominator)))
}

/// Number of decimal places to round to: the declared decimals clamped to
/// [-28, 28], or, when the fact declares unbounded precision or no decimals
/// at all, the digit count after the decimal point in the literal.
fn effective_decimals(decimals: Option<&str>, literal: &str) -> Result<i32, String> {
    match decimals {
        None | Some("INF") => Ok(literal
            .split_once('.')
            .map(|(_, frac)| frac.len() as i32)
            .unwrap_or(0)),
        Some(raw) => {
            let parsed = raw
                .parse::<i32>()
                .map_err(|e| format!("bad decimals {raw:?}: {e}"))?;
            Ok(parsed.clamp(-MAX_DECIMALS, MAX_DECIMALS))
        }
    }
}

/// Round half away from zero to `dec` decimal places. Negative `dec`
/// rounds into the integer part, eg -3 rounds to thousands.
fn round_to_decimals(value: Decimal, dec: i32) -> Decimal {
    if dec >= 0 {
        value.round_dp_with_strategy(dec as u32, RoundingStrategy::MidpointAwayFromZero)
    } else {
        let factor = Decimal::from_i128_with_scale(10i128.pow((-dec) as u32), 0);
        let scaled = (value / factor).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        scaled * factor
    }
}
