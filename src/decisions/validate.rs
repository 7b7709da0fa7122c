//! Response validation.
//!
//! A response must have the shape the decision asked for, stay within its
//! bounds, and only mention offered options. Validation happens before
//! anything is applied, so a rejected response leaves the state untouched.

use std::collections::BTreeSet;

use super::decision::{DecisionAnswer, DecisionKind};
use crate::core::error::{EngineError, Result};
use crate::core::EntityId;

fn out_of_bounds(message: String) -> EngineError {
    EngineError::ResponseOutOfBounds(message)
}

fn check_count(what: &str, len: usize, min: usize, max: usize) -> Result<()> {
    if len < min || len > max {
        return Err(out_of_bounds(format!(
            "{what}: chose {len}, allowed {min}..={max}"
        )));
    }
    Ok(())
}

fn check_members(what: &str, chosen: &[EntityId], offered: &[EntityId]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for entity in chosen {
        if !offered.contains(entity) {
            return Err(out_of_bounds(format!("{what}: {entity} was not offered")));
        }
        if !seen.insert(*entity) {
            return Err(out_of_bounds(format!("{what}: {entity} chosen twice")));
        }
    }
    Ok(())
}

/// Check that `answer` is a valid response to `kind`.
pub fn validate_response(kind: &DecisionKind, answer: &DecisionAnswer) -> Result<()> {
    match (kind, answer) {
        (DecisionKind::ChooseTargets { legal, min, max }, DecisionAnswer::Targets(chosen)) => {
            check_count("targets", chosen.len(), *min, *max)?;
            check_members("targets", chosen, legal)
        }
        (
            DecisionKind::SelectCards {
                options, min, max, ..
            },
            DecisionAnswer::Cards(chosen),
        ) => {
            check_count("cards", chosen.len(), *min, *max)?;
            check_members("cards", chosen, options)
        }
        (DecisionKind::YesNo, DecisionAnswer::YesNo(_)) => Ok(()),
        (DecisionKind::ChooseMode { modes, min, max }, DecisionAnswer::Modes(chosen)) => {
            check_count("modes", chosen.len(), *min, *max)?;
            let mut seen = BTreeSet::new();
            for mode in chosen {
                if *mode >= modes.len() {
                    return Err(out_of_bounds(format!("mode {mode} does not exist")));
                }
                if !seen.insert(*mode) {
                    return Err(out_of_bounds(format!("mode {mode} chosen twice")));
                }
            }
            Ok(())
        }
        (DecisionKind::ChooseColor { options }, DecisionAnswer::Color(color)) => {
            if options.contains(color) {
                Ok(())
            } else {
                Err(out_of_bounds(format!("color {color} was not offered")))
            }
        }
        (DecisionKind::ChooseOption { options }, DecisionAnswer::Option(index)) => {
            if *index < options.len() {
                Ok(())
            } else {
                Err(out_of_bounds(format!(
                    "option {index} out of {} options",
                    options.len()
                )))
            }
        }
        (DecisionKind::ChooseNumber { min, max }, DecisionAnswer::Number(value)) => {
            if value >= min && value <= max {
                Ok(())
            } else {
                Err(out_of_bounds(format!("number {value} outside {min}..={max}")))
            }
        }
        (
            DecisionKind::DistributeAmount {
                total,
                targets,
                min_per_target,
            },
            DecisionAnswer::Distribution(amounts),
        ) => {
            for entity in amounts.keys() {
                if !targets.contains(entity) {
                    return Err(out_of_bounds(format!("{entity} is not a recipient")));
                }
            }
            for entity in targets {
                let amount = amounts.get(entity).copied().unwrap_or(0);
                if amount < *min_per_target {
                    return Err(out_of_bounds(format!(
                        "{entity} receives {amount}, minimum is {min_per_target}"
                    )));
                }
            }
            let sum = amounts
                .values()
                .try_fold(0u32, |acc, n| acc.checked_add(*n))
                .ok_or_else(|| out_of_bounds("distribution overflows".to_string()))?;
            if sum != *total {
                return Err(out_of_bounds(format!("distributed {sum}, must be {total}")));
            }
            Ok(())
        }
        (DecisionKind::OrderObjects { objects }, DecisionAnswer::Order(order)) => {
            check_count("order", order.len(), objects.len(), objects.len())?;
            check_members("order", order, objects)
        }
        (DecisionKind::SplitPiles { objects }, DecisionAnswer::FirstPile(pile)) => {
            check_members("pile", pile, objects)
        }
        (kind, answer) => Err(EngineError::InvalidResponse {
            expected: kind.name().to_string(),
            actual: answer.name().to_string(),
        }),
    }
}
