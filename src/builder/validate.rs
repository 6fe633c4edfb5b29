//! Structural validation of machine definitions.
//!
//! Uses Stillwater's `Validation` so a definition reports every problem in a
//! single pass instead of stopping at the first one.

use crate::builder::error::DefinitionError;
use crate::core::{Context, StateNode, Trigger};
use indexmap::IndexMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<DefinitionError>>;

/// Check that the initial state exists, no state is declared twice, and
/// every transition targets a declared state.
pub(crate) fn validate_definition<C: Context>(
    initial: &str,
    states: &IndexMap<String, StateNode<C>>,
    duplicates: &[String],
) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    checks.push(if states.contains_key(initial) {
        Validation::success(())
    } else {
        Validation::fail(DefinitionError::UnknownInitialState {
            name: initial.to_string(),
        })
    });

    for name in duplicates {
        checks.push(Validation::fail(DefinitionError::DuplicateState {
            name: name.clone(),
        }));
    }

    for (name, node) in states {
        for transition in node.transitions() {
            if states.contains_key(transition.target()) {
                continue;
            }
            let trigger = match transition.trigger() {
                Trigger::Event(event) => event.clone(),
                Trigger::Immediate => "<immediate>".to_string(),
            };
            checks.push(Validation::fail(DefinitionError::UnknownTarget {
                state: name.clone(),
                trigger,
                target: transition.target().to_string(),
            }));
        }
    }

    Validation::all_vec(checks).map(|_| ())
}
