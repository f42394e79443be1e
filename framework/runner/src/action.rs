use std::collections::HashSet;

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;

use crate::context::UserValuesConstraint;
use crate::definition::{AgentHookMut, DefinitionError};

/// A named unit of work that agents pick between on every cycle.
pub struct Action<RV: UserValuesConstraint, V: UserValuesConstraint> {
    name: String,
    weight: u32,
    behaviour: AgentHookMut<RV, V>,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> Action<RV, V> {
    pub(crate) fn new(name: &str, weight: u32, behaviour: AgentHookMut<RV, V>) -> Self {
        Self {
            name: name.to_string(),
            weight,
            behaviour,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn behaviour(&self) -> AgentHookMut<RV, V> {
        self.behaviour
    }
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> Clone for Action<RV, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            weight: self.weight,
            behaviour: self.behaviour,
        }
    }
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> std::fmt::Debug for Action<RV, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

/// The validated, non-empty set of actions for a scenario, in registration order.
pub struct ActionSet<RV: UserValuesConstraint, V: UserValuesConstraint> {
    actions: Vec<Action<RV, V>>,
    index: WeightedIndex<u32>,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> ActionSet<RV, V> {
    pub(crate) fn new(actions: Vec<Action<RV, V>>) -> Result<Self, DefinitionError> {
        if actions.is_empty() {
            return Err(DefinitionError::NoActions);
        }

        let mut seen = HashSet::new();
        for action in &actions {
            if !seen.insert(action.name.as_str()) {
                return Err(DefinitionError::DuplicateAction {
                    name: action.name.clone(),
                });
            }
            if action.weight == 0 {
                return Err(DefinitionError::ZeroWeight {
                    name: action.name.clone(),
                });
            }
        }

        actions
            .iter()
            .try_fold(0u32, |total, action| total.checked_add(action.weight))
            .ok_or(DefinitionError::WeightOverflow)?;

        let index = WeightedIndex::new(actions.iter().map(|action| action.weight)).map_err(
            |e| match e {
                WeightedError::NoItem => DefinitionError::NoActions,
                _ => DefinitionError::WeightOverflow,
            },
        )?;

        Ok(Self { actions, index })
    }

    /// Pick the next action, each with probability proportional to its weight.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &Action<RV, V> {
        &self.actions[self.index.sample(rng)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action<RV, V>> {
        self.actions.iter()
    }
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> Clone for ActionSet<RV, V> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            index: self.index.clone(),
        }
    }
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> std::fmt::Debug for ActionSet<RV, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.actions.iter()).finish()
    }
}
