//! Today's focus goals: a short, ordered checklist kept in the kv table.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::storage::Database;

const FOCUS_GOALS_KEY: &str = "focus_goals";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusGoal {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// The persisted goal list. Goals are addressed by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusGoals {
    goals: Vec<FocusGoal>,
}

impl FocusGoals {
    pub fn load(db: &Database) -> Result<Self, CoreError> {
        match db.kv_get(FOCUS_GOALS_KEY)? {
            Some(json) => Ok(Self {
                goals: serde_json::from_str(&json)?,
            }),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, db: &Database) -> Result<(), CoreError> {
        db.kv_set(FOCUS_GOALS_KEY, &serde_json::to_string(&self.goals)?)?;
        Ok(())
    }

    pub fn goals(&self) -> &[FocusGoal] {
        &self.goals
    }

    /// Append a goal. Surrounding whitespace is trimmed; blank text is rejected.
    pub fn add(&mut self, text: &str) -> Result<&FocusGoal, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "text".to_string(),
                message: "focus goal cannot be empty".to_string(),
            });
        }
        self.goals.push(FocusGoal {
            text: text.to_string(),
            completed: false,
        });
        Ok(&self.goals[self.goals.len() - 1])
    }

    /// Flip the completed flag; returns the new state.
    pub fn toggle(&mut self, index: usize) -> Result<bool, ValidationError> {
        let len = self.goals.len();
        let goal = self.goals.get_mut(index).ok_or(ValidationError::OutOfBounds {
            collection: "focus_goals".to_string(),
            index,
            len,
        })?;
        goal.completed = !goal.completed;
        Ok(goal.completed)
    }

    pub fn remove(&mut self, index: usize) -> Result<FocusGoal, ValidationError> {
        if index >= self.goals.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "focus_goals".to_string(),
                index,
                len: self.goals.len(),
            });
        }
        Ok(self.goals.remove(index))
    }
}
