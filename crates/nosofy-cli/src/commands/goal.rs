use clap::Subcommand;
use nosofy_core::{Database, FocusGoals};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Add a focus goal for today
    Add {
        /// Goal text
        text: String,
    },
    /// List focus goals
    List,
    /// Flip a goal between done and not done
    Toggle {
        /// Zero-based position in the list
        index: usize,
    },
    /// Remove a goal
    Delete {
        /// Zero-based position in the list
        index: usize,
    },
}

pub fn run(action: GoalAction) -> CmdResult {
    let db = Database::open()?;
    let mut goals = FocusGoals::load(&db)?;

    match action {
        GoalAction::Add { text } => {
            print_json(goals.add(&text)?)?;
            goals.save(&db)?;
        }
        GoalAction::List => print_json(&goals.goals())?,
        GoalAction::Toggle { index } => {
            goals.toggle(index)?;
            goals.save(&db)?;
            print_json(&goals.goals()[index])?;
        }
        GoalAction::Delete { index } => {
            let removed = goals.remove(index)?;
            goals.save(&db)?;
            print_json(&removed)?;
        }
    }
    Ok(())
}
