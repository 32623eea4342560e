//! Running an action over a set of selected rows.

use std::fmt;

use admin_model::{Action, PrimaryKey};

use crate::error::{ConsoleError, Result};
use crate::hooks::ObjectHooks;
use crate::object::{ActionOutcome, Download, ObjectApi};
use crate::transport::Transport;

/// Position within a sequential action, shown as `i/n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// One-based index of the request being sent.
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// Outcome of a fully completed action.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub action: String,
    /// Number of requests sent.
    pub completed: usize,
    pub outcomes: Vec<ActionOutcome>,
}

impl BatchReport {
    pub fn downloads(&self) -> impl Iterator<Item = &Download> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ActionOutcome::Download(download) => Some(download),
            ActionOutcome::Json(_) => None,
        })
    }
}

/// Run `action` for `keys`.
///
/// Batch actions send one request carrying every key. Other actions send one
/// request per key, in order, and stop at the first failure; the error
/// reports how many keys completed.
pub async fn run_action<T, F>(
    api: &ObjectApi<'_, T>,
    action: &Action,
    keys: &[PrimaryKey],
    hooks: &dyn ObjectHooks,
    mut progress: F,
) -> Result<BatchReport>
where
    T: Transport,
    F: FnMut(Progress),
{
    if action.batch {
        progress(Progress { current: 1, total: 1 });
        let outcome = match api.batch_action(action, keys).await {
            Ok(outcome) => outcome,
            Err(err) => return Err(abort(action, keys, hooks, &err, 0, 1)),
        };
        hooks.on_action_done(action, keys, &outcome);
        return Ok(BatchReport {
            action: action.name.clone(),
            completed: 1,
            outcomes: vec![outcome],
        });
    }

    let total = keys.len();
    let mut outcomes = Vec::with_capacity(total);
    for (index, key) in keys.iter().enumerate() {
        progress(Progress {
            current: index + 1,
            total,
        });
        let outcome = match api.action(action, key).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let key = std::slice::from_ref(key);
                return Err(abort(action, key, hooks, &err, index, total - index));
            }
        };
        hooks.on_action_done(action, std::slice::from_ref(key), &outcome);
        outcomes.push(outcome);
    }
    tracing::info!(action = %action.name, count = total, "action completed");
    Ok(BatchReport {
        action: action.name.clone(),
        completed: total,
        outcomes,
    })
}

fn abort(
    action: &Action,
    keys: &[PrimaryKey],
    hooks: &dyn ObjectHooks,
    err: &ConsoleError,
    completed: usize,
    remaining: usize,
) -> ConsoleError {
    let message = match err {
        ConsoleError::Api { message, .. } => message.clone(),
        other => other.to_string(),
    };
    tracing::warn!(action = %action.name, completed, remaining, error = %message, "action aborted");
    hooks.on_action_fail(action, keys, &message);
    ConsoleError::BatchAborted {
        action: action.name.clone(),
        message,
        completed,
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_reads_as_fraction() {
        assert_eq!(Progress { current: 2, total: 3 }.to_string(), "2/3");
    }

    #[test]
    fn report_lists_downloads() {
        let report = BatchReport {
            action: "Export".to_string(),
            completed: 2,
            outcomes: vec![
                ActionOutcome::Json(serde_json::Value::Null),
                ActionOutcome::Download(Download {
                    filename: "users.csv".to_string(),
                    bytes: b"id\n1\n".to_vec(),
                }),
            ],
        };
        let names: Vec<&str> = report.downloads().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["users.csv"]);
    }
}
