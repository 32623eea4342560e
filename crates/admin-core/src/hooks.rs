//! Per-object extension points.

use admin_model::{Action, ObjectDescriptor, PrimaryKey, QueryForm};

use crate::object::ActionOutcome;
use crate::query::Row;
use crate::session::EditSession;

/// Customizes how the console drives one object. Every hook defaults to a
/// no-op.
pub trait ObjectHooks: Send + Sync {
    /// Rewrite the query before it is sent. Returning `false` cancels the
    /// fetch without any notice.
    fn prepare_query(&self, _object: &ObjectDescriptor, _form: &mut QueryForm) -> bool {
        true
    }

    /// Adjust freshly built rows before they are shown.
    fn prepare_result(&self, _object: &ObjectDescriptor, _rows: &mut [Row], _total: usize) {}

    /// Adjust a freshly opened edit form.
    fn prepare_edit(&self, _object: &ObjectDescriptor, _session: &mut EditSession) {}

    /// Called after each successful action request.
    fn on_action_done(&self, _action: &Action, _keys: &[PrimaryKey], _outcome: &ActionOutcome) {}

    /// Called once when an action request fails, with the failure message.
    fn on_action_fail(&self, _action: &Action, _keys: &[PrimaryKey], _message: &str) {}
}

/// Hooks used for objects without registered hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ObjectHooks for NoHooks {}
