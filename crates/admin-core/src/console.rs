//! The console context: every piece of state a running admin console needs,
//! owned by one value and driven through `&mut self`.
//!
//! Failures are posted as error notices and also returned, so an embedding
//! UI can ignore the `Result` while a CLI can stop on it.

use std::collections::HashMap;

use admin_model::{
    Action, DEFAULT_LIMIT, DisplayOptions, FilterInput, FilterOp, ObjectDescriptor,
    ObjectRegistry, OrderOp, PrimaryKey, SiteInfo, UserInfo,
};
use admin_widgets::{
    ControlEvent, Element, FilterControl, FilterKind, FilterRegistry, FilterSelection,
    WidgetRegistry,
};
use chrono::Local;

use crate::batch::{BatchReport, Progress, run_action};
use crate::error::{ConsoleError, Result};
use crate::hooks::{NoHooks, ObjectHooks};
use crate::notice::{Notice, Notices};
use crate::object::{ObjectApi, foreign_options, load_meta};
use crate::query::{Attach, QueryState};
use crate::session::{EditMode, EditSession};
use crate::transport::Transport;

static NO_HOOKS: NoHooks = NoHooks;

fn hooks_for<'a>(
    hooks: &'a HashMap<String, Box<dyn ObjectHooks>>,
    object: &str,
) -> &'a dyn ObjectHooks {
    match hooks.get(object) {
        Some(hooks) => hooks.as_ref(),
        None => &NO_HOOKS,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Rows requested per page.
    pub page_size: usize,
    pub display: DisplayOptions,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_LIMIT,
            display: DisplayOptions::default(),
        }
    }
}

/// An action waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub action: Action,
    pub keys: Vec<PrimaryKey>,
}

pub struct Console<T> {
    transport: T,
    options: ConsoleOptions,
    site: SiteInfo,
    user: UserInfo,
    objects: ObjectRegistry,
    widgets: WidgetRegistry,
    filters: FilterRegistry,
    hooks: HashMap<String, Box<dyn ObjectHooks>>,
    active: Option<ObjectDescriptor>,
    query: QueryState,
    filter_controls: Vec<FilterControl>,
    filter_selections: Vec<Option<FilterSelection>>,
    filter_options_loaded: bool,
    edit: Option<EditSession>,
    pending: Option<PendingAction>,
    notices: Notices,
}

impl<T: Transport> Console<T> {
    pub fn new(transport: T, options: ConsoleOptions) -> Self {
        let query = QueryState::with_limit(options.page_size);
        Self {
            transport,
            options,
            site: SiteInfo::default(),
            user: UserInfo::default(),
            objects: ObjectRegistry::default(),
            widgets: WidgetRegistry::new(),
            filters: FilterRegistry::new(),
            hooks: HashMap::new(),
            active: None,
            query,
            filter_controls: Vec::new(),
            filter_selections: Vec::new(),
            filter_options_loaded: false,
            edit: None,
            pending: None,
            notices: Notices::default(),
        }
    }

    /// Attach hooks to the object called `object`.
    pub fn set_hooks(&mut self, object: impl Into<String>, hooks: impl ObjectHooks + 'static) {
        self.hooks.insert(object.into(), Box::new(hooks));
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn options(&self) -> &ConsoleOptions {
        &self.options
    }

    pub fn site(&self) -> &SiteInfo {
        &self.site
    }

    pub fn user(&self) -> &UserInfo {
        &self.user
    }

    pub fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    pub fn widgets_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.widgets
    }

    pub fn filters_mut(&mut self) -> &mut FilterRegistry {
        &mut self.filters
    }

    pub fn active(&self) -> Option<&ObjectDescriptor> {
        self.active.as_ref()
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn edit(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn filter_controls(&self) -> &[FilterControl] {
        &self.filter_controls
    }

    /// Current pick of each filter control, parallel to
    /// [`Console::filter_controls`].
    pub fn filter_selections(&self) -> &[Option<FilterSelection>] {
        &self.filter_selections
    }

    /// The visible notice, if it has not expired.
    pub fn notice(&mut self) -> Option<&Notice> {
        self.notices.current()
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Fetch the console metadata and rebuild the object registry.
    pub async fn load(&mut self) -> Result<()> {
        let meta = match load_meta(&self.transport).await {
            Ok(meta) => meta,
            Err(err) => return Err(self.fail(err)),
        };
        self.site = meta.site;
        self.user = meta.user;
        self.objects = ObjectRegistry::from_specs(meta.objects);
        tracing::info!(site = %self.site.title(), objects = self.objects.len(), "console loaded");
        Ok(())
    }

    /// Make `name` the active object and fetch its first page.
    ///
    /// Switching to the object that is already active does nothing.
    pub async fn switch_object(&mut self, name: &str) -> Result<()> {
        let Some(object) = self.objects.get(name).cloned() else {
            return Err(self.fail(ConsoleError::UnknownObject(name.to_string())));
        };
        if self
            .active
            .as_ref()
            .is_some_and(|active| active.name == object.name)
        {
            return Ok(());
        }
        tracing::info!(object = %object.name, "switching object");
        self.close_edit();
        self.pending = None;
        self.query = QueryState::for_object(&object, self.options.page_size);

        let today = Local::now().date_naive();
        self.filter_controls = object
            .filterables()
            .map(|field| self.filters.control(field, today))
            .collect();
        self.filter_selections = vec![None; self.filter_controls.len()];
        self.filter_options_loaded = false;

        self.active = Some(object);
        self.refresh().await
    }

    /// Fetch the current page of the active object.
    pub async fn refresh(&mut self) -> Result<()> {
        let Some(object) = self.active.as_ref() else {
            return Err(self.fail(ConsoleError::NoActiveObject));
        };
        let hooks = hooks_for(&self.hooks, &object.name);
        let api = ObjectApi::new(&self.transport, object);

        // A position past the end is clamped once and fetched again.
        for _ in 0..2 {
            let mut form = self.query.build_query();
            if !hooks.prepare_query(object, &mut form) {
                tracing::debug!(object = %object.name, "query cancelled by hook");
                return Ok(());
            }
            let ticket = self.query.begin_fetch();
            let page = match api.query(&form).await {
                Ok(page) => page,
                Err(err) => {
                    self.query.fail_fetch(ticket);
                    self.notices
                        .error(format!("Query fail: {}", err.user_message()));
                    return Err(err);
                }
            };
            match self.query.attach(ticket, page, object) {
                Attach::Applied => {
                    let total = self.query.total();
                    hooks.prepare_result(object, self.query.rows_mut(), total);
                    self.query.recount();
                    tracing::debug!(object = %object.name, pos = self.query.pos(), count = self.query.count(), total, "page loaded");
                    return Ok(());
                }
                Attach::Stale => return Ok(()),
                Attach::Refetch => {
                    tracing::debug!(pos = self.query.pos(), "position past the end, fetching again");
                }
            }
        }
        Ok(())
    }

    /// Returns `false` without fetching on the last page.
    pub async fn next_page(&mut self) -> Result<bool> {
        if !self.query.next_page() {
            return Ok(false);
        }
        self.refresh().await.map(|()| true)
    }

    /// Returns `false` without fetching on the first page.
    pub async fn prev_page(&mut self) -> Result<bool> {
        if !self.query.prev_page() {
            return Ok(false);
        }
        self.refresh().await.map(|()| true)
    }

    pub async fn search(&mut self, keyword: &str) -> Result<()> {
        self.query.set_keyword(keyword.trim());
        self.refresh().await
    }

    /// Cycle the sort direction of `field` and fetch again.
    pub async fn toggle_order(&mut self, field: &str) -> Result<Option<OrderOp>> {
        let Some(op) = self.query.toggle_order(field) else {
            return Ok(None);
        };
        self.refresh().await.map(|()| Some(op))
    }

    pub async fn clear_order(&mut self, field: &str) -> Result<()> {
        if self.query.clear_order(field) {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Fill foreign-key filter controls from their lookup endpoints.
    ///
    /// A failed lookup is reported as a notice and leaves the other
    /// controls untouched.
    pub async fn load_filter_options(&mut self) -> Result<()> {
        let Some(object) = self.active.as_ref() else {
            return Err(self.fail(ConsoleError::NoActiveObject));
        };
        if self.filter_options_loaded {
            return Ok(());
        }
        for control in &mut self.filter_controls {
            if control.kind != FilterKind::Foreign {
                continue;
            }
            let Some(field) = object.field(&control.field) else {
                continue;
            };
            match foreign_options(&self.transport, field).await {
                Ok(items) => control.add_options(&items),
                Err(err) => {
                    tracing::warn!(field = %field.name, error = %err, "loading filter options failed");
                    self.notices.error(format!(
                        "Load {} options fail: {}",
                        field.label,
                        err.user_message()
                    ));
                }
            }
        }
        self.filter_options_loaded = true;
        Ok(())
    }

    /// Pick options of the filter control for `field` and fetch again.
    /// An empty pick clears that field's filter.
    pub async fn select_filter(
        &mut self,
        field: &str,
        picked: &[usize],
    ) -> Result<Option<FilterSelection>> {
        let index = self.filter_index(field)?;
        let selection = self.filter_controls[index].select(picked);
        self.set_filter_selection(index, selection).await
    }

    /// Type a value into a text or number filter control and fetch again.
    pub async fn enter_filter(
        &mut self,
        field: &str,
        op: Option<FilterOp>,
        input: &str,
    ) -> Result<Option<FilterSelection>> {
        let index = self.filter_index(field)?;
        let selection = self.filter_controls[index].enter(op, input);
        self.set_filter_selection(index, selection).await
    }

    pub async fn clear_filters(&mut self) -> Result<()> {
        self.filter_selections.iter_mut().for_each(|selection| *selection = None);
        self.query.set_filters(Vec::new());
        self.refresh().await
    }

    fn filter_index(&mut self, field: &str) -> Result<usize> {
        match self
            .filter_controls
            .iter()
            .position(|control| control.field == field)
        {
            Some(index) => Ok(index),
            None => Err(self.fail(ConsoleError::UnknownField(field.to_string()))),
        }
    }

    async fn set_filter_selection(
        &mut self,
        index: usize,
        selection: Option<FilterSelection>,
    ) -> Result<Option<FilterSelection>> {
        self.filter_selections[index] = selection.clone();
        let inputs: Vec<FilterInput> = self
            .filter_selections
            .iter()
            .flatten()
            .map(|selection| selection.input.clone())
            .collect();
        self.query.set_filters(inputs);
        self.refresh().await?;
        Ok(selection)
    }

    /// Returns `false` for an index outside the current page.
    pub fn toggle_row(&mut self, index: usize) -> bool {
        self.query.toggle_row(index)
    }

    pub fn toggle_all(&mut self) {
        self.query.toggle_all();
    }

    /// Select the whole result set rather than just the visible page.
    pub fn select_result(&mut self) {
        self.query.select_result();
        tracing::debug!(selected = self.query.selected(), "whole result selected");
    }

    /// Open a blank create form for the active object.
    pub fn open_create(&mut self) -> Result<&EditSession> {
        let Some(object) = self.active.as_ref() else {
            return Err(self.fail(ConsoleError::NoActiveObject));
        };
        let mut session = EditSession::create(object, &self.widgets);
        hooks_for(&self.hooks, &object.name).prepare_edit(object, &mut session);
        tracing::debug!(object = %object.name, "create form opened");
        Ok(&*self.edit.insert(session))
    }

    /// Open an edit form for the row at `index` of the current page.
    pub fn open_edit(&mut self, index: usize) -> Result<&EditSession> {
        let Some(object) = self.active.as_ref() else {
            return Err(self.fail(ConsoleError::NoActiveObject));
        };
        let Some(row) = self.query.rows().get(index) else {
            return Err(self.fail(ConsoleError::RowOutOfRange(index)));
        };
        let mut session = EditSession::edit(object, &self.widgets, row);
        hooks_for(&self.hooks, &object.name).prepare_edit(object, &mut session);
        tracing::debug!(object = %object.name, key = %row.key, "edit form opened");
        Ok(&*self.edit.insert(session))
    }

    /// Deliver a control event to a field of the open form. Returns whether
    /// the field is dirty afterwards.
    pub fn edit_event(&mut self, field: &str, event: ControlEvent) -> Result<bool> {
        let result = match self.edit.as_mut() {
            Some(session) => session.apply(field, event),
            None => Err(ConsoleError::NoEditSession),
        };
        result.map_err(|err| self.fail(err))
    }

    /// Load the options of every foreign-key field of the open form.
    pub async fn load_foreign_options(&mut self) -> Result<()> {
        let Some(session) = self.edit.as_mut() else {
            return Err(self.fail(ConsoleError::NoEditSession));
        };
        let fields: Vec<_> = session.pending_foreign().into_iter().cloned().collect();
        for field in fields {
            match foreign_options(&self.transport, &field).await {
                Ok(items) => {
                    session.apply(&field.name, ControlEvent::OptionsLoaded(items))?;
                }
                Err(err) => {
                    tracing::warn!(field = %field.name, error = %err, "loading foreign options failed");
                    self.notices.error(format!(
                        "Load {} options fail: {}",
                        field.label,
                        err.user_message()
                    ));
                }
            }
        }
        Ok(())
    }

    /// Submit the open form. `close` discards the form on success; otherwise
    /// it stays open in edit mode.
    ///
    /// A failed save keeps the form and its edits.
    pub async fn save(&mut self, close: bool) -> Result<()> {
        if let Err(err) = self.submit(close).await {
            self.notices
                .error(format!("Save Fail: {}", err.user_message()));
            return Err(err);
        }
        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "refresh after save failed");
        }
        self.notices.info("Save Done");
        Ok(())
    }

    async fn submit(&mut self, close: bool) -> Result<()> {
        let object = self.active.as_ref().ok_or(ConsoleError::NoActiveObject)?;
        let session = self.edit.as_mut().ok_or(ConsoleError::NoEditSession)?;
        let payload = session.payload()?;
        if let Some(name) = payload.withheld.iter().find(|name| {
            session
                .field(name)
                .is_some_and(|snapshot| snapshot.field.required)
        }) {
            return Err(ConsoleError::Rejected {
                field: name.clone(),
            });
        }
        for name in &payload.withheld {
            tracing::warn!(field = %name, "withholding value that does not match the field type");
        }

        let api = ObjectApi::new(&self.transport, object);
        let key = match (session.mode(), session.primary()) {
            (EditMode::Edit, Some(key)) => {
                let key = key.clone();
                api.save(&key, payload.values).await?;
                key
            }
            _ => {
                let record = api.create(payload.values).await?;
                object.primary_value(&record)
            }
        };

        if close {
            self.edit = None;
        } else {
            session.mark_saved(object, key);
        }
        Ok(())
    }

    pub fn close_edit(&mut self) {
        if self.edit.take().is_some() {
            tracing::debug!("edit form closed");
        }
    }

    /// Ask for confirmation of `action` over the selected rows.
    pub fn confirm_action(&mut self, action: &str) -> Result<&PendingAction> {
        match self.prepare_action(action) {
            Ok(pending) => Ok(&*self.pending.insert(pending)),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn prepare_action(&self, name: &str) -> Result<PendingAction> {
        let object = self.active.as_ref().ok_or(ConsoleError::NoActiveObject)?;
        let action = object
            .action(name)
            .cloned()
            .ok_or_else(|| ConsoleError::UnknownAction(name.to_string()))?;
        let keys = self.query.selected_keys();
        if keys.is_empty() {
            return Err(ConsoleError::NothingSelected);
        }
        Ok(PendingAction { action, keys })
    }

    /// Ask for confirmation of deleting the record of the open form.
    pub fn confirm_delete_one(&mut self) -> Result<&PendingAction> {
        match self.prepare_delete_one() {
            Ok(pending) => Ok(&*self.pending.insert(pending)),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn prepare_delete_one(&self) -> Result<PendingAction> {
        let object = self.active.as_ref().ok_or(ConsoleError::NoActiveObject)?;
        let key = self
            .edit
            .as_ref()
            .and_then(EditSession::primary)
            .cloned()
            .ok_or(ConsoleError::NoEditSession)?;
        let action = object
            .delete_action()
            .cloned()
            .unwrap_or_else(|| Action::delete(&object.path));
        Ok(PendingAction {
            action,
            keys: vec![key],
        })
    }

    pub fn cancel_confirm(&mut self) {
        self.pending = None;
    }

    /// Run the confirmed action. `progress` sees each step of a sequential
    /// run; a pending notice mirrors it.
    pub async fn execute_confirmed<F>(&mut self, mut progress: F) -> Result<BatchReport>
    where
        F: FnMut(Progress),
    {
        let Some(PendingAction { action, keys }) = self.pending.take() else {
            return Err(self.fail(ConsoleError::NoPendingAction));
        };
        self.close_edit();
        let Some(object) = self.active.as_ref() else {
            return Err(self.fail(ConsoleError::NoActiveObject));
        };
        let hooks = hooks_for(&self.hooks, &object.name);
        let api = ObjectApi::new(&self.transport, object);
        let notices = &mut self.notices;
        let result = run_action(&api, &action, &keys, hooks, |step| {
            notices.doing(step.to_string());
            progress(step);
        })
        .await;

        match result {
            Ok(report) => {
                self.notices.reset();
                self.query.clear_selection();
                self.notices
                    .info(format!("{} all records done", action.name));
                if let Err(err) = self.refresh().await {
                    tracing::warn!(error = %err, "refresh after action failed");
                }
                Ok(report)
            }
            Err(err) => {
                self.notices.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Read-only cells of the row at `index`, one per shown field.
    pub fn render_row(&self, index: usize) -> Option<Vec<Element>> {
        let object = self.active.as_ref()?;
        let row = self.query.rows().get(index)?;
        let cells = row
            .columns
            .iter()
            .filter_map(|column| {
                let field = object.field(&column.name)?;
                let mut cell = Element::new("td");
                self.widgets.widget_for(field).render(
                    &mut cell,
                    field,
                    &column.value,
                    &self.options.display,
                );
                Some(cell)
            })
            .collect();
        Some(cells)
    }

    /// Labels and controls of the open form.
    pub fn render_form(&self) -> Option<Element> {
        let session = self.edit.as_ref()?;
        let mut form = Element::new("form");
        for snapshot in session.fields() {
            let widget = snapshot.widget.widget();
            let mut label = Element::new("label");
            widget.render_label(&mut label, &snapshot.field, &snapshot.edit);
            let mut control = Element::new("div");
            widget.render_edit(&mut control, &snapshot.field, &snapshot.edit);
            form.push(
                Element::new("div")
                    .attr("data-field", snapshot.field.name.as_str())
                    .child(label)
                    .child(control),
            );
        }
        Some(form)
    }

    fn fail(&mut self, err: ConsoleError) -> ConsoleError {
        self.notices.error(err.user_message());
        err
    }
}

impl<T> std::fmt::Debug for Console<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("objects", &self.objects.len())
            .field("active", &self.active.as_ref().map(|object| &object.name))
            .field("query", &self.query)
            .field("edit", &self.edit.is_some())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
