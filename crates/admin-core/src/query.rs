//! List view state: paging, sorting, filtering and row selection.

use admin_model::{
    DEFAULT_LIMIT, Filter, FilterInput, ObjectDescriptor, Order, OrderOp, PrimaryKey, QueryForm,
    QueryResponse,
};
use serde_json::{Map, Value};

/// Sequence number of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// One shown field of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub value: Value,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: PrimaryKey,
    pub selected: bool,
    /// The record as returned by the backend.
    pub data: Map<String, Value>,
    /// One column per shown field, in display order.
    pub columns: Vec<Column>,
}

impl Row {
    pub fn build(object: &ObjectDescriptor, data: Map<String, Value>) -> Self {
        let columns = object
            .shows()
            .map(|field| Column {
                name: field.name.clone(),
                value: data.get(&field.name).cloned().unwrap_or(Value::Null),
                primary: field.primary,
            })
            .collect();
        Self {
            key: object.primary_value(&data),
            selected: false,
            data,
            columns,
        }
    }
}

/// What [`QueryState::attach`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    /// Rows were rebuilt from the response.
    Applied,
    /// A newer request was issued; the response was dropped.
    Stale,
    /// The position was past the end and has been moved to the last page;
    /// the caller should fetch again.
    Refetch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    keyword: String,
    pos: usize,
    limit: usize,
    total: usize,
    count: usize,
    filters: Vec<Filter>,
    orders: Vec<Order>,
    rows: Vec<Row>,
    selected: usize,
    last_ticket: u64,
    in_flight: Option<Ticket>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }
}

impl QueryState {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            keyword: String::new(),
            pos: 0,
            limit: limit.max(1),
            total: 0,
            count: 0,
            filters: Vec::new(),
            orders: Vec::new(),
            rows: Vec::new(),
            selected: 0,
            last_ticket: 0,
            in_flight: None,
        }
    }

    /// Fresh state for `object`: its default orders, then every other
    /// orderable field unsorted.
    pub fn for_object(object: &ObjectDescriptor, limit: usize) -> Self {
        let mut state = Self::with_limit(limit);
        state.orders = object.default_orders.clone();
        for field in object.orderables() {
            if !state.orders.iter().any(|order| order.name == field.name) {
                state.orders.push(Order::new(field.name.clone(), OrderOp::None));
            }
        }
        state
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of rows in the current page.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// One-based position of the first row, zero for an empty page.
    pub fn first_index(&self) -> usize {
        if self.count == 0 { 0 } else { self.pos + 1 }
    }

    /// Advance one page. Returns `false` (no-op) on the last page.
    pub fn next_page(&mut self) -> bool {
        let pos = self.pos.saturating_add(self.limit);
        if pos >= self.total {
            return false;
        }
        self.pos = pos;
        true
    }

    /// Go back one page. Returns `false` (no-op) on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos = self.pos.saturating_sub(self.limit);
        true
    }

    /// Replace the search keyword and go back to the first page.
    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
        self.pos = 0;
    }

    /// Replace all filters; groups contribute their clauses in order.
    pub fn set_filters<I>(&mut self, inputs: I)
    where
        I: IntoIterator<Item = FilterInput>,
    {
        self.filters = FilterInput::flatten(inputs);
        self.pos = 0;
    }

    pub fn order_op(&self, name: &str) -> Option<OrderOp> {
        self.orders
            .iter()
            .find(|order| order.name == name)
            .map(|order| order.op)
    }

    /// Cycle the sort direction of `name`. Returns the new direction, or
    /// `None` when the field is not orderable.
    pub fn toggle_order(&mut self, name: &str) -> Option<OrderOp> {
        let Some(order) = self.orders.iter_mut().find(|order| order.name == name) else {
            tracing::warn!(field = %name, "order field not found");
            return None;
        };
        order.op = order.op.toggled();
        Some(order.op)
    }

    /// Make `name` unsorted. Returns `false` when the field is not orderable.
    pub fn clear_order(&mut self, name: &str) -> bool {
        match self.orders.iter_mut().find(|order| order.name == name) {
            Some(order) => {
                order.op = OrderOp::None;
                true
            }
            None => false,
        }
    }

    pub fn build_query(&self) -> QueryForm {
        QueryForm {
            keyword: self.keyword.clone(),
            pos: self.pos,
            limit: self.limit,
            filters: self.filters.clone(),
            orders: self.orders.clone(),
        }
    }

    /// Start a fetch: rows are cleared until the response is attached.
    pub fn begin_fetch(&mut self) -> Ticket {
        self.last_ticket += 1;
        let ticket = Ticket(self.last_ticket);
        self.in_flight = Some(ticket);
        self.rows.clear();
        self.count = 0;
        self.selected = 0;
        ticket
    }

    /// Forget a failed fetch so the state no longer reports loading.
    pub fn fail_fetch(&mut self, ticket: Ticket) {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.last_ticket
    }

    /// Apply a response. Only the most recently issued ticket is accepted.
    pub fn attach(&mut self, ticket: Ticket, page: QueryResponse, object: &ObjectDescriptor) -> Attach {
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, latest = self.last_ticket, "discarding stale response");
            return Attach::Stale;
        }
        self.in_flight = None;
        self.pos = page.pos;
        self.total = page.total;
        if page.limit > 0 {
            self.limit = page.limit;
        }
        if self.total > 0 && self.pos >= self.total {
            self.pos = (self.total - 1) / self.limit * self.limit;
            self.rows.clear();
            self.count = 0;
            self.selected = 0;
            return Attach::Refetch;
        }
        self.rows = page
            .items
            .into_iter()
            .map(|item| Row::build(object, item))
            .collect();
        self.count = self.rows.len();
        self.selected = 0;
        Attach::Applied
    }

    /// Flip the selection of one row. Returns `false` for a bad index.
    pub fn toggle_row(&mut self, index: usize) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        row.selected = !row.selected;
        self.recount();
        true
    }

    /// Select every row, or clear the selection when all are selected.
    pub fn toggle_all(&mut self) {
        let select = !self.rows.iter().all(|row| row.selected) || self.rows.is_empty();
        for row in &mut self.rows {
            row.selected = select;
        }
        self.recount();
    }

    /// Select every row of the page and report the whole result as
    /// selected. Keys still come from the page's rows; the next toggle
    /// recounts from them.
    pub fn select_result(&mut self) {
        for row in &mut self.rows {
            row.selected = true;
        }
        self.selected = if self.rows.is_empty() {
            0
        } else {
            self.total.max(self.rows.len())
        };
    }

    pub fn clear_selection(&mut self) {
        for row in &mut self.rows {
            row.selected = false;
        }
        self.recount();
    }

    pub fn selected_keys(&self) -> Vec<PrimaryKey> {
        self.rows
            .iter()
            .filter(|row| row.selected)
            .map(|row| row.key.clone())
            .collect()
    }

    pub(crate) fn recount(&mut self) {
        self.selected = self.rows.iter().filter(|row| row.selected).count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_model::ObjectSpec;
    use serde_json::json;

    fn object() -> ObjectDescriptor {
        let spec: ObjectSpec = serde_json::from_value(json!({
            "name": "User",
            "path": "/admin/user/",
            "fields": [
                {"name": "id", "type": "uint", "primary": true},
                {"name": "email", "type": "string"},
                {"name": "age", "type": "int"}
            ],
            "shows": ["id", "email"],
            "orderables": ["id", "age"],
            "orders": [{"name": "age", "op": "desc"}],
            "primaryKeys": ["id"]
        }))
        .unwrap();
        ObjectDescriptor::from_spec(spec)
    }

    fn page(pos: usize, total: usize, ids: &[u64]) -> QueryResponse {
        QueryResponse {
            pos,
            total,
            limit: 0,
            keyword: String::new(),
            items: ids
                .iter()
                .map(|id| json!({"id": id, "email": format!("u{id}@x")}).as_object().cloned().unwrap())
                .collect(),
        }
    }

    #[test]
    fn paging_example() {
        let mut state = QueryState::default();
        state.total = 45;
        assert!(state.next_page());
        assert_eq!(state.pos(), 20);
        assert!(state.next_page());
        assert_eq!(state.pos(), 40);
        assert!(!state.next_page());
        assert_eq!(state.pos(), 40);
        assert!(state.prev_page());
        assert!(state.prev_page());
        assert!(!state.prev_page());
        assert_eq!(state.pos(), 0);
    }

    #[test]
    fn next_page_saturates() {
        let mut state = QueryState::with_limit(usize::MAX);
        state.total = 45;
        state.pos = 1;
        assert!(!state.next_page());
        assert_eq!(state.pos(), 1);
    }

    #[test]
    fn orders_seeded_from_object() {
        let state = QueryState::for_object(&object(), 20);
        assert_eq!(
            state.orders(),
            [Order::new("age", OrderOp::Desc), Order::new("id", OrderOp::None)]
        );
    }

    #[test]
    fn toggle_cycle_and_clear() {
        let mut state = QueryState::for_object(&object(), 20);
        let ops: Vec<OrderOp> = (0..3).filter_map(|_| state.toggle_order("id")).collect();
        assert_eq!(ops, vec![OrderOp::Asc, OrderOp::Desc, OrderOp::Asc]);
        assert!(state.clear_order("id"));
        assert_eq!(state.order_op("id"), Some(OrderOp::None));
        assert_eq!(state.toggle_order("email"), None);
    }

    #[test]
    fn attach_builds_rows() {
        let object = object();
        let mut state = QueryState::for_object(&object, 20);
        let ticket = state.begin_fetch();
        assert!(state.is_loading());
        assert_eq!(state.attach(ticket, page(0, 2, &[1, 2]), &object), Attach::Applied);
        assert!(!state.is_loading());
        assert_eq!(state.count(), 2);
        assert_eq!(state.first_index(), 1);
        let row = &state.rows()[1];
        assert_eq!(row.key, PrimaryKey::new().with("id", 2));
        assert_eq!(row.columns.len(), 2);
        assert_eq!(row.columns[1].value, json!("u2@x"));
        assert!(row.columns[0].primary);
    }

    #[test]
    fn stale_response_is_discarded() {
        let object = object();
        let mut state = QueryState::for_object(&object, 20);
        let first = state.begin_fetch();
        let second = state.begin_fetch();
        assert_eq!(state.attach(first, page(0, 1, &[1]), &object), Attach::Stale);
        assert_eq!(state.count(), 0);
        assert_eq!(state.attach(second, page(0, 2, &[7, 8]), &object), Attach::Applied);
        assert_eq!(state.rows()[0].key, PrimaryKey::new().with("id", 7));
    }

    #[test]
    fn position_past_end_is_clamped() {
        let object = object();
        let mut state = QueryState::for_object(&object, 20);
        let ticket = state.begin_fetch();
        assert_eq!(state.attach(ticket, page(40, 25, &[]), &object), Attach::Refetch);
        assert_eq!(state.pos(), 20);
    }

    #[test]
    fn selection_toggles() {
        let object = object();
        let mut state = QueryState::for_object(&object, 20);
        let ticket = state.begin_fetch();
        state.attach(ticket, page(0, 3, &[1, 2, 3]), &object);
        assert!(state.toggle_row(1));
        assert!(!state.toggle_row(9));
        assert_eq!(state.selected(), 1);
        state.toggle_all();
        assert_eq!(state.selected(), 3);
        state.toggle_all();
        assert_eq!(state.selected(), 0);
        state.toggle_row(2);
        assert_eq!(state.selected_keys(), vec![PrimaryKey::new().with("id", 3)]);
    }

    #[test]
    fn select_result_counts_every_match() {
        let object = object();
        let mut state = QueryState::for_object(&object, 20);
        state.select_result();
        assert_eq!(state.selected(), 0);

        let ticket = state.begin_fetch();
        state.attach(ticket, page(0, 45, &[1, 2, 3]), &object);
        state.select_result();
        assert_eq!(state.selected(), 45);
        assert!(state.rows().iter().all(|row| row.selected));
        assert_eq!(state.selected_keys().len(), 3);

        state.toggle_row(0);
        assert_eq!(state.selected(), 2);
    }

    #[test]
    fn filters_flatten_and_reset_position() {
        let mut state = QueryState::default();
        state.total = 100;
        state.next_page();
        state.set_filters([
            FilterInput::group(vec![
                Filter::new("created", admin_model::FilterOp::GreaterOrEqual, "a"),
                Filter::new("created", admin_model::FilterOp::LessOrEqual, "b"),
            ]),
            Filter::new("enabled", admin_model::FilterOp::Equal, true).into(),
        ]);
        assert_eq!(state.filters().len(), 3);
        assert_eq!(state.pos(), 0);
        let form = state.build_query();
        assert_eq!(form.filters[2].name, "enabled");
        assert_eq!(form.limit, 20);
    }
}
