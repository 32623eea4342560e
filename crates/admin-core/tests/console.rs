//! Console behavior against an in-memory backend.

use std::future::Future;
use std::sync::{Arc, Mutex};

use admin_core::{
    ApiRequest, ApiResponse, Attach, Console, ConsoleError, ConsoleOptions, EditMode, NoticeLevel,
    ObjectHooks, QueryState, Result, Row, Transport,
};
use admin_model::{
    Method, ObjectDescriptor, ObjectSpec, OrderOp, PrimaryKey, QueryForm, QueryResponse,
};
use admin_widgets::ControlEvent;
use proptest::prelude::*;
use serde_json::{Value, json};

type Override = Box<dyn Fn(&ApiRequest) -> Option<ApiResponse> + Send + Sync>;

/// Records every request and answers like a small admin backend.
struct MockBackend {
    total: usize,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
    overrides: Override,
}

impl MockBackend {
    fn respond(&self, request: &ApiRequest) -> ApiResponse {
        if let Some(response) = (self.overrides)(request) {
            return response;
        }
        let body = request.body.clone().unwrap_or(Value::Null);
        match (request.method, request.path.as_str()) {
            (Method::Post, "./admin.json") => ApiResponse::json(&meta()),
            (Method::Post, "/admin/user/") => {
                let form: QueryForm = serde_json::from_value(body).unwrap();
                let end = (form.pos + form.limit).min(self.total);
                let items: Vec<Value> = (form.pos..end).map(|n| user(n as u64 + 1)).collect();
                ApiResponse::json(&json!({
                    "pos": form.pos,
                    "total": self.total,
                    "limit": form.limit,
                    "items": items
                }))
            }
            (Method::Post, "/admin/group/") => ApiResponse::json(&json!({
                "items": [{"value": 1, "label": "Staff"}, {"value": 2, "label": "Admin"}]
            })),
            (Method::Put, "/admin/user/") => {
                let mut record = body.as_object().cloned().unwrap_or_default();
                record.insert("id".to_string(), json!(99));
                ApiResponse::json(&Value::Object(record))
            }
            _ => ApiResponse::json(&json!({})),
        }
    }
}

impl Transport for MockBackend {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send {
        let response = self.respond(&request);
        self.requests.lock().unwrap().push(request);
        async move { Ok(response) }
    }
}

fn failure(status: u16, status_text: &str, body: &str) -> ApiResponse {
    ApiResponse {
        status,
        status_text: status_text.to_string(),
        content_disposition: None,
        body: body.as_bytes().to_vec(),
    }
}

fn meta() -> Value {
    json!({
        "site": {"sitename": "Carrot", "slogan": "Admin"},
        "user": {"email": "ops@example.com"},
        "objects": [{
            "group": "Settings",
            "name": "User",
            "path": "/admin/user/",
            "fields": [
                {"name": "id", "type": "uint", "primary": true},
                {"name": "email", "type": "string", "tag": "size:128"},
                {"name": "age", "type": "int"},
                {"name": "enabled", "type": "bool"},
                {"name": "group", "type": "uint", "foreign": {"path": "/admin/group/", "field": "group_id"}}
            ],
            "shows": ["id", "email", "age"],
            "editables": ["email", "age", "enabled", "group"],
            "filterables": ["enabled", "group"],
            "orderables": ["id", "age"],
            "requireds": ["email", "age"],
            "orders": [{"name": "id", "op": "desc"}],
            "primaryKeys": ["id"],
            "permissions": {"can_create": true, "can_update": true, "can_delete": true},
            "actions": [
                {"name": "Toggle", "path": "toggle", "batch": true},
                {"name": "Export", "path": "export"}
            ]
        }]
    })
}

fn user(id: u64) -> Value {
    json!({
        "id": id,
        "email": format!("user{id}@example.com"),
        "age": 20 + id,
        "enabled": id % 2 == 0,
        "group": {"value": 1, "label": "Staff"}
    })
}

struct Harness {
    console: Console<MockBackend>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl Harness {
    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }

    fn notice(&mut self) -> (NoticeLevel, String) {
        let notice = self.console.notices_mut().last().cloned().unwrap();
        (notice.level, notice.text)
    }
}

async fn harness_with(
    total: usize,
    overrides: impl Fn(&ApiRequest) -> Option<ApiResponse> + Send + Sync + 'static,
) -> Harness {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let backend = MockBackend {
        total,
        requests: Arc::clone(&requests),
        overrides: Box::new(overrides),
    };
    let mut console = Console::new(backend, ConsoleOptions::default());
    console.load().await.unwrap();
    console.switch_object("User").await.unwrap();
    Harness { console, requests }
}

async fn harness(total: usize) -> Harness {
    harness_with(total, |_| None).await
}

#[tokio::test]
async fn load_and_switch_fetch_first_page() {
    let h = harness(45).await;
    let requests = h.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "./admin.json");
    assert_eq!(
        requests[1].body,
        Some(json!({
            "keyword": "",
            "pos": 0,
            "limit": 20,
            "filters": [],
            "orders": [{"name": "id", "op": "desc"}, {"name": "age", "op": ""}]
        }))
    );
    assert_eq!(h.console.site().title(), "Carrot | Admin");
    assert_eq!(h.console.query().count(), 20);
    assert_eq!(h.console.query().total(), 45);
    assert_eq!(h.console.query().rows()[0].key, PrimaryKey::new().with("id", 1));
}

#[tokio::test]
async fn switching_to_active_object_does_nothing() {
    let mut h = harness(5).await;
    h.console.switch_object("user").await.unwrap();
    assert_eq!(h.requests().len(), 2);
}

#[tokio::test]
async fn unknown_object_posts_error() {
    let mut h = harness(5).await;
    let err = h.console.switch_object("Nope").await.unwrap_err();
    assert!(matches!(err, ConsoleError::UnknownObject(name) if name == "Nope"));
    assert_eq!(h.notice().0, NoticeLevel::Error);
    assert_eq!(h.console.active().map(|object| object.name.as_str()), Some("User"));
}

#[tokio::test]
async fn paging_stops_at_last_page() {
    let mut h = harness(45).await;
    assert!(h.console.next_page().await.unwrap());
    assert_eq!(h.console.query().pos(), 20);
    assert!(h.console.next_page().await.unwrap());
    assert_eq!(h.console.query().pos(), 40);
    assert_eq!(h.console.query().count(), 5);
    assert!(!h.console.next_page().await.unwrap());
    assert_eq!(h.console.query().pos(), 40);
    assert_eq!(h.requests_to(Method::Post, "/admin/user/").len(), 3);

    assert!(h.console.prev_page().await.unwrap());
    assert_eq!(h.console.query().pos(), 20);
}

#[tokio::test]
async fn search_resets_position() {
    let mut h = harness(45).await;
    h.console.next_page().await.unwrap();
    h.console.search("  alice ").await.unwrap();
    let last = h.requests().pop().unwrap().body.unwrap();
    assert_eq!(last["keyword"], json!("alice"));
    assert_eq!(last["pos"], json!(0));
}

#[tokio::test]
async fn order_toggle_refetches() {
    let mut h = harness(5).await;
    assert_eq!(h.console.toggle_order("age").await.unwrap(), Some(OrderOp::Asc));
    assert_eq!(h.console.toggle_order("email").await.unwrap(), None);
    let last = h.requests().pop().unwrap().body.unwrap();
    assert_eq!(last["orders"][1], json!({"name": "age", "op": "asc"}));
    h.console.clear_order("age").await.unwrap();
    let last = h.requests().pop().unwrap().body.unwrap();
    assert_eq!(last["orders"][1], json!({"name": "age", "op": ""}));
}

#[tokio::test]
async fn sequential_action_stops_at_first_failure() {
    let mut h = harness_with(3, |request| {
        let failing = request.path == "/admin/user/export"
            && request.query == [("id".to_string(), "2".to_string())];
        failing.then(|| failure(500, "Internal Server Error", "boom"))
    })
    .await;
    h.console.toggle_all();
    let pending = h.console.confirm_action("Export").unwrap();
    assert_eq!(pending.keys.len(), 3);

    let mut steps = Vec::new();
    let err = h
        .console
        .execute_confirmed(|step| steps.push(step.to_string()))
        .await
        .unwrap_err();

    assert_eq!(steps, vec!["1/3", "2/3"]);
    assert_eq!(h.requests_to(Method::Post, "/admin/user/export").len(), 2);
    assert!(matches!(
        err,
        ConsoleError::BatchAborted { completed: 1, remaining: 2, .. }
    ));
    assert_eq!(
        h.notice(),
        (NoticeLevel::Error, "Export fail : boom (2 not processed)".to_string())
    );
    assert!(h.console.pending().is_none());
}

#[tokio::test]
async fn batch_action_sends_key_list() {
    let mut h = harness(3).await;
    h.console.toggle_row(0);
    h.console.toggle_row(1);
    assert_eq!(h.console.query().selected(), 2);
    h.console.confirm_action("Toggle").unwrap();
    let report = h.console.execute_confirmed(|_| {}).await.unwrap();
    assert_eq!(report.completed, 1);

    let sent = h.requests_to(Method::Post, "/admin/user/toggle");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].query,
        vec![("keys".to_string(), r#"[{"id":1},{"id":2}]"#.to_string())]
    );
    assert_eq!(
        h.notice(),
        (NoticeLevel::Info, "Toggle all records done".to_string())
    );
    assert_eq!(h.console.query().selected(), 0);
}

#[tokio::test]
async fn select_result_reports_total_and_sends_page_keys() {
    let mut h = harness(45).await;
    h.console.select_result();
    assert_eq!(h.console.query().selected(), 45);
    let pending = h.console.confirm_action("Toggle").unwrap();
    assert_eq!(pending.keys.len(), 20);
}

#[tokio::test]
async fn action_download_is_reported() {
    let mut h = harness_with(1, |request| {
        (request.path == "/admin/user/export").then(|| ApiResponse {
            content_disposition: Some("attachment; filename=users.csv".to_string()),
            body: b"id\n1\n".to_vec(),
            ..ApiResponse::json(&Value::Null)
        })
    })
    .await;
    h.console.toggle_row(0);
    h.console.confirm_action("Export").unwrap();
    let report = h.console.execute_confirmed(|_| {}).await.unwrap();
    let downloads: Vec<_> = report.downloads().collect();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].filename, "users.csv");
    assert_eq!(downloads[0].bytes, b"id\n1\n");
}

#[tokio::test]
async fn confirm_requires_selection() {
    let mut h = harness(3).await;
    let err = h.console.confirm_action("Export").unwrap_err();
    assert!(matches!(err, ConsoleError::NothingSelected));
    h.console.toggle_row(0);
    assert!(matches!(
        h.console.confirm_action("Missing").unwrap_err(),
        ConsoleError::UnknownAction(_)
    ));
    h.console.confirm_action("Export").unwrap();
    h.console.cancel_confirm();
    assert!(matches!(
        h.console.execute_confirmed(|_| {}).await.unwrap_err(),
        ConsoleError::NoPendingAction
    ));
}

#[tokio::test]
async fn save_sends_only_dirty_fields() {
    let mut h = harness(3).await;
    h.console.open_edit(0).unwrap();
    assert!(h.console.edit_event("age", ControlEvent::Changed("42".into())).unwrap());
    h.console.save(true).await.unwrap();

    let sent = h.requests_to(Method::Patch, "/admin/user/");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].query, vec![("id".to_string(), "1".to_string())]);
    assert_eq!(sent[0].body, Some(json!({"age": 42})));
    assert!(h.console.edit().is_none());
    assert_eq!(h.notice(), (NoticeLevel::Info, "Save Done".to_string()));
}

#[tokio::test]
async fn create_sends_every_field_and_stays_open() {
    let mut h = harness(3).await;
    let session = h.console.open_create().unwrap();
    assert_eq!(session.title(), "Add User");
    h.console.load_foreign_options().await.unwrap();
    h.console
        .edit_event("email", ControlEvent::Changed("new@example.com".into()))
        .unwrap();
    h.console.save(false).await.unwrap();

    let sent = h.requests_to(Method::Put, "/admin/user/");
    assert_eq!(
        sent[0].body,
        Some(json!({"email": "new@example.com", "age": 0, "enabled": false, "group": 1}))
    );
    let session = h.console.edit().unwrap();
    assert_eq!(session.mode(), EditMode::Edit);
    assert_eq!(session.primary(), Some(&PrimaryKey::new().with("id", 99)));
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn failed_save_keeps_form_and_reports_backend_error() {
    let mut h = harness_with(3, |request| {
        (request.method == Method::Patch)
            .then(|| failure(400, "Bad Request", r#"{"error": "email exists"}"#))
    })
    .await;
    h.console.open_edit(1).unwrap();
    h.console
        .edit_event("email", ControlEvent::Changed("taken@example.com".into()))
        .unwrap();
    let err = h.console.save(true).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Api { status: 400, .. }));
    assert_eq!(
        h.notice(),
        (NoticeLevel::Error, "Save Fail: email exists".to_string())
    );
    assert!(h.console.edit().unwrap().is_dirty());
}

#[tokio::test]
async fn required_value_that_does_not_parse_blocks_save() {
    let mut h = harness(3).await;
    h.console.open_edit(0).unwrap();
    h.console.edit_event("age", ControlEvent::Changed("abc".into())).unwrap();
    let err = h.console.save(true).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Rejected { field } if field == "age"));
    assert!(h.requests_to(Method::Patch, "/admin/user/").is_empty());
}

#[tokio::test]
async fn delete_from_edit_form() {
    let mut h = harness(3).await;
    h.console.open_edit(2).unwrap();
    let pending = h.console.confirm_delete_one().unwrap();
    assert_eq!(pending.action.method, Method::Delete);
    h.console.execute_confirmed(|_| {}).await.unwrap();

    let sent = h.requests_to(Method::Delete, "/admin/user/");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].query, vec![("id".to_string(), "3".to_string())]);
    assert!(h.console.edit().is_none());
    assert_eq!(
        h.notice(),
        (NoticeLevel::Info, "Delete all records done".to_string())
    );
}

#[tokio::test]
async fn filters_are_sent_and_cleared() {
    let mut h = harness(45).await;
    h.console.next_page().await.unwrap();
    let selection = h.console.select_filter("enabled", &[1]).await.unwrap().unwrap();
    assert_eq!(selection.show_op, "is");
    let last = h.requests().pop().unwrap().body.unwrap();
    assert_eq!(last["filters"], json!([{"name": "enabled", "op": "=", "value": true}]));
    assert_eq!(last["pos"], json!(0));

    h.console.load_filter_options().await.unwrap();
    let group = &h.console.filter_controls()[1];
    assert_eq!(group.name, "group_id");
    let labels: Vec<&str> = group.options.iter().map(|option| option.label.as_str()).collect();
    assert_eq!(labels, vec!["Staff", "Admin"]);

    h.console.select_filter("group", &[0, 1]).await.unwrap();
    let last = h.requests().pop().unwrap().body.unwrap();
    assert_eq!(last["filters"][1], json!({"name": "group_id", "op": "in", "value": [1, 2]}));

    h.console.clear_filters().await.unwrap();
    let last = h.requests().pop().unwrap().body.unwrap();
    assert_eq!(last["filters"], json!([]));
    assert!(h.console.filter_selections().iter().all(Option::is_none));
}

#[tokio::test]
async fn query_body_carries_search_filters_and_orders() {
    let mut h = harness(45).await;
    h.console.search("alice").await.unwrap();
    h.console.select_filter("enabled", &[1]).await.unwrap();
    h.console.toggle_order("age").await.unwrap();
    let last = h.requests().pop().unwrap().body.unwrap();
    insta::assert_json_snapshot!(last, @r#"
    {
      "keyword": "alice",
      "pos": 0,
      "limit": 20,
      "filters": [
        {
          "name": "enabled",
          "op": "=",
          "value": true
        }
      ],
      "orders": [
        {
          "name": "id",
          "op": "desc"
        },
        {
          "name": "age",
          "op": "asc"
        }
      ]
    }
    "#);
}

#[tokio::test]
async fn failed_query_is_reported() {
    let mut h = harness_with(3, |request| {
        let searching = request
            .body
            .as_ref()
            .is_some_and(|body| body["keyword"] == json!("down"));
        searching.then(|| failure(502, "Bad Gateway", ""))
    })
    .await;
    let err = h.console.search("down").await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(h.notice(), (NoticeLevel::Error, "Query fail: Bad Gateway".to_string()));
    assert!(!h.console.query().is_loading());
}

struct Hooks;

impl ObjectHooks for Hooks {
    fn prepare_query(&self, _object: &ObjectDescriptor, form: &mut QueryForm) -> bool {
        form.keyword != "skip"
    }

    fn prepare_result(&self, _object: &ObjectDescriptor, rows: &mut [Row], _total: usize) {
        if let Some(row) = rows.first_mut() {
            row.selected = true;
        }
    }
}

#[tokio::test]
async fn hooks_veto_queries_and_adjust_rows() {
    let mut h = harness(3).await;
    h.console.set_hooks("User", Hooks);
    h.console.refresh().await.unwrap();
    assert_eq!(h.console.query().selected(), 1);

    let before = h.requests().len();
    h.console.search("skip").await.unwrap();
    assert_eq!(h.requests().len(), before);
    assert_eq!(h.console.query().count(), 3);
}

#[tokio::test]
async fn rendered_row_and_form() {
    let mut h = harness(1).await;
    let cells = h.console.render_row(0).unwrap();
    let texts: Vec<String> = cells.iter().map(|cell| cell.text_content()).collect();
    assert_eq!(texts, vec!["1", "user1@example.com", "21"]);

    h.console.open_edit(0).unwrap();
    let form = h.console.render_form().unwrap();
    let html = form.to_html();
    assert!(html.contains(r#"data-field="email""#));
    assert!(html.contains(r#"value="user1@example.com""#));
    assert!(html.contains(r#"<select name="group""#));
}

fn object() -> ObjectDescriptor {
    let spec: ObjectSpec = serde_json::from_value(meta()["objects"][0].clone()).unwrap();
    ObjectDescriptor::from_spec(spec)
}

fn page(total: usize, len: usize) -> QueryResponse {
    QueryResponse {
        pos: 0,
        total,
        limit: 20,
        keyword: String::new(),
        items: (0..len)
            .map(|n| user(n as u64 + 1).as_object().cloned().unwrap())
            .collect(),
    }
}

proptest! {
    #[test]
    fn paging_stays_in_range(total in 0usize..500, steps in proptest::collection::vec(any::<bool>(), 0..40)) {
        let object = object();
        let mut state = QueryState::for_object(&object, 20);
        let ticket = state.begin_fetch();
        prop_assert_eq!(state.attach(ticket, page(total, 0), &object), Attach::Applied);
        for forward in steps {
            if forward {
                state.next_page();
            } else {
                state.prev_page();
            }
            if total > 0 {
                prop_assert!(state.pos() < total);
            }
            prop_assert_eq!(state.pos() % 20, 0);
        }
    }

    #[test]
    fn selection_count_matches_rows(len in 0usize..20, toggles in proptest::collection::vec(0usize..25, 0..60)) {
        let object = object();
        let mut state = QueryState::for_object(&object, 20);
        let ticket = state.begin_fetch();
        state.attach(ticket, page(len, len), &object);
        for index in toggles {
            if index >= 20 {
                state.toggle_all();
            } else {
                state.toggle_row(index);
            }
            let counted = state.rows().iter().filter(|row| row.selected).count();
            prop_assert_eq!(state.selected(), counted);
            prop_assert_eq!(state.selected_keys().len(), counted);
        }
    }
}
