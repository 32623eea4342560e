//! REST calls of the object CRUD contract.

use admin_model::{
    Action, AdminMeta, Choice, Field, ForeignOptions, Method, ObjectDescriptor, PrimaryKey,
    QueryForm, QueryResponse,
};
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Path of the console metadata endpoint.
pub const META_PATH: &str = "./admin.json";

/// A file returned by an action instead of JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Result of one action request.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Json(Value),
    Download(Download),
}

impl ActionOutcome {
    fn from_response(response: ApiResponse) -> Result<Self> {
        if let Some(filename) = response.download_name() {
            return Ok(Self::Download(Download {
                filename,
                bytes: response.body,
            }));
        }
        Ok(Self::Json(response.decode()?))
    }
}

/// Fetch the console metadata.
pub async fn load_meta<T: Transport>(transport: &T) -> Result<AdminMeta> {
    tracing::debug!(path = META_PATH, "loading console metadata");
    let response = transport
        .send(ApiRequest::new(Method::Post, META_PATH))
        .await?
        .check()?;
    let text = response.text();
    Ok(AdminMeta::from_json(&text)?)
}

/// Fetch the options of a foreign-key field. Fields without a lookup
/// endpoint have no options.
pub async fn foreign_options<T: Transport>(transport: &T, field: &Field) -> Result<Vec<Choice>> {
    let Some(foreign) = &field.foreign else {
        return Ok(Vec::new());
    };
    let request = ApiRequest::new(Method::Post, foreign.path.as_str()).with_body(json!({"foreign": true}));
    let response = transport.send(request).await?.check()?;
    let options: Option<ForeignOptions> = response.decode()?;
    let items = options.map(|options| options.items).unwrap_or_default();
    tracing::debug!(field = %field.name, count = items.len(), "foreign options loaded");
    Ok(items)
}

/// CRUD requests for one object.
#[derive(Debug)]
pub struct ObjectApi<'a, T> {
    transport: &'a T,
    object: &'a ObjectDescriptor,
}

impl<'a, T: Transport> ObjectApi<'a, T> {
    pub fn new(transport: &'a T, object: &'a ObjectDescriptor) -> Self {
        Self { transport, object }
    }

    /// `POST <path>` with the query form.
    pub async fn query(&self, form: &QueryForm) -> Result<QueryResponse> {
        let request =
            ApiRequest::new(Method::Post, self.object.path.as_str()).with_body(serde_json::to_value(form)?);
        let response = self.transport.send(request).await?.check()?;
        let page: Option<QueryResponse> = response.decode()?;
        Ok(page.unwrap_or_default())
    }

    /// `PUT <path>` with every field; returns the created record.
    pub async fn create(&self, values: Map<String, Value>) -> Result<Map<String, Value>> {
        tracing::info!(object = %self.object.name, "creating record");
        let request = ApiRequest::new(Method::Put, self.object.path.as_str()).with_body(Value::Object(values));
        let response = self.transport.send(request).await?.check()?;
        let record: Option<Map<String, Value>> = response.decode()?;
        Ok(record.unwrap_or_default())
    }

    /// `PATCH <path>?<keys>` with the changed fields; returns the record.
    pub async fn save(
        &self,
        key: &PrimaryKey,
        values: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        tracing::info!(object = %self.object.name, key = %key, fields = values.len(), "saving record");
        let request = ApiRequest::new(Method::Patch, self.object.path.as_str())
            .with_query(key.query_pairs())
            .with_body(Value::Object(values));
        let response = self.transport.send(request).await?.check()?;
        let record: Option<Map<String, Value>> = response.decode()?;
        Ok(record.unwrap_or_default())
    }

    /// `<method> <action.path>?<keys>` for a single key.
    pub async fn action(&self, action: &Action, key: &PrimaryKey) -> Result<ActionOutcome> {
        self.send_action(action, key.query_pairs()).await
    }

    /// `<method> <action.path>?keys=<json list>` for a batch action.
    pub async fn batch_action(&self, action: &Action, keys: &[PrimaryKey]) -> Result<ActionOutcome> {
        let encoded = serde_json::to_string(keys)?;
        self.send_action(action, vec![("keys".to_string(), encoded)])
            .await
    }

    async fn send_action(
        &self,
        action: &Action,
        query: Vec<(String, String)>,
    ) -> Result<ActionOutcome> {
        tracing::debug!(object = %self.object.name, action = %action.name, method = %action.method, "sending action");
        let request = ApiRequest::new(action.method, action.path.as_str()).with_query(query);
        let response = self.transport.send(request).await?.check()?;
        ActionOutcome::from_response(response)
    }
}
