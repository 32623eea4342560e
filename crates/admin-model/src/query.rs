//! List query wire types: filters, sort orders, the query form and the
//! backend's result page.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field::Choice;
use crate::serde_util::null_as_default;

/// Page size used when the backend does not report one.
pub const DEFAULT_LIMIT: usize = 20;

/// Comparison operator of a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "<>")]
    NotEqual,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not_in")]
    NotIn,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "between")]
    Between,
}

impl FilterOp {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Like => "like",
            Self::Between => "between",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "=" | "eq" => Ok(Self::Equal),
            "<>" | "!=" | "ne" => Ok(Self::NotEqual),
            "in" => Ok(Self::In),
            "not_in" => Ok(Self::NotIn),
            ">" | "gt" => Ok(Self::Greater),
            ">=" | "ge" => Ok(Self::GreaterOrEqual),
            "<" | "lt" => Ok(Self::Less),
            "<=" | "le" => Ok(Self::LessOrEqual),
            "like" => Ok(Self::Like),
            "between" => Ok(Self::Between),
            _ => Err(format!("Unknown filter operator: {s}")),
        }
    }
}

/// One filter clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(name: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            op,
            value: value.into(),
        }
    }
}

/// Several clauses emitted atomically by a single control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(rename = "isGroup")]
    pub is_group: bool,
    pub filters: Vec<Filter>,
}

/// What a filter control emits: a clause or a group of clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterInput {
    Group(FilterGroup),
    Clause(Filter),
}

impl FilterInput {
    pub fn group(filters: Vec<Filter>) -> Self {
        Self::Group(FilterGroup {
            is_group: true,
            filters,
        })
    }

    /// Flatten groups into their clauses, preserving order.
    pub fn flatten<I>(inputs: I) -> Vec<Filter>
    where
        I: IntoIterator<Item = FilterInput>,
    {
        let mut filters = Vec::new();
        for input in inputs {
            match input {
                Self::Group(group) => filters.extend(group.filters),
                Self::Clause(filter) => filters.push(filter),
            }
        }
        filters
    }
}

impl From<Filter> for FilterInput {
    fn from(filter: Filter) -> Self {
        Self::Clause(filter)
    }
}

/// Sort direction; the empty direction means "unsorted".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderOp {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl OrderOp {
    /// Next direction of a header click: `'' -> asc -> desc -> asc`.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::None | Self::Desc => Self::Asc,
            Self::Asc => Self::Desc,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for OrderOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(Self::None),
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("Unknown order direction: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub name: String,
    #[serde(default)]
    pub op: OrderOp,
}

impl Order {
    pub fn new(name: impl Into<String>, op: OrderOp) -> Self {
        Self {
            name: name.into(),
            op,
        }
    }
}

/// Request body of a list query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub keyword: String,
    pub pos: usize,
    pub limit: usize,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// One page of results.
///
/// Missing numbers are zero; the backend omits them when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub pos: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub keyword: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Map<String, Value>>,
}

/// Response of a foreign-key lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForeignOptions {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Choice>,
}
