//! Filter controls for filterable fields.
//!
//! A [`FilterControl`] describes what the user can pick for one field and
//! turns a pick into a [`FilterInput`] for the query state.

use std::collections::BTreeMap;

use admin_model::display::value_text;
use admin_model::{Choice, Field, FieldType, Filter, FilterInput, FilterOp};
use chrono::{Datelike, Days, Months, NaiveDate, SecondsFormat};
use serde_json::Value;

/// Label of the option matching a missing value.
const EMPTY_LABEL: &str = "Empty value";
const ANY_DATE_LABEL: &str = "Any date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Free text matched with `like`.
    Text,
    /// Number compared with an operator.
    Number,
    Boolean,
    /// Preset date ranges.
    DateRange,
    /// Options loaded from a foreign-key lookup endpoint.
    Foreign,
    /// The field's fixed choices.
    Select,
}

/// Filter widget names available to `attribute.filterWidget`.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    names: BTreeMap<String, FilterKind>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        let names = [
            ("string", FilterKind::Text),
            ("int", FilterKind::Number),
            ("float", FilterKind::Number),
            ("bool", FilterKind::Boolean),
            ("datetime", FilterKind::DateRange),
            ("foreign", FilterKind::Foreign),
            ("select", FilterKind::Select),
        ]
        .into_iter()
        .map(|(name, kind)| (name.to_string(), kind))
        .collect();
        Self { names }
    }
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_alias(&mut self, name: impl Into<String>, kind: FilterKind) -> Option<FilterKind> {
        self.names.insert(name.into(), kind)
    }

    /// Filter control name for `field`.
    ///
    /// Foreign keys use `foreign`, primitive types their own name and
    /// everything else `string`. An explicit `attribute.filterWidget` wins,
    /// then a choice list selects `select`.
    pub fn filter_name(field: &Field) -> String {
        let mut name = if field.is_foreign() {
            "foreign"
        } else {
            match field.field_type {
                FieldType::Struct(_) => "string",
                ref primitive => primitive.as_str(),
            }
        }
        .to_string();
        if let Some(attribute) = &field.attribute {
            if let Some(widget) = attribute.filter_widget.as_deref().filter(|w| !w.is_empty()) {
                name = widget.to_string();
            } else if attribute.choices.is_some() {
                name = "select".to_string();
            }
        }
        name
    }

    pub fn resolve(&self, field: &Field) -> FilterKind {
        let name = Self::filter_name(field);
        match self.names.get(&name) {
            Some(kind) => *kind,
            None => {
                tracing::warn!(field = %field.name, widget = %name, "filter widget not found, using string widget");
                FilterKind::Text
            }
        }
    }

    /// Build the control for `field`. `today` anchors the date presets.
    pub fn control(&self, field: &Field, today: NaiveDate) -> FilterControl {
        FilterControl::new(field, self.resolve(field), today)
    }
}

/// One pickable option.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub label: String,
    pub value: Value,
}

impl FilterOption {
    fn new(label: impl Into<String>, value: Value) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

impl From<&Choice> for FilterOption {
    fn from(choice: &Choice) -> Self {
        Self::new(choice.display_label(), choice.value.clone())
    }
}

/// What a control emits, with the text shown in the active filter chip.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub input: FilterInput,
    pub show_op: String,
    pub show_value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterControl {
    /// Field the control belongs to.
    pub field: String,
    /// Name sent in the filter clauses; foreign keys use the key field.
    pub name: String,
    pub label: String,
    pub kind: FilterKind,
    /// Checkbox (several values) or radio (one value) semantics.
    pub multiple: bool,
    pub options: Vec<FilterOption>,
}

impl FilterControl {
    pub fn new(field: &Field, kind: FilterKind, today: NaiveDate) -> Self {
        let single_choice = field
            .attribute
            .as_ref()
            .is_some_and(|attribute| attribute.single_choice);
        let mut name = field.name.clone();
        let (multiple, options) = match kind {
            FilterKind::Select => {
                let mut options = vec![FilterOption::new(EMPTY_LABEL, Value::Null)];
                options.extend(field.choices().unwrap_or_default().iter().map(FilterOption::from));
                (!single_choice, options)
            }
            FilterKind::Boolean => (
                true,
                vec![
                    FilterOption::new(EMPTY_LABEL, Value::Null),
                    FilterOption::new("Yes", Value::Bool(true)),
                    FilterOption::new("No", Value::Bool(false)),
                ],
            ),
            FilterKind::DateRange => (false, date_presets(today)),
            FilterKind::Foreign => {
                if let Some(foreign) = &field.foreign {
                    name = foreign.field.clone();
                }
                let options = if field.can_null {
                    vec![FilterOption::new(EMPTY_LABEL, Value::Null)]
                } else {
                    Vec::new()
                };
                (!single_choice, options)
            }
            FilterKind::Text | FilterKind::Number => (false, Vec::new()),
        };
        Self {
            field: field.name.clone(),
            name,
            label: field.label.clone(),
            kind,
            multiple,
            options,
        }
    }

    /// Append options loaded from the foreign-key lookup endpoint.
    pub fn add_options(&mut self, items: &[Choice]) {
        self.options.extend(items.iter().map(FilterOption::from));
    }

    /// Turn picked option indices into a filter.
    ///
    /// Returns `None` when nothing valid is picked, which clears the
    /// field's filter. Single-value controls only honor the first pick.
    pub fn select(&self, picked: &[usize]) -> Option<FilterSelection> {
        let mut chosen: Vec<&FilterOption> =
            picked.iter().filter_map(|&index| self.options.get(index)).collect();
        if !self.multiple {
            chosen.truncate(1);
        }
        let show_value = chosen
            .iter()
            .map(|option| option.label.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        if self.kind == FilterKind::DateRange {
            // "Any date" carries no bounds and clears the filter.
            let option = chosen.first()?;
            let bounds = option.value.as_array().filter(|bounds| bounds.len() == 2)?;
            return Some(FilterSelection {
                input: Filter::new(self.name.clone(), FilterOp::Between, bounds.clone()).into(),
                show_op: FilterOp::Between.as_str().to_string(),
                show_value,
            });
        }

        match chosen.as_slice() {
            [] => None,
            [single] => Some(FilterSelection {
                input: Filter::new(self.name.clone(), FilterOp::Equal, single.value.clone()).into(),
                show_op: "is".to_string(),
                show_value,
            }),
            several => {
                let values: Vec<Value> = several.iter().map(|option| option.value.clone()).collect();
                Some(FilterSelection {
                    input: Filter::new(self.name.clone(), FilterOp::In, values).into(),
                    show_op: FilterOp::In.as_str().to_string(),
                    show_value,
                })
            }
        }
    }

    /// Turn typed input into a filter for text and number controls.
    ///
    /// Text defaults to `like`, numbers to `=`. Blank input and numbers that
    /// do not parse yield `None`.
    pub fn enter(&self, op: Option<FilterOp>, input: &str) -> Option<FilterSelection> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        let (op, value) = match self.kind {
            FilterKind::Number => {
                let value = match text.parse::<i64>() {
                    Ok(int) => Value::from(int),
                    Err(_) => serde_json::Number::from_f64(text.parse::<f64>().ok()?)
                        .map(Value::Number)?,
                };
                (op.unwrap_or(FilterOp::Equal), value)
            }
            _ => (op.unwrap_or(FilterOp::Like), Value::String(text.to_string())),
        };
        Some(FilterSelection {
            input: Filter::new(self.name.clone(), op, value.clone()).into(),
            show_op: op.as_str().to_string(),
            show_value: value_text(&value),
        })
    }
}

fn day_start(date: NaiveDate) -> Value {
    let text = date
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default();
    Value::String(text)
}

fn range(label: &str, start: NaiveDate, end: NaiveDate) -> FilterOption {
    FilterOption::new(label, Value::Array(vec![day_start(start), day_start(end)]))
}

/// Preset ranges relative to `today`, led by "Any date". Each range value
/// is `[start, end]` where `end` is the midnight after the range.
pub fn date_presets(today: NaiveDate) -> Vec<FilterOption> {
    let tomorrow = today + Days::new(1);
    let week_start = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
    let month_start = today.with_day(1).unwrap_or(today);
    let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
    vec![
        FilterOption::new(ANY_DATE_LABEL, Value::Null),
        range("Today", today, tomorrow),
        range("Past 7 days", today - Days::new(7), tomorrow),
        range("This week", week_start, week_start + Days::new(7)),
        range("This month", month_start, month_start + Months::new(1)),
        range("This year", year_start, year_start + Months::new(12)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_model::{Attribute, FieldSpec, Foreign};
    use serde_json::json;

    fn field(type_name: &str) -> Field {
        Field::from_spec(FieldSpec {
            name: "f".to_string(),
            type_name: type_name.to_string(),
            ..FieldSpec::default()
        })
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    #[test]
    fn resolves_by_type_and_attribute() {
        let registry = FilterRegistry::new();
        assert_eq!(registry.resolve(&field("bool")), FilterKind::Boolean);
        assert_eq!(registry.resolve(&field("uint")), FilterKind::Number);
        assert_eq!(registry.resolve(&field("NullTime")), FilterKind::DateRange);
        assert_eq!(registry.resolve(&field("Profile")), FilterKind::Text);

        let mut choice = field("string");
        choice.attribute = Some(Attribute {
            choices: Some(vec![Choice::new("A", "a")]),
            ..Attribute::default()
        });
        assert_eq!(registry.resolve(&choice), FilterKind::Select);

        let mut custom = field("string");
        custom.attribute = Some(Attribute {
            filter_widget: Some("tags".to_string()),
            ..Attribute::default()
        });
        assert_eq!(registry.resolve(&custom), FilterKind::Text);
    }

    #[test]
    fn boolean_picks() {
        let control = FilterRegistry::new().control(&field("bool"), today());
        let one = control.select(&[1]).unwrap();
        assert_eq!(one.input, FilterInput::from(Filter::new("f", FilterOp::Equal, true)));
        assert_eq!(one.show_op, "is");

        let both = control.select(&[1, 2]).unwrap();
        assert_eq!(both.input, FilterInput::from(Filter::new("f", FilterOp::In, json!([true, false]))));
        assert_eq!(both.show_value, "Yes, No");
        assert!(control.select(&[]).is_none());
    }

    #[test]
    fn date_range_sends_between() {
        let control = FilterRegistry::new().control(&field("datetime"), today());
        let picked = control.select(&[1]).unwrap();
        assert_eq!(
            picked.input,
            FilterInput::from(Filter::new(
                "f",
                FilterOp::Between,
                json!(["2024-03-14T00:00:00.000Z", "2024-03-15T00:00:00.000Z"])
            ))
        );
        assert_eq!(picked.show_op, "between");
        assert_eq!(picked.show_value, "Today");
    }

    #[test]
    fn any_date_clears() {
        let control = FilterRegistry::new().control(&field("datetime"), today());
        assert_eq!(control.options[0].label, "Any date");
        assert!(control.select(&[0]).is_none());
    }

    #[test]
    fn presets_cover_week_month_year() {
        let presets = date_presets(today());
        // 2024-03-14 is a Thursday.
        assert_eq!(presets[3].value, json!(["2024-03-10T00:00:00.000Z", "2024-03-17T00:00:00.000Z"]));
        assert_eq!(presets[4].value, json!(["2024-03-01T00:00:00.000Z", "2024-04-01T00:00:00.000Z"]));
        assert_eq!(presets[5].value, json!(["2024-01-01T00:00:00.000Z", "2025-01-01T00:00:00.000Z"]));
    }

    #[test]
    fn foreign_uses_key_field() {
        let mut group = field("Group");
        group.foreign = Some(Foreign {
            path: "/admin/group/".to_string(),
            field: "group_id".to_string(),
        });
        group.can_null = true;
        let mut control = FilterRegistry::new().control(&group, today());
        control.add_options(&[Choice::new("Ops", 3)]);
        assert_eq!(control.options.len(), 2);
        let pick = control.select(&[1]).unwrap();
        assert_eq!(pick.input, FilterInput::from(Filter::new("group_id", FilterOp::Equal, 3)));
    }

    #[test]
    fn typed_input() {
        let registry = FilterRegistry::new();
        let text = registry.control(&field("string"), today());
        assert_eq!(
            text.enter(None, " ann ").unwrap().input,
            FilterInput::from(Filter::new("f", FilterOp::Like, "ann"))
        );
        assert!(text.enter(None, "  ").is_none());

        let number = registry.control(&field("int"), today());
        assert_eq!(
            number.enter(Some(FilterOp::Greater), "18").unwrap().input,
            FilterInput::from(Filter::new("f", FilterOp::Greater, 18))
        );
        assert!(number.enter(None, "eighteen").is_none());
    }
}
