//! Terminal tables for objects, pages and records.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use admin_model::{ObjectDescriptor, ObjectRegistry, Permissions};

/// One group per row block: name, path, description and granted permissions.
pub fn objects_table(objects: &ObjectRegistry) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Object"),
        header_cell("Path"),
        header_cell("Description"),
        header_cell("Access"),
    ]);
    apply_table_style(&mut table);
    for (group, items) in objects.groups() {
        for (position, object) in items.iter().enumerate() {
            let group_cell = if position == 0 {
                Cell::new(group)
                    .fg(Color::Blue)
                    .add_attribute(Attribute::Bold)
            } else {
                dim_cell("")
            };
            table.add_row(vec![
                group_cell,
                Cell::new(&object.name).add_attribute(Attribute::Bold),
                dim_cell(&object.path),
                Cell::new(&object.desc),
                Cell::new(permission_flags(&object.permissions)),
            ]);
        }
    }
    table
}

/// Rendered cells of one page; `first` is the one-based number of the
/// first row.
pub fn page_table(object: &ObjectDescriptor, rows: &[Vec<String>], first: usize) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("#")];
    header.extend(object.shows().map(|field| header_cell(&field.label)));
    table.set_header(header);
    apply_page_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (offset, cells) in rows.iter().enumerate() {
        let mut row = vec![dim_cell(first + offset)];
        row.extend(cells.iter().map(|text| {
            if text.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(text)
            }
        }));
        table.add_row(row);
    }
    table
}

/// Label and rendered value of every shown field of one record.
pub fn record_table(pairs: &[(String, String)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);
    for (label, value) in pairs {
        table.add_row(vec![
            Cell::new(label).add_attribute(Attribute::Bold),
            Cell::new(value),
        ]);
    }
    table
}

/// `c`, `u`, `d` and `a` for create, update, delete and action rights.
pub fn permission_flags(permissions: &Permissions) -> String {
    [
        ('c', permissions.can_create()),
        ('u', permissions.can_update()),
        ('d', permissions.can_delete()),
        ('a', permissions.can_action()),
    ]
    .iter()
    .map(|&(flag, granted)| if granted { flag } else { '-' })
    .collect()
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_page_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(165);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use admin_model::ObjectSpec;

    use super::*;

    fn user() -> ObjectDescriptor {
        let spec: ObjectSpec = serde_json::from_value(serde_json::json!({
            "group": "Accounts",
            "name": "User",
            "path": "/admin/user/",
            "fields": [
                {"name": "id", "type": "uint", "primary": true, "label": "ID"},
                {"name": "email", "type": "string", "label": "Email"}
            ],
            "shows": ["id", "email"],
            "primaryKeys": ["id"],
            "permissions": {"can_create": true, "can_delete": true}
        }))
        .unwrap();
        ObjectDescriptor::from_spec(spec)
    }

    #[test]
    fn permission_flags_mark_missing_rights() {
        let permissions = Permissions::default()
            .with("can_create", true)
            .with("can_delete", true);
        insta::assert_snapshot!(permission_flags(&permissions), @"c-d-");
    }

    #[test]
    fn page_table_numbers_rows_from_first() {
        let rows = vec![
            vec!["21".to_string(), "a@example.com".to_string()],
            vec!["22".to_string(), String::new()],
        ];
        let rendered = page_table(&user(), &rows, 21).to_string();
        assert!(rendered.contains("Email"));
        assert!(rendered.contains("a@example.com"));
        assert!(rendered.contains("22"));
        assert!(rendered.contains('-'));
    }

    #[test]
    fn objects_table_lists_groups() {
        let objects = ObjectRegistry::from_specs([serde_json::from_value::<ObjectSpec>(
            serde_json::json!({"group": "Accounts", "name": "User", "path": "/admin/user/"}),
        )
        .unwrap()]);
        let rendered = objects_table(&objects).to_string();
        assert!(rendered.contains("Accounts"));
        assert!(rendered.contains("/admin/user/"));
    }
}
