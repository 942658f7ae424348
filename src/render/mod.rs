// execdemo/src/render/mod.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Presentation of an [`ExecResult`].
//!
//! The `/exec` backend answers with an object that may carry the executed
//! `query`, an `error`, and one table per key in [`TABLE_KEYS`]:
//!
//! ```json
//! {
//!   "query": "insert into customer(email) values('a@b')",
//!   "result":   { "title": "result", "fields": [], "rows": [], "rowsaffected": 1, "insertid": 4 },
//!   "customer": { "title": "customer", "fields": ["customer_id", "email"], "rows": [["4", "a@b"]],
//!                 "rowsaffected": 0, "insertid": 0 }
//! }
//! ```
//!
//! No schema is enforced: anything that does not fit is printed as JSON.

use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write;

use crate::result::ExecResult;

/// Table keys in the order the backend fills them.
pub const TABLE_KEYS: [&str; 4] = ["result", "product", "customer", "corder"];

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    #[serde(default, rename = "rowsaffected")]
    pub rows_affected: i64,
    #[serde(default, rename = "insertid")]
    pub insert_id: i64,
}

/// Typed view over a result, ready for display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecView {
    pub query: Option<String>,
    pub error: Option<String>,
    pub tables: Vec<ResultTable>,
    /// Response that does not look like a backend object at all.
    pub raw: Option<Value>,
}

impl ExecView {
    pub fn from_result(result: &ExecResult) -> Self {
        match result {
            ExecResult::Error { message } => ExecView {
                error: Some(message.clone()),
                ..Default::default()
            },
            ExecResult::Value(value) => Self::from_value(value),
        }
    }

    fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return ExecView { raw: Some(value.clone()), ..Default::default() };
        };

        let query = object.get("query").and_then(Value::as_str).map(str::to_string);
        let error = object.get("error").filter(|e| !e.is_null()).map(|e| match e {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        let tables: Vec<ResultTable> = TABLE_KEYS
            .iter()
            .filter_map(|key| object.get(*key))
            .filter_map(|table| serde_json::from_value(table.clone()).ok())
            .collect();

        if query.is_none() && error.is_none() && tables.is_empty() {
            return ExecView { raw: Some(value.clone()), ..Default::default() };
        }

        ExecView { query, error, tables, raw: None }
    }
}

/// Renders a result as plain text for the terminal.
pub fn render_text(result: &ExecResult) -> String {
    let view = ExecView::from_result(result);
    let mut out = String::new();

    if let Some(raw) = &view.raw {
        let pretty = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
        out.push_str(&pretty);
        out.push('\n');
        return out;
    }

    if let Some(query) = &view.query {
        let _ = writeln!(out, "query: {}", query);
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "error: {}", error);
    }

    for table in &view.tables {
        out.push('\n');
        render_table(&mut out, table);
    }

    out
}

fn render_table(out: &mut String, table: &ResultTable) {
    let _ = writeln!(out, "== {} ==", table.title);

    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.fields.len()))
        .max()
        .unwrap_or(0);

    if columns > 0 {
        let mut widths = vec![0usize; columns];
        for row in std::iter::once(&table.fields).chain(table.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        write_row(out, &table.fields, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "{}", rule.join("-+-"));
        for row in &table.rows {
            write_row(out, row, &widths);
        }
    }

    let _ = writeln!(
        out,
        "({} rows, rows affected: {}, insert id: {})",
        table.rows.len(),
        table.rows_affected,
        table.insert_id
    );
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{:<width$}", cell, width = *width)
        })
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}
