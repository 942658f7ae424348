// execdemo/src/command/mod.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Commands accepted by the `/exec` backend.
//!
//! Each command kind has a fixed form template:
//!
//! | kind       | body                                   |
//! |------------|----------------------------------------|
//! | `query`    | `query=<text>`                         |
//! | `product`  | `product=1&sku=..&desc=..&price=..`    |
//! | `customer` | `customer=1&name=..`                   |
//! | `order`    | `order=1&cid=..&sku=..`                |

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ExecError, Result as ExecdemoResult};
use crate::form;

/// Discriminator of a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Query,
    Product,
    Customer,
    Order,
}

impl CommandKind {
    pub const ALL: [CommandKind; 4] = [
        CommandKind::Query,
        CommandKind::Product,
        CommandKind::Customer,
        CommandKind::Order,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Query => "query",
            CommandKind::Product => "product",
            CommandKind::Customer => "customer",
            CommandKind::Order => "order",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = ExecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ExecError::UnknownCommand(s.to_string()))
    }
}

/// A user action destined for `/exec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Raw SQL text.
    Query { query: String },
    /// Insert or update a product row.
    Product { sku: String, desc: String, price: String },
    /// Insert a customer by e-mail/name.
    Customer { name: String },
    /// Place an order for a customer.
    Order { cid: String, sku: String },
}

impl Command {
    pub fn query(text: impl Into<String>) -> Self {
        Command::Query { query: text.into() }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Query { .. } => CommandKind::Query,
            Command::Product { .. } => CommandKind::Product,
            Command::Customer { .. } => CommandKind::Customer,
            Command::Order { .. } => CommandKind::Order,
        }
    }

    /// Builds a command from its name and a field map.
    ///
    /// Missing fields become empty strings; extra fields are ignored.
    pub fn from_fields(name: &str, fields: &IndexMap<String, String>) -> ExecdemoResult<Self> {
        let field = |key: &str| fields.get(key).cloned().unwrap_or_default();

        let command = match name.parse::<CommandKind>()? {
            CommandKind::Query => Command::Query { query: field("query") },
            CommandKind::Product => Command::Product {
                sku: field("sku"),
                desc: field("desc"),
                price: field("price"),
            },
            CommandKind::Customer => Command::Customer { name: field("name") },
            CommandKind::Order => Command::Order {
                cid: field("cid"),
                sku: field("sku"),
            },
        };
        Ok(command)
    }

    /// Ordered form pairs for this command's template.
    pub fn form_pairs(&self) -> Vec<(&'static str, &str)> {
        match self {
            Command::Query { query } => vec![("query", query.as_str())],
            Command::Product { sku, desc, price } => vec![
                ("product", "1"),
                ("sku", sku.as_str()),
                ("desc", desc.as_str()),
                ("price", price.as_str()),
            ],
            Command::Customer { name } => vec![("customer", "1"), ("name", name.as_str())],
            Command::Order { cid, sku } => vec![
                ("order", "1"),
                ("cid", cid.as_str()),
                ("sku", sku.as_str()),
            ],
        }
    }

    pub fn to_form_body(&self) -> String {
        form::encode(self.form_pairs())
    }
}
