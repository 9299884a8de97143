/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Resource id lookup for manifest references.

use crate::{
    error::InspectError,
    manifest::{AttributeValue, Primitive},
    protobuf::{self, item, value},
};
use prost::Message;
use std::collections::HashMap;

/// Locale of the default configuration.
pub const DEFAULT_LOCALE: &str = "";

/// A source of resolved resource values.
pub trait ResourceTable {
    /// Value of `id` configured for exactly `locale`.
    fn lookup(&self, id: u32, locale: &str) -> Option<String>;

    /// Every `(locale, value)` configured for `id`, in table order.
    fn entries(&self, id: u32) -> Vec<(String, String)>;
}

/// Table decoded from an App Bundle's `resources.pb`.
#[derive(Debug, Clone, Default)]
pub struct ProtoResourceTable {
    values: HashMap<u32, Vec<(String, String)>>,
}

impl ProtoResourceTable {
    pub fn decode(bytes: &[u8]) -> Result<Self, InspectError> {
        let table = protobuf::ResourceTable::decode(bytes)?;
        let mut values: HashMap<u32, Vec<(String, String)>> = HashMap::new();

        for package in &table.package {
            let package_id = package.package_id.as_ref().map_or(0, |p| p.id);
            for ty in &package.r#type {
                let type_id = ty.type_id.as_ref().map_or(0, |t| t.id);
                for entry in &ty.entry {
                    let entry_id = entry.entry_id.as_ref().map_or(0, |e| e.id);
                    let id = (package_id << 24) | (type_id << 16) | entry_id;
                    for config_value in &entry.config_value {
                        let Some(text) = config_value.value.as_ref().and_then(value_text) else {
                            continue;
                        };
                        let locale = config_value
                            .config
                            .as_ref()
                            .map(|c| c.locale.clone())
                            .unwrap_or_default();
                        values.entry(id).or_default().push((locale, text));
                    }
                }
            }
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ResourceTable for ProtoResourceTable {
    fn lookup(&self, id: u32, locale: &str) -> Option<String> {
        self.values
            .get(&id)?
            .iter()
            .find(|(l, _)| l == locale)
            .map(|(_, v)| v.clone())
    }

    fn entries(&self, id: u32) -> Vec<(String, String)> {
        self.values.get(&id).cloned().unwrap_or_default()
    }
}

/// Text of a simple item; compound values are skipped.
fn value_text(v: &protobuf::Value) -> Option<String> {
    let value::Value::Item(item) = v.value.as_ref()? else {
        return None;
    };
    match item.value.as_ref()? {
        item::Value::Str(s) => Some(s.value.clone()),
        item::Value::RawStr(s) => Some(s.value.clone()),
        item::Value::StyledStr(s) => Some(s.value.clone()),
        item::Value::File(f) => Some(f.path.clone()),
        item::Value::Prim(p) => p
            .oneof_value
            .as_ref()
            .and_then(Primitive::from_compiled)
            .map(|p| p.to_string()),
        item::Value::Ref(r) => Some(format!("@0x{:08x}", r.id)),
        item::Value::Id(_) => None,
    }
}

/// Resolves attribute values against a table with default-locale fallback.
pub struct ResourceResolver<'a> {
    table: &'a dyn ResourceTable,
}

impl<'a> ResourceResolver<'a> {
    pub fn new(table: &'a dyn ResourceTable) -> Self {
        Self { table }
    }

    /// Primitives come back as text; references try `locale`, then the
    /// default locale.
    pub fn find(&self, value: &AttributeValue, locale: &str) -> Option<String> {
        match value {
            AttributeValue::Primitive(p) => Some(p.to_string()),
            AttributeValue::Reference(id) => self
                .table
                .lookup(*id, locale)
                .or_else(|| self.table.lookup(*id, DEFAULT_LOCALE)),
        }
    }
}
