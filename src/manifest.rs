/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Navigable view of a protobuf-compiled `AndroidManifest.xml`.
//!
//! Attribute and tag names are normalised to snake_case (`versionCode` is
//! `version_code`, `uses-permission` is `uses_permission`) and lookups
//! normalise their argument the same way.

use crate::{
    error::{FormatError, InspectError},
    intent_filter,
    protobuf::{item, primitive::OneofValue, xml_node, XmlAttribute, XmlElement, XmlNode},
    resources::{ResourceResolver, ResourceTable},
};
use prost::Message;
use std::{collections::HashMap, fmt};

/// Tags that occur at most once under their parent.
pub const UNIQUE_TAGS: [&str; 2] = ["uses_sdk", "application"];

const COMPONENT_TAGS: [&str; 5] = ["activity", "activity_alias", "service", "receiver", "provider"];
const FEATURE_WATCH: &str = "android.hardware.type.watch";
const FEATURE_TELEVISION: &str = "android.software.leanback";
const FEATURE_AUTOMOTIVE: &str = "android.hardware.type.automotive";

/// Converts `camelCase`, `PascalCase` and `kebab-case` names to snake_case.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let after_word = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let acronym_end = prev.is_ascii_uppercase() && next_lower;
            if after_word || acronym_end {
                out.push('_');
            }
        }
        if c == '-' {
            out.push('_');
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

/// A primitive attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Str(String),
    Int(i64),
    Bool(bool),
    Float(f64),
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Str(s) => write!(f, "{}", s),
            Primitive::Int(i) => write!(f, "{}", i),
            Primitive::Bool(b) => write!(f, "{}", b),
            Primitive::Float(v) => write!(f, "{}", v),
        }
    }
}

impl Primitive {
    /// Decodes a compiled primitive; null and empty carry no value.
    pub(crate) fn from_compiled(value: &OneofValue) -> Option<Self> {
        Some(match value {
            OneofValue::NullValue(_) | OneofValue::EmptyValue(_) => return None,
            OneofValue::FloatValue(v)
            | OneofValue::DimensionValueDeprecated(v)
            | OneofValue::FractionValueDeprecated(v) => Primitive::Float(*v as f64),
            OneofValue::IntDecimalValue(v) => Primitive::Int(*v as i64),
            OneofValue::BooleanValue(v) => Primitive::Bool(*v),
            OneofValue::DimensionValue(v)
            | OneofValue::FractionValue(v)
            | OneofValue::IntHexadecimalValue(v)
            | OneofValue::ColorArgb8Value(v)
            | OneofValue::ColorRgb8Value(v)
            | OneofValue::ColorArgb4Value(v)
            | OneofValue::ColorRgb4Value(v) => Primitive::Int(*v as i64),
        })
    }
}

/// Decoded value of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Primitive(Primitive),
    /// Resource id to resolve through a resource table
    Reference(u32),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Primitive(Primitive::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Integers, plus strings that parse as one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Primitive(Primitive::Int(i)) => Some(*i),
            AttributeValue::Primitive(Primitive::Str(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<u32> {
        match self {
            AttributeValue::Reference(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Primitive(p) => write!(f, "{}", p),
            AttributeValue::Reference(id) => write!(f, "@0x{:08x}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub namespace_uri: String,
    /// Name as written in the document
    pub name: String,
    pub value: AttributeValue,
    pub resource_id: Option<u32>,
}

impl Attribute {
    /// Compiled primitive, then compiled reference, then the raw string.
    fn from_proto(attr: &XmlAttribute) -> Self {
        let compiled = attr.compiled_item.as_ref().and_then(|i| i.value.as_ref());
        let primitive = match compiled {
            Some(item::Value::Prim(p)) => p.oneof_value.as_ref().and_then(Primitive::from_compiled),
            _ => None,
        };
        let value = match (primitive, compiled) {
            (Some(p), _) => AttributeValue::Primitive(p),
            (None, Some(item::Value::Ref(r))) => AttributeValue::Reference(r.id),
            (None, Some(item::Value::Str(s))) if attr.value.is_empty() => {
                AttributeValue::Primitive(Primitive::Str(s.value.clone()))
            }
            _ => AttributeValue::Primitive(Primitive::Str(attr.value.clone())),
        };
        Self {
            namespace_uri: attr.namespace_uri.clone(),
            name: attr.name.clone(),
            value,
            resource_id: (attr.resource_id != 0).then_some(attr.resource_id),
        }
    }
}

/// Children sharing one tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Children {
    Single(ManifestNode),
    Multiple(Vec<ManifestNode>),
}

impl Children {
    pub fn as_slice(&self) -> &[ManifestNode] {
        match self {
            Children::Single(node) => std::slice::from_ref(node),
            Children::Multiple(nodes) => nodes,
        }
    }
}

/// One element of the manifest tree. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestNode {
    name: String,
    attributes: HashMap<String, Attribute>,
    children: HashMap<String, Children>,
}

impl ManifestNode {
    pub fn decode(bytes: &[u8]) -> Result<Self, InspectError> {
        let node = XmlNode::decode(bytes)?;
        Self::from_xml_node(&node)
    }

    pub fn from_xml_node(node: &XmlNode) -> Result<Self, InspectError> {
        match &node.node {
            Some(xml_node::Node::Element(element)) => Ok(Self::from_element(element)),
            _ => Err(FormatError::malformed("manifest", "root node is not an element").into()),
        }
    }

    fn from_element(element: &XmlElement) -> Self {
        let attributes = element
            .attribute
            .iter()
            .map(|a| (snake_case(&a.name), Attribute::from_proto(a)))
            .collect();

        let mut children: HashMap<String, Children> = HashMap::new();
        for child in &element.child {
            let Some(xml_node::Node::Element(el)) = &child.node else {
                continue;
            };
            let tag = snake_case(&el.name);
            let node = Self::from_element(el);
            if UNIQUE_TAGS.contains(&tag.as_str()) {
                children.insert(tag, Children::Single(node));
            } else {
                match children
                    .entry(tag)
                    .or_insert_with(|| Children::Multiple(Vec::new()))
                {
                    Children::Multiple(nodes) => nodes.push(node),
                    Children::Single(_) => {}
                }
            }
        }

        Self {
            name: element.name.clone(),
            attributes,
            children,
        }
    }

    /// Element name as written in the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(&snake_case(name))
    }

    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.attribute(name).map(|a| &a.value)
    }

    /// Attribute value rendered as text.
    pub fn string(&self, name: &str) -> Option<String> {
        self.value(name).map(ToString::to_string)
    }

    /// All children with `tag`, in document order; empty when absent.
    pub fn children(&self, tag: &str) -> &[ManifestNode] {
        self.children
            .get(&snake_case(tag))
            .map(Children::as_slice)
            .unwrap_or(&[])
    }

    pub fn children_entry(&self, tag: &str) -> Option<&Children> {
        self.children.get(&snake_case(tag))
    }

    /// The single child for unique tags, the first one otherwise.
    pub fn child(&self, tag: &str) -> Option<&ManifestNode> {
        self.children(tag).first()
    }

    pub fn child_tags(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }
}

/// Form factor inferred from `uses-feature` declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Watch,
    Television,
    Automotive,
    Tablet,
    Phone,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceClass::Watch => "watch",
            DeviceClass::Television => "television",
            DeviceClass::Automotive => "automotive",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Phone => "phone",
        };
        write!(f, "{}", name)
    }
}

/// The decoded manifest plus an optional resource table for references.
pub struct Manifest {
    root: ManifestNode,
    resources: Option<Box<dyn ResourceTable + Send + Sync>>,
}

impl fmt::Debug for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manifest")
            .field("root", &self.root)
            .field("resources", &self.resources.is_some())
            .finish()
    }
}

impl Manifest {
    pub fn new(root: ManifestNode) -> Self {
        Self {
            root,
            resources: None,
        }
    }

    pub fn with_resources(root: ManifestNode, resources: Box<dyn ResourceTable + Send + Sync>) -> Self {
        Self {
            root,
            resources: Some(resources),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, InspectError> {
        Ok(Self::new(ManifestNode::decode(bytes)?))
    }

    pub fn root(&self) -> &ManifestNode {
        &self.root
    }

    pub fn resolver(&self) -> Option<ResourceResolver<'_>> {
        self.resources
            .as_deref()
            .map(|table| ResourceResolver::new(table as &dyn ResourceTable))
    }

    /// Resolves `value` for `locale`; primitives pass through.
    fn resolve(&self, value: &AttributeValue, locale: &str) -> Option<String> {
        match self.resolver() {
            Some(resolver) => resolver.find(value, locale),
            None => match value {
                AttributeValue::Primitive(p) => Some(p.to_string()),
                AttributeValue::Reference(_) => None,
            },
        }
    }

    pub fn application(&self) -> Option<&ManifestNode> {
        self.root.child("application")
    }

    pub fn package_name(&self) -> Option<&str> {
        self.root.value("package").and_then(AttributeValue::as_str)
    }

    pub fn version_code(&self) -> Option<i64> {
        self.root.value("versionCode").and_then(AttributeValue::as_int)
    }

    pub fn version_name(&self) -> Option<String> {
        self.root
            .value("versionName")
            .and_then(|v| self.resolve(v, ""))
    }

    pub fn min_sdk_version(&self) -> Option<i64> {
        self.sdk_value("minSdkVersion")
    }

    pub fn target_sdk_version(&self) -> Option<i64> {
        self.sdk_value("targetSdkVersion")
    }

    fn sdk_value(&self, name: &str) -> Option<i64> {
        self.root
            .child("uses_sdk")
            .and_then(|sdk| sdk.value(name))
            .and_then(AttributeValue::as_int)
    }

    /// Application label for `locale` (`""` is the default locale). Falls
    /// back to the raw attribute when it cannot be resolved.
    pub fn label(&self, locale: &str) -> Option<String> {
        let value = self.application()?.value("label")?;
        self.resolve(value, locale).or_else(|| Some(value.to_string()))
    }

    /// Every configuration of the application icon.
    pub fn icons(&self) -> Vec<String> {
        let Some(value) = self.application().and_then(|app| app.value("icon")) else {
            return Vec::new();
        };
        match (value, self.resources.as_deref()) {
            (AttributeValue::Reference(id), Some(table)) => table
                .entries(*id)
                .into_iter()
                .map(|(_, v)| v)
                .collect(),
            (AttributeValue::Primitive(p), _) => vec![p.to_string()],
            _ => Vec::new(),
        }
    }

    /// Activities, aliases, services, receivers and providers, by kind.
    pub fn components(&self) -> Vec<&ManifestNode> {
        let Some(app) = self.application() else {
            return Vec::new();
        };
        COMPONENT_TAGS
            .iter()
            .flat_map(|tag| app.children(tag))
            .collect()
    }

    fn application_children(&self, tag: &str) -> &[ManifestNode] {
        self.application().map(|app| app.children(tag)).unwrap_or(&[])
    }

    pub fn activities(&self) -> &[ManifestNode] {
        self.application_children("activity")
    }

    pub fn services(&self) -> &[ManifestNode] {
        self.application_children("service")
    }

    pub fn receivers(&self) -> &[ManifestNode] {
        self.application_children("receiver")
    }

    pub fn providers(&self) -> &[ManifestNode] {
        self.application_children("provider")
    }

    fn names_of(&self, tag: &str) -> Vec<String> {
        self.root
            .children(tag)
            .iter()
            .filter_map(|n| n.string("name"))
            .collect()
    }

    pub fn use_permissions(&self) -> Vec<String> {
        self.names_of("uses-permission")
    }

    pub fn use_features(&self) -> Vec<String> {
        self.names_of("uses-feature")
    }

    /// Tablets cannot be told apart from phones by the manifest alone.
    pub fn device(&self) -> DeviceClass {
        let features = self.use_features();
        let has = |f: &str| features.iter().any(|x| x == f);
        if has(FEATURE_WATCH) {
            DeviceClass::Watch
        } else if has(FEATURE_TELEVISION) {
            DeviceClass::Television
        } else if has(FEATURE_AUTOMOTIVE) {
            DeviceClass::Automotive
        } else {
            DeviceClass::Phone
        }
    }

    /// Hosts of browsable http(s) intent filters across all activities.
    pub fn deep_links(&self) -> Vec<String> {
        self.collect_filters(intent_filter::deep_links)
    }

    /// Custom URL schemes of browsable intent filters across all activities.
    pub fn schemes(&self) -> Vec<String> {
        self.collect_filters(intent_filter::schemes)
    }

    fn collect_filters(&self, search: fn(&ManifestNode) -> Vec<String>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for activity in self.activities() {
            for filter in intent_filter::intent_filters(activity) {
                for value in search(filter) {
                    if !out.contains(&value) {
                        out.push(value);
                    }
                }
            }
        }
        out
    }
}
