/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! aapt2 protobuf messages found in Android App Bundles.
//!
//! Only the fields needed to read `AndroidManifest.xml` and `resources.pb`
//! are declared; prost skips everything else. Field numbers follow aapt2's
//! `Resources.proto`.

/// A node of a compiled XML document.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct XmlNode {
    #[prost(oneof = "xml_node::Node", tags = "1, 2")]
    pub node: Option<xml_node::Node>,
    #[prost(message, optional, tag = "3")]
    pub source: Option<SourcePosition>,
}

pub mod xml_node {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Node {
        #[prost(message, tag = "1")]
        Element(super::XmlElement),
        #[prost(string, tag = "2")]
        Text(String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct XmlElement {
    #[prost(message, repeated, tag = "1")]
    pub namespace_declaration: Vec<XmlNamespace>,
    #[prost(string, tag = "2")]
    pub namespace_uri: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(message, repeated, tag = "4")]
    pub attribute: Vec<XmlAttribute>,
    #[prost(message, repeated, tag = "5")]
    pub child: Vec<XmlNode>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct XmlNamespace {
    #[prost(string, tag = "1")]
    pub prefix: String,
    #[prost(string, tag = "2")]
    pub uri: String,
    #[prost(message, optional, tag = "3")]
    pub source: Option<SourcePosition>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct XmlAttribute {
    #[prost(string, tag = "1")]
    pub namespace_uri: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub value: String,
    #[prost(message, optional, tag = "4")]
    pub source: Option<SourcePosition>,
    #[prost(uint32, tag = "5")]
    pub resource_id: u32,
    #[prost(message, optional, tag = "6")]
    pub compiled_item: Option<Item>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SourcePosition {
    #[prost(uint32, tag = "1")]
    pub line_number: u32,
    #[prost(uint32, tag = "2")]
    pub column_number: u32,
}

/// A compiled resource value.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Item {
    #[prost(oneof = "item::Value", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub value: Option<item::Value>,
}

pub mod item {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(message, tag = "1")]
        Ref(super::Reference),
        #[prost(message, tag = "2")]
        Str(super::StringValue),
        #[prost(message, tag = "3")]
        RawStr(super::RawString),
        #[prost(message, tag = "4")]
        StyledStr(super::StyledString),
        #[prost(message, tag = "5")]
        File(super::FileReference),
        #[prost(message, tag = "6")]
        Id(super::Id),
        #[prost(message, tag = "7")]
        Prim(super::Primitive),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Reference {
    /// 0 = reference, 1 = attribute
    #[prost(int32, tag = "1")]
    pub r#type: i32,
    #[prost(uint32, tag = "2")]
    pub id: u32,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(bool, tag = "4")]
    pub private: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringValue {
    #[prost(string, tag = "1")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RawString {
    #[prost(string, tag = "1")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StyledString {
    #[prost(string, tag = "1")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileReference {
    #[prost(string, tag = "1")]
    pub path: String,
    #[prost(int32, tag = "2")]
    pub r#type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Id {}

/// A primitive value: number, boolean, color, dimension or null.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Primitive {
    #[prost(
        oneof = "primitive::OneofValue",
        tags = "1, 2, 3, 13, 14, 6, 7, 8, 9, 10, 11, 12, 4, 5"
    )]
    pub oneof_value: Option<primitive::OneofValue>,
}

pub mod primitive {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct NullType {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EmptyType {}

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum OneofValue {
        #[prost(message, tag = "1")]
        NullValue(NullType),
        #[prost(message, tag = "2")]
        EmptyValue(EmptyType),
        #[prost(float, tag = "3")]
        FloatValue(f32),
        #[prost(uint32, tag = "13")]
        DimensionValue(u32),
        #[prost(uint32, tag = "14")]
        FractionValue(u32),
        #[prost(int32, tag = "6")]
        IntDecimalValue(i32),
        #[prost(uint32, tag = "7")]
        IntHexadecimalValue(u32),
        #[prost(bool, tag = "8")]
        BooleanValue(bool),
        #[prost(uint32, tag = "9")]
        ColorArgb8Value(u32),
        #[prost(uint32, tag = "10")]
        ColorRgb8Value(u32),
        #[prost(uint32, tag = "11")]
        ColorArgb4Value(u32),
        #[prost(uint32, tag = "12")]
        ColorRgb4Value(u32),
        #[prost(float, tag = "4")]
        DimensionValueDeprecated(f32),
        #[prost(float, tag = "5")]
        FractionValueDeprecated(f32),
    }
}

/// Top level of `resources.pb`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResourceTable {
    #[prost(message, optional, tag = "1")]
    pub source_pool: Option<StringPool>,
    #[prost(message, repeated, tag = "2")]
    pub package: Vec<Package>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringPool {
    #[prost(bytes = "vec", tag = "1")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PackageId {
    #[prost(uint32, tag = "1")]
    pub id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Package {
    #[prost(message, optional, tag = "1")]
    pub package_id: Option<PackageId>,
    #[prost(string, tag = "2")]
    pub package_name: String,
    #[prost(message, repeated, tag = "3")]
    pub r#type: Vec<Type>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeId {
    #[prost(uint32, tag = "1")]
    pub id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Type {
    #[prost(message, optional, tag = "1")]
    pub type_id: Option<TypeId>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, repeated, tag = "3")]
    pub entry: Vec<Entry>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EntryId {
    #[prost(uint32, tag = "1")]
    pub id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Entry {
    #[prost(message, optional, tag = "1")]
    pub entry_id: Option<EntryId>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, repeated, tag = "6")]
    pub config_value: Vec<ConfigValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigValue {
    #[prost(message, optional, tag = "1")]
    pub config: Option<Configuration>,
    #[prost(message, optional, tag = "2")]
    pub value: Option<Value>,
}

/// Device configuration qualifiers; only the locale is read.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Configuration {
    #[prost(uint32, tag = "1")]
    pub mcc: u32,
    #[prost(uint32, tag = "2")]
    pub mnc: u32,
    #[prost(string, tag = "3")]
    pub locale: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(string, tag = "2")]
    pub comment: String,
    #[prost(bool, tag = "3")]
    pub weak: bool,
    #[prost(oneof = "value::Value", tags = "4, 5")]
    pub value: Option<value::Value>,
}

pub mod value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(message, tag = "4")]
        Item(super::Item),
        #[prost(message, tag = "5")]
        CompoundValue(super::CompoundValue),
    }
}

/// Styles, arrays, plurals and friends; their contents are not read.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CompoundValue {}
