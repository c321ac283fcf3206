//! The resolved data model every strategy produces and every backend reads
use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix a `@key` field's stored name carries
pub const KEY_MARKER: &str = "@key:";

/// Reference written for shapes the data model cannot express (non-literal
/// unions, intersections, inline models, tuples)
pub const OPAQUE_TYPE: &str = "object";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Primitive {
    String,
    Integer,
    Boolean,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Primitive> {
        match name {
            "string" => Some(Primitive::String),
            "integer" | "int32" => Some(Primitive::Integer),
            "boolean" => Some(Primitive::Boolean),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Integer => "integer",
            Primitive::Boolean => "boolean",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeKind {
    Primitive(Primitive),
    /// A named definition; it does not have to exist
    Reference(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeShape {
    pub kind: TypeKind,
    pub is_array: bool,
    pub is_optional: bool,
}

impl TypeShape {
    pub fn primitive(p: Primitive) -> TypeShape {
        TypeShape {
            kind: TypeKind::Primitive(p),
            is_array: false,
            is_optional: false,
        }
    }

    pub fn reference(name: impl Into<String>) -> TypeShape {
        TypeShape {
            kind: TypeKind::Reference(name.into()),
            is_array: false,
            is_optional: false,
        }
    }

    pub fn array(mut self) -> TypeShape {
        self.is_array = true;
        self
    }

    pub fn optional(mut self) -> TypeShape {
        self.is_optional = true;
        self
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Field {
    /// The declared name, prefixed with [`KEY_MARKER`] for `@key` fields
    pub name: String,
    pub shape: TypeShape,
}

impl Field {
    pub fn new(name: impl Into<String>, shape: TypeShape) -> Field {
        Field {
            name: name.into(),
            shape,
        }
    }

    pub fn is_key(&self) -> bool { self.name.starts_with(KEY_MARKER) }

    /// The name without the key marker
    pub fn bare_name(&self) -> &str { self.name.strip_prefix(KEY_MARKER).unwrap_or(&self.name) }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumMember {
    pub raw: String,
}

impl EnumMember {
    pub fn new(raw: impl Into<String>) -> EnumMember { EnumMember { raw: raw.into() } }

    pub fn symbol(&self) -> String { normalize_member(&self.raw) }
}

static MEMBER_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[- ]+").unwrap());

/// Upper-cases `raw` and turns each run of `-`/space into a single `_`.
///
/// Idempotent: a normalized spelling has no `-`, spaces or lowercase left.
pub fn normalize_member(raw: &str) -> String { MEMBER_SEPARATORS.replace_all(&raw.to_uppercase(), "_").into_owned() }

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModelDef {
    pub name: String,
    pub fields: Vec<Field>,
    /// The `extends` base, whether or not it resolved
    pub base: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<EnumMember>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Definition {
    Model(ModelDef),
    Enum(EnumDef),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Model(m) => &m.name,
            Definition::Enum(e) => &e.name,
        }
    }
}

/// Definitions by name, in first-seen order
#[derive(Clone, Debug, Default)]
pub struct DefinitionTable {
    defs: IndexMap<String, Definition>,
}

impl DefinitionTable {
    pub fn new() -> DefinitionTable { DefinitionTable::default() }

    /// Inserts `def`; a redefinition replaces the old value but keeps its slot
    pub fn insert(&mut self, def: Definition) {
        self.defs.insert(def.name().to_string(), def);
    }

    pub fn get(&self, name: &str) -> Option<&Definition> { self.defs.get(name) }

    pub fn model(&self, name: &str) -> Option<&ModelDef> {
        match self.get(name) {
            Some(Definition::Model(m)) => Some(m),
            _ => None,
        }
    }

    pub fn is_enum(&self, name: &str) -> bool { matches!(self.get(name), Some(Definition::Enum(_))) }

    pub fn contains(&self, name: &str) -> bool { self.defs.contains_key(name) }

    pub fn iter(&self) -> impl Iterator<Item = &Definition> { self.defs.values() }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDef> {
        self.iter().filter_map(|d| match d {
            Definition::Enum(e) => Some(e),
            _ => None,
        })
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelDef> {
        self.iter().filter_map(|d| match d {
            Definition::Model(m) => Some(m),
            _ => None,
        })
    }

    /// Adds every definition of `other` whose name is not taken yet
    pub fn fill_from(&mut self, other: DefinitionTable) {
        for (name, def) in other.defs {
            self.defs.entry(name).or_insert(def);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> { self.defs.keys().map(String::as_str) }

    pub fn len(&self) -> usize { self.defs.len() }

    pub fn is_empty(&self) -> bool { self.defs.is_empty() }
}

// IndexMap equality ignores order
impl PartialEq for DefinitionTable {
    fn eq(&self, other: &DefinitionTable) -> bool { self.defs.iter().eq(other.defs.iter()) }
}

impl Eq for DefinitionTable {}

impl FromIterator<Definition> for DefinitionTable {
    fn from_iter<I: IntoIterator<Item = Definition>>(iter: I) -> DefinitionTable {
        let mut table = DefinitionTable::new();
        for def in iter {
            table.insert(def);
        }
        table
    }
}
