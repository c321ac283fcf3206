//! Reduces a parse tree into a [`DefinitionTable`]
//!
//! Statements are resolved in source order against the table built so far, so
//! `extends` only merges a base that was already seen and dotted enum member
//! references only resolve against enums declared earlier.
use tracing::{debug, trace};

use super::ast::*;
use super::model::*;

pub fn resolve(script: &Script<'_>) -> DefinitionTable {
    let mut table = DefinitionTable::new();
    resolve_statements(&script.statements, &mut table);
    table
}

fn resolve_statements(statements: &[Statement<'_>], table: &mut DefinitionTable) {
    for statement in statements {
        match statement {
            Statement::Model(m) => {
                let def = resolve_model(m, table);
                table.insert(Definition::Model(def));
            }
            Statement::Enum(e) => table.insert(Definition::Enum(resolve_enum(e))),
            Statement::Namespace { body: Some(body), .. } => resolve_statements(body, table),
            Statement::Namespace { path, body: None } => trace!(namespace = %path.join("."), "file namespace"),
            Statement::Union { name } => trace!(name, "ignoring union"),
            Statement::Operation { name } => trace!(name, "ignoring operation"),
            Statement::Alias { name } => trace!(name, "ignoring alias"),
            Statement::Import(target) => trace!(target, "ignoring import"),
            Statement::Using(path) => trace!(path = %path.join("."), "ignoring using"),
            Statement::Empty => {}
        }
    }
}

fn resolve_model(m: &ModelStatement<'_>, table: &DefinitionTable) -> ModelDef {
    let own: Vec<Field> = m
        .properties
        .iter()
        .filter_map(|p| match p {
            ModelProperty::Field(prop) => Some(resolve_property(prop, table)),
            ModelProperty::Spread(_) => None,
        })
        .collect();

    let base = match &m.heritage {
        Some(Heritage::Extends(TypeExpr::Reference { path, .. })) => Some(path.join(".")),
        _ => None,
    };
    let fields = match base.as_deref() {
        Some(base_name) => {
            let base_def = table.model(base_name);
            if base_def.is_none() {
                debug!(model = m.name, base = base_name, "base model not defined yet, nothing inherited");
            }
            inherit(base_def, own)
        }
        None => own,
    };

    ModelDef {
        name: m.name.to_string(),
        fields,
        base,
    }
}

fn resolve_property(prop: &Property<'_>, table: &DefinitionTable) -> Field {
    let name = if prop.decorators.iter().any(|d| d.is("key")) {
        format!("{}{}", KEY_MARKER, prop.name)
    } else {
        prop.name.to_string()
    };
    let mut shape = classify(&prop.ty, table);
    shape.is_optional |= prop.optional;
    Field { name, shape }
}

fn resolve_enum(e: &EnumStatement<'_>) -> EnumDef {
    EnumDef {
        name: e.name.to_string(),
        members: e
            .members
            .iter()
            .filter_map(|entry| match entry {
                EnumEntry::Member { name, .. } => Some(EnumMember::new(*name)),
                EnumEntry::Spread(_) => None,
            })
            .collect(),
    }
}

/// Base fields first, minus any the subclass redeclares, then the subclass's
/// own fields
pub fn inherit(base: Option<&ModelDef>, own: Vec<Field>) -> Vec<Field> {
    let Some(base) = base else {
        return own;
    };
    let mut fields: Vec<Field> = base
        .fields
        .iter()
        .filter(|f| !own.iter().any(|o| o.bare_name() == f.bare_name()))
        .cloned()
        .collect();
    fields.extend(own);
    fields
}

/// Classifies a type expression, applying `[]` and `?` as flags
pub fn classify(expr: &TypeExpr<'_>, table: &DefinitionTable) -> TypeShape {
    match expr {
        TypeExpr::Reference { path, .. } => classify_name(&path.join("."), table),
        TypeExpr::Literal(Literal::String(_)) => TypeShape::primitive(Primitive::String),
        TypeExpr::Literal(Literal::Numeric(_)) => TypeShape::primitive(Primitive::Integer),
        TypeExpr::Literal(Literal::Boolean(_)) => TypeShape::primitive(Primitive::Boolean),
        TypeExpr::Array(inner) => classify(inner, table).array(),
        TypeExpr::Optional(inner) => classify(inner, table).optional(),
        TypeExpr::Union(variants)
            if variants
                .iter()
                .all(|v| matches!(v, TypeExpr::Literal(Literal::String(_)))) =>
        {
            TypeShape::primitive(Primitive::String)
        }
        TypeExpr::Union(_) | TypeExpr::Intersection(_) | TypeExpr::Model(_) | TypeExpr::Tuple(_) => {
            TypeShape::reference(OPAQUE_TYPE)
        }
    }
}

/// Classifies a bare (suffix-free) type name.
///
/// Primitives map directly. `Enum.member` becomes a reference to the
/// normalized member when `Enum` is a known enum, degrades to `Left` when it
/// is some other known definition and to `string` otherwise. A plain name is a
/// reference when it is already defined or looks like a type name
/// (capitalized); anything else is an unknown lowercase type and falls back to
/// `string`.
pub fn classify_name(name: &str, table: &DefinitionTable) -> TypeShape {
    if let Some(p) = Primitive::from_name(name) {
        return TypeShape::primitive(p);
    }
    if let Some((left, member)) = name.rsplit_once('.') {
        return if table.is_enum(left) {
            TypeShape::reference(format!("{}.{}", left, normalize_member(member)))
        } else if table.contains(left) {
            TypeShape::reference(left)
        } else {
            TypeShape::primitive(Primitive::String)
        };
    }
    if table.contains(name) || name.starts_with(|ch: char| ch.is_ascii_uppercase()) {
        TypeShape::reference(name)
    } else {
        TypeShape::primitive(Primitive::String)
    }
}
