//! Contains the parse tree which is output by the grammar engine
//!
//! Nothing here is resolved yet: type names are still names, inheritance has
//! not been merged and decorators are kept as written. `resolve` turns a
//! [`Script`] into a `DefinitionTable`.
use super::parser::GrammarError;

/// A whole source file, plus every span grammar recovery had to skip
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Script<'s> {
    pub statements: Vec<Statement<'s>>,
    pub skipped: Vec<GrammarError>,
}

impl<'s> Script<'s> {
    /// Whether any model or enum was recognized, including inside namespace
    /// blocks
    pub fn has_definitions(&self) -> bool { self.statements.iter().any(Statement::has_definitions) }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Statement<'s> {
    Model(ModelStatement<'s>),
    Enum(EnumStatement<'s>),
    /// `namespace A.B;` or `namespace A.B { ... }`
    Namespace {
        path: Vec<&'s str>,
        body: Option<Vec<Statement<'s>>>,
    },
    Union {
        name: &'s str,
    },
    Operation {
        name: &'s str,
    },
    Alias {
        name: &'s str,
    },
    Import(&'s str),
    Using(Vec<&'s str>),
    /// A lone `;`
    Empty,
}

impl<'s> Statement<'s> {
    fn has_definitions(&self) -> bool {
        match self {
            Statement::Model(_) | Statement::Enum(_) => true,
            Statement::Namespace { body: Some(body), .. } => body.iter().any(Statement::has_definitions),
            _ => false,
        }
    }
}

/// `@name` or `@name(args)`; `args` is kept as raw text
#[derive(Clone, PartialEq, Debug)]
pub struct Decorator<'s> {
    pub path: Vec<&'s str>,
    pub args: Option<&'s str>,
}

impl<'s> Decorator<'s> {
    pub fn is(&self, name: &str) -> bool { self.path.len() == 1 && self.path[0] == name }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Heritage<'s> {
    Extends(TypeExpr<'s>),
    Is(TypeExpr<'s>),
}

#[derive(Clone, PartialEq, Debug)]
pub struct ModelStatement<'s> {
    pub decorators: Vec<Decorator<'s>>,
    pub name: &'s str,
    pub template_params: Vec<&'s str>,
    pub heritage: Option<Heritage<'s>>,
    pub properties: Vec<ModelProperty<'s>>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ModelProperty<'s> {
    Field(Property<'s>),
    /// `...Other`
    Spread(TypeExpr<'s>),
}

/// `@dec name?: type`, where `name` may also have been a string literal
#[derive(Clone, PartialEq, Debug)]
pub struct Property<'s> {
    pub decorators: Vec<Decorator<'s>>,
    pub name: &'s str,
    pub optional: bool,
    pub ty: TypeExpr<'s>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Literal<'s> {
    String(&'s str),
    Numeric(&'s str),
    Boolean(bool),
}

#[derive(Clone, PartialEq, Debug)]
pub enum TypeExpr<'s> {
    /// `A` or `A.B`, with any template arguments
    Reference {
        path: Vec<&'s str>,
        args: Vec<TypeExpr<'s>>,
    },
    Literal(Literal<'s>),
    /// `T[]`
    Array(Box<TypeExpr<'s>>),
    /// `T?`
    Optional(Box<TypeExpr<'s>>),
    Union(Vec<TypeExpr<'s>>),
    Intersection(Vec<TypeExpr<'s>>),
    /// An inline `{ ... }` model
    Model(Vec<ModelProperty<'s>>),
    /// `[A, B]`
    Tuple(Vec<TypeExpr<'s>>),
}

impl<'s> TypeExpr<'s> {
    pub fn reference(path: &[&'s str]) -> TypeExpr<'s> {
        TypeExpr::Reference {
            path: path.to_vec(),
            args: Vec::new(),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct EnumStatement<'s> {
    pub decorators: Vec<Decorator<'s>>,
    pub name: &'s str,
    pub members: Vec<EnumEntry<'s>>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum EnumEntry<'s> {
    /// The member's spelling, without quotes; any `: value` is dropped
    Member {
        decorators: Vec<Decorator<'s>>,
        name: &'s str,
    },
    /// `...Other`
    Spread(TypeExpr<'s>),
}
