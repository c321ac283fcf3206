//! The grammar engine
//!
//! Every rule is an ordered choice over its alternatives: the first one that
//! matches wins and a failed alternative rewinds to where it started. Only
//! models and enums carry data forward; unions, operations, aliases and the
//! namespace/import/using directives are parsed just far enough to be stepped
//! over without losing sync.
use std::iter;

use thiserror::Error;
use tracing::debug;

use super::ast::*;
use super::combinators::{attempt, comma_separated, many, separated, Cursor};

/// No statement could be matched at `offset`
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
#[error("expected {expected} at offset {offset}")]
pub struct GrammarError {
    pub offset: usize,
    pub expected: &'static str,
}

/// What to do when no statement matches at the cursor
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Recovery {
    /// Skip to the next `;` or closing `}` and keep going
    #[default]
    SkipStatement,
    /// Fail the whole input
    Abort,
}

/// An aborted parse, with everything recognized before the mismatch
#[derive(Error, Clone, PartialEq, Debug)]
#[error("{error}")]
pub struct Aborted<'s> {
    pub error: GrammarError,
    pub partial: Script<'s>,
}

/// Parses a whole source file
pub fn script(source: &str, recovery: Recovery) -> Result<Script<'_>, Aborted<'_>> {
    let mut c = Cursor::new(source, recovery);
    let statements = statement_list(&mut c, false);
    let aborted = c.aborted();
    let script = Script {
        statements,
        skipped: c.into_skipped(),
    };
    match aborted {
        Some(error) => Err(Aborted {
            error,
            partial: script,
        }),
        None => Ok(script),
    }
}

/// Statements up to the end of input, or to the `}` closing a block. Under
/// [`Recovery::Abort`] a mismatch stops every enclosing list and keeps what
/// was parsed so far.
fn statement_list<'s>(c: &mut Cursor<'s>, in_block: bool) -> Vec<Statement<'s>> {
    let mut statements = Vec::new();
    while c.aborted().is_none() {
        c.skip_trivia();
        if c.is_eof() || (in_block && c.peek() == Some('}')) {
            break;
        }
        let start = c.pos();
        match attempt(c, statement) {
            Some(s) => statements.push(s),
            None if c.recovery() == Recovery::Abort => {
                let error = c.abort();
                debug!(offset = error.offset, expected = error.expected, "parse aborted");
            }
            None => {
                let error = c.skip_statement(start);
                debug!(
                    offset = error.offset,
                    expected = error.expected,
                    resumed_at = c.pos(),
                    "skipped unrecognized statement"
                );
            }
        }
    }
    statements
}

fn statement<'s>(c: &mut Cursor<'s>) -> Option<Statement<'s>> {
    attempt(c, |c| model_statement(c).map(Statement::Model))
        .or_else(|| attempt(c, |c| enum_statement(c).map(Statement::Enum)))
        .or_else(|| attempt(c, union_statement))
        .or_else(|| attempt(c, operation_statement))
        .or_else(|| attempt(c, namespace_statement))
        .or_else(|| attempt(c, import_statement))
        .or_else(|| attempt(c, using_statement))
        .or_else(|| attempt(c, alias_statement))
        .or_else(|| attempt(c, |c| c.token(";").map(|_| Statement::Empty)))
        .or_else(|| c.fail("statement"))
}

fn member_path<'s>(c: &mut Cursor<'s>) -> Option<Vec<&'s str>> {
    let mut path = vec![c.ident()?];
    path.extend(many(c, |c| {
        c.token(".")?;
        c.ident()
    }));
    Some(path)
}

fn name_or_string<'s>(c: &mut Cursor<'s>) -> Option<&'s str> {
    attempt(c, |c| c.ident()).or_else(|| attempt(c, |c| c.string_literal()))
}

fn decorators<'s>(c: &mut Cursor<'s>) -> Vec<Decorator<'s>> { many(c, decorator) }

fn decorator<'s>(c: &mut Cursor<'s>) -> Option<Decorator<'s>> {
    c.token("@")?;
    // `@@target` is an augment statement, not a prefix
    if c.peek() == Some('@') {
        return c.fail("decorator name");
    }
    let path = member_path(c)?;
    let args = attempt(c, |c| c.balanced(b'(', b')'));
    Some(Decorator { path, args })
}

fn template_parameters<'s>(c: &mut Cursor<'s>) -> Option<Vec<&'s str>> {
    c.token("<")?;
    let params = comma_separated(c, |c| {
        let name = c.ident()?;
        let _ = attempt(c, |c| {
            c.keyword("extends")?;
            expression(c)
        });
        let _ = attempt(c, |c| {
            c.token("=")?;
            expression(c)
        });
        Some(name)
    });
    c.token(">")?;
    Some(params)
}

fn template_arguments<'s>(c: &mut Cursor<'s>) -> Option<Vec<TypeExpr<'s>>> {
    c.token("<")?;
    let args = comma_separated(c, |c| {
        attempt(c, |c| {
            c.ident()?;
            c.token("=")?;
            expression(c)
        })
        .or_else(|| attempt(c, expression))
    });
    c.token(">")?;
    Some(args)
}

fn heritage<'s>(c: &mut Cursor<'s>) -> Option<Heritage<'s>> {
    attempt(c, |c| {
        c.keyword("extends")?;
        expression(c).map(Heritage::Extends)
    })
    .or_else(|| {
        attempt(c, |c| {
            c.keyword("is")?;
            expression(c).map(Heritage::Is)
        })
    })
}

fn model_statement<'s>(c: &mut Cursor<'s>) -> Option<ModelStatement<'s>> {
    let decorators = decorators(c);
    c.keyword("model")?;
    let name = c.ident()?;
    let template_params = attempt(c, template_parameters).unwrap_or_default();
    let heritage = attempt(c, heritage);
    let body = attempt(c, |c| {
        c.token("{")?;
        let properties = separated(c, model_property);
        c.token("}")?;
        Some(properties)
    });
    let properties = match body {
        Some(properties) => properties,
        // `model A is B;` borrows its body wholesale
        None if matches!(heritage, Some(Heritage::Is(_))) => {
            c.token(";")?;
            Vec::new()
        }
        None => return None,
    };
    Some(ModelStatement {
        decorators,
        name,
        template_params,
        heritage,
        properties,
    })
}

fn model_property<'s>(c: &mut Cursor<'s>) -> Option<ModelProperty<'s>> {
    attempt(c, |c| {
        c.token("...")?;
        reference(c).map(ModelProperty::Spread)
    })
    .or_else(|| attempt(c, |c| property(c).map(ModelProperty::Field)))
}

fn property<'s>(c: &mut Cursor<'s>) -> Option<Property<'s>> {
    let decorators = decorators(c);
    let name = name_or_string(c)?;
    let optional = attempt(c, |c| c.token("?")).is_some();
    c.token(":")?;
    let ty = expression(c)?;
    // default values are dropped
    let _ = attempt(c, |c| {
        c.token("=")?;
        expression(c)
    });
    Some(Property {
        decorators,
        name,
        optional,
        ty,
    })
}

fn expression<'s>(c: &mut Cursor<'s>) -> Option<TypeExpr<'s>> {
    c.enter()?;
    let ty = union_expression(c);
    c.leave();
    ty
}

fn union_expression<'s>(c: &mut Cursor<'s>) -> Option<TypeExpr<'s>> {
    let _ = attempt(c, |c| c.token("|"));
    let first = intersection(c)?;
    let rest = many(c, |c| {
        c.token("|")?;
        intersection(c)
    });
    Some(if rest.is_empty() {
        first
    } else {
        TypeExpr::Union(iter::once(first).chain(rest).collect())
    })
}

fn intersection<'s>(c: &mut Cursor<'s>) -> Option<TypeExpr<'s>> {
    let first = postfix(c)?;
    let rest = many(c, |c| {
        c.token("&")?;
        postfix(c)
    });
    Some(if rest.is_empty() {
        first
    } else {
        TypeExpr::Intersection(iter::once(first).chain(rest).collect())
    })
}

/// A primary followed by any mix of `[]` and `?`. Each suffix counts as a
/// nesting level.
fn postfix<'s>(c: &mut Cursor<'s>) -> Option<TypeExpr<'s>> {
    let mut ty = primary(c)?;
    let mut wraps = 0;
    loop {
        if attempt(c, |c| {
            c.token("[")?;
            c.token("]")
        })
        .is_some()
        {
            ty = TypeExpr::Array(Box::new(ty));
        } else if attempt(c, |c| c.token("?")).is_some() {
            ty = TypeExpr::Optional(Box::new(ty));
        } else {
            break;
        }
        c.enter()?;
        wraps += 1;
    }
    for _ in 0..wraps {
        c.leave();
    }
    Some(ty)
}

fn primary<'s>(c: &mut Cursor<'s>) -> Option<TypeExpr<'s>> {
    attempt(c, |c| literal(c).map(TypeExpr::Literal))
        .or_else(|| attempt(c, reference))
        .or_else(|| {
            attempt(c, |c| {
                c.token("(")?;
                let inner = expression(c)?;
                c.token(")")?;
                Some(inner)
            })
        })
        .or_else(|| {
            attempt(c, |c| {
                c.token("{")?;
                let properties = separated(c, model_property);
                c.token("}")?;
                Some(TypeExpr::Model(properties))
            })
        })
        .or_else(|| {
            attempt(c, |c| {
                c.token("[")?;
                let items = comma_separated(c, expression);
                c.token("]")?;
                Some(TypeExpr::Tuple(items))
            })
        })
        .or_else(|| c.fail("type expression"))
}

fn literal<'s>(c: &mut Cursor<'s>) -> Option<Literal<'s>> {
    attempt(c, |c| c.string_literal().map(Literal::String))
        .or_else(|| attempt(c, |c| c.keyword("true").map(|_| Literal::Boolean(true))))
        .or_else(|| attempt(c, |c| c.keyword("false").map(|_| Literal::Boolean(false))))
        .or_else(|| attempt(c, |c| c.numeric_literal().map(Literal::Numeric)))
}

fn reference<'s>(c: &mut Cursor<'s>) -> Option<TypeExpr<'s>> {
    let path = member_path(c)?;
    let args = attempt(c, template_arguments).unwrap_or_default();
    Some(TypeExpr::Reference { path, args })
}

fn enum_statement<'s>(c: &mut Cursor<'s>) -> Option<EnumStatement<'s>> {
    let decorators = decorators(c);
    c.keyword("enum")?;
    let name = c.ident()?;
    c.token("{")?;
    let members = separated(c, enum_entry);
    c.token("}")?;
    Some(EnumStatement {
        decorators,
        name,
        members,
    })
}

fn enum_entry<'s>(c: &mut Cursor<'s>) -> Option<EnumEntry<'s>> {
    attempt(c, |c| {
        c.token("...")?;
        reference(c).map(EnumEntry::Spread)
    })
    .or_else(|| {
        attempt(c, |c| {
            let decorators = decorators(c);
            let name = name_or_string(c)?;
            let _ = attempt(c, |c| {
                c.token(":")?;
                attempt(c, |c| c.string_literal()).or_else(|| attempt(c, |c| c.numeric_literal()))
            });
            Some(EnumEntry::Member { decorators, name })
        })
    })
}

fn union_statement<'s>(c: &mut Cursor<'s>) -> Option<Statement<'s>> {
    let _ = decorators(c);
    c.keyword("union")?;
    let name = c.ident()?;
    let _ = attempt(c, template_parameters);
    c.token("{")?;
    let _ = separated(c, |c| {
        let _ = decorators(c);
        attempt(c, |c| {
            name_or_string(c)?;
            c.token(":")?;
            expression(c)
        })
        .or_else(|| attempt(c, expression))
    });
    c.token("}")?;
    Some(Statement::Union { name })
}

fn operation_statement<'s>(c: &mut Cursor<'s>) -> Option<Statement<'s>> {
    let _ = decorators(c);
    c.keyword("op")?;
    let name = c.ident()?;
    let _ = attempt(c, template_parameters);
    attempt(c, |c| {
        c.token("(")?;
        let _ = separated(c, |c| {
            attempt(c, |c| {
                c.token("...")?;
                reference(c).map(|_| ())
            })
            .or_else(|| attempt(c, |c| property(c).map(|_| ())))
        });
        c.token(")")?;
        c.token(":")?;
        expression(c).map(|_| ())
    })
    .or_else(|| {
        attempt(c, |c| {
            c.keyword("is")?;
            reference(c).map(|_| ())
        })
    })?;
    c.token(";")?;
    Some(Statement::Operation { name })
}

fn namespace_statement<'s>(c: &mut Cursor<'s>) -> Option<Statement<'s>> {
    let _ = decorators(c);
    c.keyword("namespace")?;
    let path = member_path(c)?;
    let body = attempt(c, |c| c.token(";").map(|_| None)).or_else(|| {
        attempt(c, |c| {
            c.token("{")?;
            c.enter()?;
            let body = statement_list(c, true);
            c.leave();
            // an unclosed block runs to the end of input
            if c.aborted().is_none() && !c.is_eof() {
                c.token("}")?;
            }
            Some(Some(body))
        })
    })?;
    Some(Statement::Namespace { path, body })
}

fn import_statement<'s>(c: &mut Cursor<'s>) -> Option<Statement<'s>> {
    c.keyword("import")?;
    let target = c.string_literal()?;
    c.token(";")?;
    Some(Statement::Import(target))
}

fn using_statement<'s>(c: &mut Cursor<'s>) -> Option<Statement<'s>> {
    c.keyword("using")?;
    let path = member_path(c)?;
    c.token(";")?;
    Some(Statement::Using(path))
}

fn alias_statement<'s>(c: &mut Cursor<'s>) -> Option<Statement<'s>> {
    let _ = decorators(c);
    c.keyword("alias")?;
    let name = c.ident()?;
    let _ = attempt(c, template_parameters);
    c.token("=")?;
    expression(c)?;
    c.token(";")?;
    Some(Statement::Alias { name })
}
