//! Parses a subset of TypeSpec into a table of models and enums, and renders
//! that table as Python dataclasses or TypeScript declarations.
//!
//! ```
//! let table = typespec::parse("model Address { street: string; city: string; }");
//! let python = typespec::gen::generate::<typespec::gen::python::Python>(&table);
//! assert!(python.contains("class Address:"));
//! ```
use std::fs;
use std::io;

use thiserror::Error;

#[macro_use]
mod macros;
pub mod ast;
pub mod combinators;
pub mod fallback;
pub mod gen;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod resolve;
pub mod scan;

pub use model::DefinitionTable;
pub use pipeline::{ParseOptions, Pipeline};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parsing failed with:\n{0}")]
    Parse(String),
    /// Parsing stopped early; `partial` holds what was resolved before it did
    #[error("Parsing stopped early with:\n{report}")]
    Incomplete {
        report: String,
        partial: DefinitionTable,
    },
    #[error("Failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Line and column (both 1-based, column in chars) of a byte offset
fn line_col(file: &str, offset: usize) -> (usize, usize) {
    let before = &file[..offset.min(file.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |n| n + 1);
    (line, before[line_start..].chars().count() + 1)
}

pub(crate) fn pretty_error(file: &str, err: &parser::GrammarError) -> String {
    let (line, column) = line_col(file, err.offset);
    let mut out_str = String::new();
    out_str += &format!(
        "\nUnexpected token '{}' at line {}, column {}, expected {}",
        file.get(err.offset..).and_then(|s| s.chars().next()).unwrap_or('\0'),
        line,
        column,
        err.expected
    );
    let line = file.split('\n').nth(line - 1).unwrap_or("\0");
    out_str += &format!("\n|\n|  {}\n", line);
    out_str += &format!("|~~{}^\n", "~".repeat(column - 1));

    out_str
}

/// Parses with the default strategy chain. Never fails; see [`Pipeline::parse`].
pub fn parse(content: &str) -> DefinitionTable { Pipeline::default().parse(content) }

pub fn parse_with(content: &str, options: &ParseOptions) -> DefinitionTable { Pipeline::new(options).parse(content) }

pub fn parse_file(path: &str) -> Result<DefinitionTable, Error> {
    let file = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_string(),
        source,
    })?;
    Ok(parse(&file))
}

/// Parses `schema` and renders it for `Lang`
pub fn compile<Lang>(schema: &str) -> String
where
    Lang: gen::Language + Default + gen::Common,
    model::EnumDef: gen::Definition<Lang>,
    model::ModelDef: gen::Definition<Lang>,
{
    gen::generate::<Lang>(&parse(schema))
}

/// A reusable parser that keeps the table from its latest [`parse`](TypeSpecParser::parse)
///
/// Each call replaces the previous table. Use one instance per thread.
#[derive(Debug, Default)]
pub struct TypeSpecParser {
    pipeline: Pipeline,
    definitions: DefinitionTable,
}

impl TypeSpecParser {
    pub fn new(options: &ParseOptions) -> TypeSpecParser {
        TypeSpecParser {
            pipeline: Pipeline::new(options),
            definitions: DefinitionTable::new(),
        }
    }

    pub fn parse(&mut self, content: &str) -> &DefinitionTable {
        self.definitions = self.pipeline.parse(content);
        &self.definitions
    }

    pub fn definitions(&self) -> &DefinitionTable { &self.definitions }

    pub fn generate<Lang>(&self) -> String
    where
        Lang: gen::Language + Default + gen::Common,
        model::EnumDef: gen::Definition<Lang>,
        model::ModelDef: gen::Definition<Lang>,
    {
        gen::generate::<Lang>(&self.definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_file() {
        let table = parse_file("resource/example.tsp").unwrap();
        assert!(table.model("User").is_some());
    }

    #[test]
    fn parses_str() {
        let content = include_str!("../../resource/example.tsp");
        assert_eq!(parse(content), parse_file("resource/example.tsp").unwrap());
    }

    #[test]
    fn missing_file() {
        match parse_file("resource/does-not-exist.tsp") {
            Err(Error::Read { path, .. }) => assert_eq!(path, "resource/does-not-exist.tsp"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn pretty_error_points_at_column() {
        let file = "model A {}\nmodel B { x }";
        let err = parser::GrammarError {
            offset: file.find(" }").unwrap() - 1,
            expected: ":",
        };
        assert_eq!(
            pretty_error(file, &err),
            "
Unexpected token 'x' at line 2, column 11, expected :
|
|  model B { x }
|~~~~~~~~~~~~^
"
        );
    }

    #[test]
    fn pretty_error_at_end_of_input() {
        let file = "model A {";
        let err = parser::GrammarError {
            offset: file.len(),
            expected: "}",
        };
        assert!(pretty_error(file, &err).starts_with("\nUnexpected token '\0' at line 1, column 10"));
    }

    #[test]
    fn parser_instance_resets_between_calls() {
        let mut parser = TypeSpecParser::default();
        parser.parse("model A {}");
        let second = parser.parse("enum B { x }").clone();
        assert_eq!(second.names().collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(parser.definitions(), &second);
    }

    #[test]
    fn compile_python() {
        let out = compile::<gen::python::Python>("enum Status { active }");
        assert!(out.ends_with("class Status(Enum):\n    ACTIVE = 'active'\n"));
    }
}
