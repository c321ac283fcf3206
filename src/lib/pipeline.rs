//! The ordered chain of parsing strategies
//!
//! Each strategy turns source text into a [`DefinitionTable`] or reports a
//! hard failure. The first one that succeeds wins. Definitions a failed
//! strategy did recognize are kept: they take precedence over the winner's
//! and are all that is returned when every strategy fails.
use std::fmt::Debug;

use tracing::{debug, warn};

use super::model::DefinitionTable;
use super::parser::{self, Recovery};
use super::{fallback, pretty_error, resolve, Error};

pub trait Strategy: Debug {
    fn name(&self) -> &'static str;
    fn parse(&self, source: &str) -> Result<DefinitionTable, Error>;
}

/// The grammar engine followed by resolution
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct GrammarStrategy {
    pub recovery: Recovery,
}

impl Strategy for GrammarStrategy {
    fn name(&self) -> &'static str { "grammar" }

    fn parse(&self, source: &str) -> Result<DefinitionTable, Error> {
        let script = parser::script(source, self.recovery).map_err(|aborted| Error::Incomplete {
            report: pretty_error(source, &aborted.error),
            partial: resolve::resolve(&aborted.partial),
        })?;
        if !script.has_definitions() {
            if let Some(first) = script.skipped.first() {
                return Err(Error::Parse(pretty_error(source, first)));
            }
        }
        Ok(resolve::resolve(&script))
    }
}

/// The line scanner; never fails
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LineScanStrategy;

impl Strategy for LineScanStrategy {
    fn name(&self) -> &'static str { "line scan" }

    fn parse(&self, source: &str) -> Result<DefinitionTable, Error> { Ok(fallback::scan(source)) }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ParseOptions {
    pub recovery: Recovery,
    /// Whether the line scanner runs when the grammar fails
    pub fallback: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            recovery: Recovery::default(),
            fallback: true,
        }
    }
}

#[derive(Debug)]
pub struct Pipeline {
    strategies: Vec<Box<dyn Strategy + Send + Sync>>,
}

impl Pipeline {
    pub fn new(options: &ParseOptions) -> Pipeline {
        let mut strategies: Vec<Box<dyn Strategy + Send + Sync>> = vec![Box::new(GrammarStrategy {
            recovery: options.recovery,
        })];
        if options.fallback {
            strategies.push(Box::new(LineScanStrategy));
        }
        Pipeline { strategies }
    }

    pub fn with_strategies(strategies: Vec<Box<dyn Strategy + Send + Sync>>) -> Pipeline { Pipeline { strategies } }

    pub fn strategies(&self) -> impl Iterator<Item = &'static str> + '_ { self.strategies.iter().map(|s| s.name()) }

    /// Runs the chain. Never fails.
    pub fn parse(&self, source: &str) -> DefinitionTable {
        let mut salvaged = DefinitionTable::new();
        for strategy in self.strategies.iter() {
            match strategy.parse(source) {
                Ok(table) => {
                    debug!(strategy = strategy.name(), definitions = table.len(), "parsed");
                    salvaged.fill_from(table);
                    return salvaged;
                }
                Err(Error::Incomplete { report, partial }) => {
                    warn!(strategy = strategy.name(), kept = partial.len(), "{}", report);
                    salvaged.fill_from(partial);
                }
                Err(e) => warn!(strategy = strategy.name(), "{}", e),
            }
        }
        warn!(definitions = salvaged.len(), "every parsing strategy failed");
        salvaged
    }
}

impl Default for Pipeline {
    fn default() -> Self { Pipeline::new(&ParseOptions::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GARBAGE: &str = "model User {\n    name string\n    email: string;\n}\n";

    #[derive(Debug)]
    struct AlwaysFails;

    impl Strategy for AlwaysFails {
        fn name(&self) -> &'static str { "always fails" }

        fn parse(&self, _: &str) -> Result<DefinitionTable, Error> { Err(Error::Parse("nope".to_string())) }
    }

    #[test]
    fn default_chain() {
        let names: Vec<_> = Pipeline::default().strategies().collect();
        assert_eq!(names, vec!["grammar", "line scan"]);
        let options = ParseOptions {
            fallback: false,
            ..ParseOptions::default()
        };
        assert_eq!(Pipeline::new(&options).strategies().count(), 1);
    }

    #[test]
    fn grammar_hard_failure_falls_back() {
        assert!(GrammarStrategy::default().parse(GARBAGE).is_err());
        let table = Pipeline::default().parse(GARBAGE);
        let user = table.model("User").unwrap();
        assert_eq!(user.fields.len(), 1);
        assert_eq!(user.fields[0].name, "email");
    }

    #[test]
    fn partial_grammar_success_keeps_grammar_result() {
        let source = "model A { a: string; }\n%%%;\nmodel B { b: string; }";
        let table = Pipeline::default().parse(source);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn abort_falls_back_on_first_mismatch() {
        let source = "model A { a: string; }\n%%%;\nmodel B { b: string; }";
        let strict = GrammarStrategy {
            recovery: Recovery::Abort,
        };
        match strict.parse(source) {
            Err(Error::Incomplete { report, partial }) => {
                assert!(report.contains("line 2, column 1"));
                assert_eq!(partial.names().collect::<Vec<_>>(), vec!["A"]);
            }
            other => panic!("unexpected {:?}", other),
        }
        let options = ParseOptions {
            recovery: Recovery::Abort,
            fallback: true,
        };
        let table = Pipeline::new(&options).parse(source);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn abort_keeps_definitions_the_line_scanner_misses() {
        let source = "model A { a: string; } model B { b: string; }\n%%%;\nmodel C {\n  c: string;\n}";
        let options = ParseOptions {
            recovery: Recovery::Abort,
            fallback: true,
        };
        let table = Pipeline::new(&options).parse(source);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn abort_without_fallback_keeps_partial() {
        let source = "model A { a: string; }\nmodel B { b: string; }\n%%%;";
        let options = ParseOptions {
            recovery: Recovery::Abort,
            fallback: false,
        };
        let table = Pipeline::new(&options).parse(source);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn unclosed_namespace_keeps_inner_models() {
        let source = "model Z { z: string; }\nnamespace N {\n  model A { a: string; }\n  model B { b: string; }\n";
        let table = Pipeline::default().parse(source);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["Z", "A", "B"]);
    }

    #[test]
    fn deep_nesting_does_not_crash() {
        let source = format!("model A {{ a: {} }}\nmodel B {{ b: string; }}", "(".repeat(2000));
        let table = Pipeline::default().parse(&source);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["B"]);
        assert!(Pipeline::default().parse(&"namespace N { ".repeat(1000)).is_empty());
    }

    #[test]
    fn all_strategies_failing_yields_empty_table() {
        let pipeline = Pipeline::with_strategies(vec![Box::new(AlwaysFails)]);
        assert!(pipeline.parse("model A {}").is_empty());
        let options = ParseOptions {
            fallback: false,
            ..ParseOptions::default()
        };
        assert!(Pipeline::new(&options).parse(GARBAGE).is_empty());
    }

    #[test]
    fn empty_input_is_not_a_failure() {
        assert!(GrammarStrategy::default().parse("").unwrap().is_empty());
        assert!(Pipeline::default().parse("// nothing\n").is_empty());
    }
}
