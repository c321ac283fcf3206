//! Code generation from a resolved [`DefinitionTable`]
//!
//! A backend is a [`Language`] (how shapes are spelled), a [`Common`] block
//! emitted once at the top, and a [`Definition`] impl for each kind of
//! definition. [`generate`] lays them out: the common block, then every enum,
//! then every model, each in table order and separated by a blank line.
use std::fmt::Write;

use super::model::{DefinitionTable, EnumDef, ModelDef, Primitive, TypeKind, TypeShape};

mod gen_ctx;
pub mod python;
pub mod ts;

pub use gen_ctx::GenCtx;

pub trait Language {
    fn primitive(&self, p: Primitive) -> &'static str;
    fn sequence_of(&self, element: &str) -> String;
    fn optional_of(&self, element: &str) -> String;
}

pub trait Common {
    fn gen_common(&self, out: &mut String);

    /// Blank lines between the common block and the first definition
    fn common_gap(&self) -> usize { 1 }
}

pub trait Definition<Lang: Language> {
    fn gen_def(&self, lang: &mut Lang, out: &mut String);
}

/// Spells out a field's type: arrays first, then optionals, then the bare
/// element. An optional array is a plain array.
pub fn field_type<Lang: Language>(lang: &Lang, shape: &TypeShape) -> String {
    let element = match &shape.kind {
        TypeKind::Primitive(p) => lang.primitive(*p).to_string(),
        TypeKind::Reference(name) => name.clone(),
    };
    if shape.is_array {
        lang.sequence_of(&element)
    } else if shape.is_optional {
        lang.optional_of(&element)
    } else {
        element
    }
}

pub struct Generator<Lang: Language + Default + Common> {
    lang: Lang,
    out: String,
    defs: usize,
}

impl<Lang: Language + Default + Common> Generator<Lang> {
    pub fn new() -> Generator<Lang> {
        Generator {
            lang: Lang::default(),
            out: String::new(),
            defs: 0,
        }
    }

    pub fn push_common(&mut self) { self.lang.gen_common(&mut self.out); }

    pub fn push_def<D: Definition<Lang>>(&mut self, def: &D) {
        if !self.out.is_empty() {
            let gap = if self.defs == 0 { self.lang.common_gap() } else { 1 };
            self.out.push_str(&"\n".repeat(gap));
        }
        def.gen_def(&mut self.lang, &mut self.out);
        self.defs += 1;
    }

    pub fn finish(self) -> String { self.out }
}

impl<Lang: Language + Default + Common> Default for Generator<Lang> {
    fn default() -> Self { Self::new() }
}

pub fn generate<Lang>(table: &DefinitionTable) -> String
where
    Lang: Language + Default + Common,
    EnumDef: Definition<Lang>,
    ModelDef: Definition<Lang>,
{
    let mut gen = Generator::<Lang>::new();
    gen.push_common();
    for e in table.enums() {
        gen.push_def(e);
    }
    for m in table.models() {
        gen.push_def(m);
    }
    gen.finish()
}
