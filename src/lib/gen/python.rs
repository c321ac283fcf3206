use super::*;
use crate::model::Field;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Python;

impl Language for Python {
    fn primitive(&self, p: Primitive) -> &'static str {
        match p {
            Primitive::String => "str",
            Primitive::Integer => "int",
            Primitive::Boolean => "bool",
        }
    }

    fn sequence_of(&self, element: &str) -> String { format!("List[{}]", element) }

    fn optional_of(&self, element: &str) -> String { format!("Optional[{}]", element) }
}

impl Common for Python {
    fn gen_common(&self, out: &mut String) {
        append!(out, "from dataclasses import dataclass\n");
        append!(out, "from typing import List, Optional\n");
        append!(out, "from enum import Enum\n");
    }

    fn common_gap(&self) -> usize { 2 }
}

/// A single-quoted Python string literal
fn quote(raw: &str) -> String { format!("'{}'", raw.replace('\\', "\\\\").replace('\'', "\\'")) }

fn field_line(lang: &Python, field: &Field) -> String {
    let line = format!("{}: {}", field.bare_name(), field_type(lang, &field.shape));
    if field.is_key() {
        format!("{}  # key", line)
    } else {
        line
    }
}

impl Definition<Python> for EnumDef {
    fn gen_def(&self, _: &mut Python, out: &mut String) {
        let mut ctx = GenCtx::new(out);
        ctx.line(format_args!("class {}(Enum):", self.name));
        ctx.push_indent();
        if self.members.is_empty() {
            ctx.line("pass");
        }
        for member in self.members.iter() {
            ctx.line(format_args!("{} = {}", member.symbol(), quote(&member.raw)));
        }
        ctx.pop_indent();
    }
}

impl Definition<Python> for ModelDef {
    fn gen_def(&self, lang: &mut Python, out: &mut String) {
        let mut ctx = GenCtx::new(out);
        ctx.line("@dataclass");
        ctx.line(format_args!("class {}:", self.name));
        ctx.push_indent();
        if self.fields.is_empty() {
            ctx.line("pass");
        }
        for field in self.fields.iter() {
            ctx.line(field_line(lang, field));
        }
        ctx.pop_indent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{self, EnumMember};
    use pretty_assertions::assert_eq;

    fn string() -> TypeShape { TypeShape::primitive(Primitive::String) }

    #[test]
    fn common_gen() {
        let mut gen = Generator::<Python>::new();
        gen.push_common();
        assert_eq!(
            gen.finish(),
            "from dataclasses import dataclass\nfrom typing import List, Optional\nfrom enum import Enum\n"
        );
    }

    #[test]
    fn enum_definition() {
        let test = EnumDef {
            name: "Status".to_string(),
            members: vec![EnumMember::new("active"), EnumMember::new("in-active")],
        };
        let mut gen = Generator::<Python>::new();
        gen.push_def(&test);
        assert_eq!(
            gen.finish(),
            "class Status(Enum):
    ACTIVE = 'active'
    IN_ACTIVE = 'in-active'
"
        );
    }

    #[test]
    fn quotes_are_escaped() {
        let test = EnumDef {
            name: "Q".to_string(),
            members: vec![EnumMember::new(r"a\'b")],
        };
        let mut gen = Generator::<Python>::new();
        gen.push_def(&test);
        assert_eq!(gen.finish(), r"class Q(Enum):
    A\'B = 'a\\\'b'
");
    }

    #[test]
    fn dataclass_definition() {
        let test = ModelDef {
            name: "User".to_string(),
            fields: vec![
                Field::new("@key:id", string()),
                Field::new("email", string().optional()),
                Field::new("tags", string().array()),
                Field::new("both", TypeShape::reference("Address").array().optional()),
                Field::new("age", TypeShape::primitive(Primitive::Integer)),
                Field::new("ok", TypeShape::primitive(Primitive::Boolean)),
                Field::new("home", TypeShape::reference("Address").optional()),
            ],
            base: None,
        };
        let mut gen = Generator::<Python>::new();
        gen.push_def(&test);
        assert_eq!(
            gen.finish(),
            "@dataclass
class User:
    id: str  # key
    email: Optional[str]
    tags: List[str]
    both: List[Address]
    age: int
    ok: bool
    home: Optional[Address]
"
        );
    }

    #[test]
    fn empty_bodies_pass() {
        let mut gen = Generator::<Python>::new();
        gen.push_def(&EnumDef {
            name: "E".to_string(),
            members: vec![],
        });
        gen.push_def(&ModelDef {
            name: "M".to_string(),
            fields: vec![],
            base: None,
        });
        assert_eq!(gen.finish(), "class E(Enum):\n    pass\n\n@dataclass\nclass M:\n    pass\n");
    }

    #[test]
    fn enums_before_models() {
        let table: DefinitionTable = vec![
            model::Definition::Model(ModelDef {
                name: "User".to_string(),
                fields: vec![Field::new("status", TypeShape::reference("Status"))],
                base: None,
            }),
            model::Definition::Enum(EnumDef {
                name: "Status".to_string(),
                members: vec![EnumMember::new("active")],
            }),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            generate::<Python>(&table),
            "from dataclasses import dataclass
from typing import List, Optional
from enum import Enum


class Status(Enum):
    ACTIVE = 'active'

@dataclass
class User:
    status: Status
"
        );
    }

    #[test]
    fn empty_table_is_imports_only() {
        assert_eq!(
            generate::<Python>(&DefinitionTable::new()),
            "from dataclasses import dataclass\nfrom typing import List, Optional\nfrom enum import Enum\n"
        );
    }
}
