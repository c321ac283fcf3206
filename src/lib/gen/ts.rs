use super::*;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct TypeScript;

impl Language for TypeScript {
    fn primitive(&self, p: Primitive) -> &'static str {
        match p {
            Primitive::String => "string",
            Primitive::Integer => "number",
            Primitive::Boolean => "boolean",
        }
    }

    fn sequence_of(&self, element: &str) -> String { format!("Array<{}>", element) }

    fn optional_of(&self, element: &str) -> String { format!("{} | undefined", element) }
}

impl Common for TypeScript {
    fn gen_common(&self, _: &mut String) {}
}

impl Definition<TypeScript> for EnumDef {
    fn gen_def(&self, _: &mut TypeScript, out: &mut String) {
        if self.members.is_empty() {
            append!(out, "export enum {} {{}}\n", self.name);
            return;
        }
        append!(out, "export enum {} {{\n", self.name);
        for member in self.members.iter() {
            append!(out, "    {} = {:?},\n", member.symbol(), member.raw);
        }
        append!(out, "}}\n");
    }
}

impl Definition<TypeScript> for ModelDef {
    fn gen_def(&self, lang: &mut TypeScript, out: &mut String) {
        if self.fields.is_empty() {
            append!(out, "export interface {} {{}}\n", self.name);
            return;
        }
        append!(out, "export interface {} {{\n", self.name);
        for field in self.fields.iter() {
            let typename = field_type(lang, &field.shape);
            if field.is_key() {
                append!(out, "    {}: {}; // key\n", field.bare_name(), typename);
            } else {
                append!(out, "    {}: {};\n", field.bare_name(), typename);
            }
        }
        append!(out, "}}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnumMember, Field};
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_interface_definition() {
        let test = ModelDef {
            name: "Test".to_string(),
            fields: vec![
                Field::new("@key:id", TypeShape::primitive(Primitive::String)),
                Field::new("count", TypeShape::primitive(Primitive::Integer).optional()),
                Field::new("flags", TypeShape::primitive(Primitive::Boolean).array()),
                Field::new("position", TypeShape::reference("Position")),
            ],
            base: None,
        };
        let mut gen = Generator::<TypeScript>::new();
        gen.push_def(&test);
        let actual = gen.finish();
        assert_eq!(
            actual,
            "export interface Test {
    id: string; // key
    count: number | undefined;
    flags: Array<boolean>;
    position: Position;
}
"
        );
    }

    #[test]
    fn simple_enum_definition() {
        let test = EnumDef {
            name: "Test".to_string(),
            members: vec![EnumMember::new("a"), EnumMember::new("b c")],
        };
        let mut gen = Generator::<TypeScript>::new();
        gen.push_def(&test);
        let actual = gen.finish();
        assert_eq!(
            actual,
            "export enum Test {
    A = \"a\",
    B_C = \"b c\",
}
"
        );
    }

    #[test]
    fn full_table() {
        let table: DefinitionTable = vec![
            crate::model::Definition::Model(ModelDef {
                name: "Empty".to_string(),
                fields: vec![],
                base: None,
            }),
            crate::model::Definition::Enum(EnumDef {
                name: "Kind".to_string(),
                members: vec![],
            }),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            generate::<TypeScript>(&table),
            "export enum Kind {}\n\nexport interface Empty {}\n"
        );
    }
}
