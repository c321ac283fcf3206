//! Line scanner used when the grammar gives up on a whole input
//!
//! A line starting with `model ` or `enum ` opens a block that runs until a
//! line starting with `}`. Inside a model every line with a `:` is a field;
//! inside an enum every line is a member up to its first `,`. Anything else is
//! skipped without complaint.
use once_cell::sync::Lazy;
use regex::Regex;

use super::model::*;
use super::resolve::{classify_name, inherit};

static MODEL_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^model\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*<[^>]*>)?(?:\s+(extends|is)\s+([A-Za-z_][A-Za-z0-9_.]*))?")
        .unwrap()
});
static ENUM_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^enum\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static DECORATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(?:@[A-Za-z_][A-Za-z0-9_.]*(?:\([^)]*\))?\s*)+"#).unwrap());
static DEFAULT_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*=.*$").unwrap());

/// Scans `text` line by line. Never fails.
pub fn scan(text: &str) -> DefinitionTable {
    let mut table = DefinitionTable::new();
    let mut lines = text.lines().map(str::trim);
    while let Some(line) = lines.next() {
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let line = strip_decorators(line).0;
        if let Some(header) = MODEL_HEADER.captures(line) {
            let name = header[1].to_string();
            let base = match (header.get(2), header.get(3)) {
                (Some(kw), Some(base)) if kw.as_str() == "extends" => Some(base.as_str().to_string()),
                _ => None,
            };
            let body = block(line, &mut lines);
            let own = body.iter().filter_map(|l| field(l, &table)).collect();
            let fields = inherit(base.as_deref().and_then(|b| table.model(b)), own);
            table.insert(Definition::Model(ModelDef { name, fields, base }));
        } else if let Some(header) = ENUM_HEADER.captures(line) {
            let name = header[1].to_string();
            let body = block(line, &mut lines);
            let members = body.iter().filter_map(|l| member(l)).collect();
            table.insert(Definition::Enum(EnumDef { name, members }));
        }
    }
    table
}

/// Collects the body lines of the block opened on `header`. A block that
/// opens and closes on the header line is split on `;`.
fn block<'s>(header: &'s str, lines: &mut impl Iterator<Item = &'s str>) -> Vec<&'s str> {
    if let Some(open) = header.find('{') {
        let rest = &header[open + 1..];
        if let Some(close) = rest.find('}') {
            return rest[..close].split(';').map(str::trim).collect();
        }
    } else if header.ends_with(';') {
        // `model A is B;`
        return Vec::new();
    }
    let mut body = Vec::new();
    for line in lines.by_ref() {
        if line.starts_with('}') {
            break;
        }
        if !line.is_empty() && !line.starts_with("//") {
            body.push(line);
        }
    }
    body
}

/// Splits leading decorators off `line`, reporting whether `@key` was one
fn strip_decorators(line: &str) -> (&str, bool) {
    match DECORATORS.find(line) {
        Some(m) => {
            let is_key = m.as_str().split_whitespace().any(|d| d == "@key");
            (&line[m.end()..], is_key)
        }
        None => (line, false),
    }
}

fn field(line: &str, table: &DefinitionTable) -> Option<Field> {
    let (line, is_key) = strip_decorators(line.trim_end_matches([';', ',']));
    let is_optional = line.contains('?');
    let line = line.replace('?', "");
    let (name, ty) = line.split_once(':')?;
    let name = name.trim().trim_matches('"');
    if name.is_empty() || name.starts_with("...") {
        return None;
    }
    let ty = DEFAULT_VALUE.replace(ty.trim(), "");
    let (ty, is_array) = match ty.strip_suffix("[]") {
        Some(element) => (element.trim(), true),
        None => (&ty[..], false),
    };
    let mut shape = classify_name(ty, table);
    shape.is_array |= is_array;
    shape.is_optional |= is_optional;
    let name = if is_key {
        format!("{}{}", KEY_MARKER, name)
    } else {
        name.to_string()
    };
    Some(Field { name, shape })
}

fn member(line: &str) -> Option<EnumMember> {
    let (line, _) = strip_decorators(line);
    let raw = line.split(',').next()?.trim_end_matches(';');
    let raw = raw.split(':').next()?.trim().trim_matches('"');
    if raw.is_empty() || raw.starts_with("...") || raw.starts_with("//") {
        return None;
    }
    Some(EnumMember::new(raw))
}
