//! `@token:default` substitution in strings and JSON value trees.
//!
//! A template is literal text interleaved with references. A reference
//! starts at `@`; its token runs to the next unescaped `:` or `@` (or the
//! end), and text after a `:` up to the next unescaped `@` is the default
//! used when the table has no entry for the token. `@@` and `::` stand for
//! a literal `@` and `:`.
//!
//! Exactly one trailing space of a reference's last segment is kept as a
//! separator after the resolved value. Any further spacing belongs to the
//! default and is dropped with it when the token resolves.
//!
//! ```text
//! "@greet:hi there"        -> table["greet"], or "hi there"
//! "@title:Dr. @name:you"   -> table["title"] + " " + table["name"]
//! "@@literal::value"       -> "@literal:value"
//! ```

use crate::error::{I18nError, I18nResult};
use crate::loader::LocaleTable;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::iter::Peekable;
use std::str::Chars;

/// Expand every reference in `input` against `table`.
///
/// Strings containing no `@` are returned as they are. Lookups never emit
/// missing-string diagnostics.
pub fn resolve_template(table: &LocaleTable, input: &str) -> String {
    if !input.contains('@') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '@' | ':' if chars.peek() == Some(&c) => {
                chars.next();
                out.push(c);
            }
            '@' => expand_reference(table, &mut chars, &mut out),
            other => out.push(other),
        }
    }
    out
}

fn expand_reference(table: &LocaleTable, chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    let token = scan_segment(chars, true);
    let default = if chars.peek() == Some(&':') {
        chars.next();
        Some(scan_segment(chars, false))
    } else {
        None
    };

    // A trailing space on the last segment separates this reference from
    // whatever follows it.
    let (token, default, separator) = match default {
        Some(text) => match text.strip_suffix(' ') {
            Some(trimmed) => (token, Some(trimmed.to_string()), true),
            None => (token, Some(text), false),
        },
        None => match token.strip_suffix(' ') {
            Some(trimmed) => (trimmed.to_string(), None, true),
            None => (token, None, false),
        },
    };

    if token.is_empty() && default.is_none() {
        out.push('@');
    } else {
        out.push_str(&table.resolve(&token, default.as_deref(), false));
    }
    if separator {
        out.push(' ');
    }
}

/// Read up to the next unescaped `@` (or `:` when `stop_at_colon`),
/// collapsing escapes on the way.
fn scan_segment(chars: &mut Peekable<Chars<'_>>, stop_at_colon: bool) -> String {
    let mut segment = String::new();
    while let Some(&c) = chars.peek() {
        if c == '@' || c == ':' {
            let mut ahead = chars.clone();
            ahead.next();
            if ahead.peek() == Some(&c) {
                chars.next();
                chars.next();
                segment.push(c);
                continue;
            }
            if c == '@' || stop_at_colon {
                break;
            }
        }
        segment.push(c);
        chars.next();
    }
    segment
}

/// Replace every string leaf of `value` with its expansion, in place.
///
/// Nested objects and arrays are entered unless `shallow` is set, down to
/// `max_depth` levels of nesting.
///
/// # Errors
///
/// [`I18nError::TraversalTooDeep`] when containers nest deeper than
/// `max_depth`; leaves visited before that point stay expanded.
pub fn populate_object_strings(
    table: &LocaleTable,
    value: &mut Value,
    shallow: bool,
    max_depth: usize,
) -> I18nResult<()> {
    populate(table, value, shallow, max_depth, 0)
}

fn populate(
    table: &LocaleTable,
    value: &mut Value,
    shallow: bool,
    max_depth: usize,
    depth: usize,
) -> I18nResult<()> {
    match value {
        Value::String(text) => {
            let expanded = resolve_template(table, text);
            *text = expanded;
        }
        Value::Object(_) | Value::Array(_) if shallow && depth > 0 => {}
        Value::Object(_) | Value::Array(_) if depth >= max_depth => {
            return Err(I18nError::TraversalTooDeep { max_depth });
        }
        Value::Object(map) => {
            for child in map.values_mut() {
                populate(table, child, shallow, max_depth, depth + 1)?;
            }
        }
        Value::Array(items) => {
            for child in items {
                populate(table, child, shallow, max_depth, depth + 1)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

/// Build a copy of `value` with every string leaf expanded.
///
/// Traversal follows [`populate_object_strings`]; the input is untouched.
///
/// # Errors
///
/// [`I18nError::TraversalTooDeep`] when containers nest deeper than
/// `max_depth`.
pub fn translate_object_strings(
    table: &LocaleTable,
    value: &Value,
    shallow: bool,
    max_depth: usize,
) -> I18nResult<Value> {
    translate(table, value, shallow, max_depth, 0)
}

fn translate(
    table: &LocaleTable,
    value: &Value,
    shallow: bool,
    max_depth: usize,
    depth: usize,
) -> I18nResult<Value> {
    let translated = match value {
        Value::String(text) => Value::String(resolve_template(table, text)),
        Value::Object(_) | Value::Array(_) if shallow && depth > 0 => value.clone(),
        Value::Object(_) | Value::Array(_) if depth >= max_depth => {
            return Err(I18nError::TraversalTooDeep { max_depth });
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| {
                    Ok((key.clone(), translate(table, child, shallow, max_depth, depth + 1)?))
                })
                .collect::<I18nResult<Map<String, Value>>>()?,
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|child| translate(table, child, shallow, max_depth, depth + 1))
                .collect::<I18nResult<Vec<Value>>>()?,
        ),
        scalar => scalar.clone(),
    };
    Ok(translated)
}

/// Translate any serializable value through its JSON form.
///
/// # Errors
///
/// [`I18nError::Conversion`] when `value` does not round-trip through JSON,
/// or [`I18nError::TraversalTooDeep`].
pub fn translate_serializable<T>(
    table: &LocaleTable,
    value: &T,
    shallow: bool,
    max_depth: usize,
) -> I18nResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let tree = serde_json::to_value(value).map_err(I18nError::Conversion)?;
    let translated = translate_object_strings(table, &tree, shallow, max_depth)?;
    serde_json::from_value(translated).map_err(I18nError::Conversion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleId;
    use crate::table::StringTable;
    use proptest::prelude::*;
    use serde_json::json;

    fn table(entries: &[(&str, &str)]) -> LocaleTable {
        let mut strings = StringTable::new();
        for (id, text) in entries {
            strings.set_string(*id, *text);
        }
        LocaleTable::from_strings("en-US", LocaleId::parse("en-US"), strings)
    }

    #[test]
    fn test_reference_with_default() {
        let present = table(&[("greet", "howdy")]);
        let absent = table(&[]);

        assert_eq!(resolve_template(&present, "@greet:hi there"), "howdy");
        assert_eq!(resolve_template(&absent, "@greet:hi there"), "hi there");
    }

    #[test]
    fn test_reference_without_default() {
        let t = table(&[("greet", "howdy")]);
        assert_eq!(resolve_template(&t, "@greet"), "howdy");
        assert_eq!(resolve_template(&t, "@no.such.id"), "%$$>no.such.id<$$%");
    }

    #[test]
    fn test_escapes() {
        let t = table(&[("literal", "WRONG")]);
        assert_eq!(resolve_template(&t, "@@literal::value"), "@literal:value");
        assert_eq!(resolve_template(&t, "mail me@@home"), "mail me@home");
        assert_eq!(resolve_template(&t, "@x:a::b"), "a:b");
        assert_eq!(resolve_template(&t, "@x:at @@ noon"), "at @ noon");
    }

    #[test]
    fn test_no_at_sign_is_verbatim() {
        let t = table(&[]);
        assert_eq!(resolve_template(&t, "plain: text::here"), "plain: text::here");
    }

    #[test]
    fn test_literal_prefix_and_multiple_references() {
        let t = table(&[("name", "Ada")]);
        assert_eq!(resolve_template(&t, "Hello @name"), "Hello Ada");
        assert_eq!(resolve_template(&t, "@title:Dr. @name:you"), "Dr. Ada");
        assert_eq!(resolve_template(&t, "@title:Dr. @nobody:you"), "Dr. you");
    }

    #[test]
    fn test_trailing_space_separator() {
        let t = table(&[("a", "A"), ("b", "B")]);
        assert_eq!(resolve_template(&t, "@a:x @b"), "A B");
        assert_eq!(resolve_template(&t, "@a @b"), "A B");
        assert_eq!(resolve_template(&table(&[]), "@a:x @b:y"), "x y");
    }

    #[test]
    fn test_only_one_separator_space_survives_resolution() {
        let t = table(&[("a", "A"), ("b", "B")]);
        assert_eq!(resolve_template(&t, "@a:x  @b"), "A B");
        assert_eq!(resolve_template(&table(&[("b", "B")]), "@a:x  @b"), "x  B");
    }

    #[test]
    fn test_bare_at_sign_is_literal() {
        let t = table(&[]);
        assert_eq!(resolve_template(&t, "reach us @"), "reach us @");
        assert_eq!(resolve_template(&t, "@:fallback"), "fallback");
    }

    #[test]
    fn test_populate_in_place() {
        let t = table(&[("test.greeting", "howdy dude")]);
        let mut value = json!({
            "greet": "@test.greeting",
            "miss": "@test.missing",
            "another": "@test.another:another",
            "count": 3,
            "list": ["@test.greeting", "plain"],
            "subObj": { "foobar": "@test.foobar:foobar" }
        });

        populate_object_strings(&t, &mut value, false, 64).unwrap();

        assert_eq!(
            value,
            json!({
                "greet": "howdy dude",
                "miss": "%$$>test.missing<$$%",
                "another": "another",
                "count": 3,
                "list": ["howdy dude", "plain"],
                "subObj": { "foobar": "foobar" }
            })
        );
    }

    #[test]
    fn test_shallow_skips_nested_containers() {
        let t = table(&[("a", "A")]);
        let mut value = json!({ "top": "@a", "nested": { "inner": "@a" } });

        populate_object_strings(&t, &mut value, true, 64).unwrap();
        assert_eq!(value, json!({ "top": "A", "nested": { "inner": "@a" } }));

        let copy = translate_object_strings(&t, &json!({ "n": ["@a"], "t": "@a" }), true, 64)
            .unwrap();
        assert_eq!(copy, json!({ "n": ["@a"], "t": "A" }));
    }

    #[test]
    fn test_translate_leaves_input_untouched() {
        let t = table(&[("a", "A")]);
        let input = json!({ "x": "@a", "y": { "z": "@a:zed" } });
        let before = input.clone();

        let translated = translate_object_strings(&t, &input, false, 64).unwrap();

        assert_eq!(input, before);
        assert_eq!(translated, json!({ "x": "A", "y": { "z": "A" } }));
    }

    #[test]
    fn test_depth_bound() {
        let t = table(&[]);
        let mut value = json!({ "a": { "b": { "c": "@x:y" } } });

        assert!(translate_object_strings(&t, &value, false, 3).is_ok());
        assert!(matches!(
            translate_object_strings(&t, &value, false, 2),
            Err(I18nError::TraversalTooDeep { max_depth: 2 })
        ));
        assert!(populate_object_strings(&t, &mut value, false, 2).is_err());
    }

    #[test]
    fn test_translate_serializable() {
        #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
        struct Labels {
            title: String,
            hint: Option<String>,
        }

        let t = table(&[("ui.title", "Settings")]);
        let labels = Labels {
            title: "@ui.title".to_string(),
            hint: Some("@ui.hint:Press enter".to_string()),
        };

        let translated = translate_serializable(&t, &labels, false, 64).unwrap();
        assert_eq!(
            translated,
            Labels {
                title: "Settings".to_string(),
                hint: Some("Press enter".to_string()),
            }
        );
    }

    proptest! {
        #[test]
        fn prop_text_without_at_is_unchanged(s in "[a-zA-Z0-9 .,:]{0,40}") {
            let t = table(&[("a", "A")]);
            prop_assert_eq!(resolve_template(&t, &s), s);
        }

        #[test]
        fn prop_escaped_at_is_never_a_reference(s in "[a-z. ]{0,20}") {
            let t = table(&[("a", "A")]);
            let input = format!("@@{s}");
            prop_assert_eq!(resolve_template(&t, &input), format!("@{s}"));
        }
    }
}
