use std::borrow::Cow;

use oxc::syntax::identifier::{self, is_identifier_part, is_identifier_start};

use crate::concat_string;

pub fn is_validate_identifier_name(name: &str) -> bool {
  identifier::is_identifier_name(name)
}

/// Turns an arbitrary name, usually a file name, into a usable binding name.
pub fn legitimize_identifier_name(name: &str) -> Cow<str> {
  let mut char_indices = name.char_indices();

  let mut first_invalid_char_index = None;
  if let Some((index, first_char)) = char_indices.next() {
    if !is_identifier_start(first_char) {
      first_invalid_char_index = Some(index);
    }
  }
  if first_invalid_char_index.is_none() {
    first_invalid_char_index =
      char_indices.find(|(_, char)| !is_identifier_part(*char)).map(|(index, _)| index);
  }

  let Some(first_invalid_char_index) = first_invalid_char_index else {
    return Cow::Borrowed(name);
  };

  let (valid_part, rest) = name.split_at(first_invalid_char_index);
  let mut legitimized = String::with_capacity(name.len() + 1);
  legitimized.push_str(valid_part);

  let mut rest_chars = rest.chars();
  if first_invalid_char_index == 0 {
    legitimized.push('_');
    // A leading digit is still a valid identifier part.
    if let Some(first_char) = rest_chars.next() {
      legitimized.push(if is_identifier_part(first_char) { first_char } else { '_' });
    }
  }
  for char in rest_chars {
    legitimized.push(if is_identifier_part(char) { char } else { '_' });
  }

  Cow::Owned(legitimized)
}

pub fn property_key(name: &str) -> String {
  if is_validate_identifier_name(name) {
    name.to_string()
  } else {
    serde_json::Value::String(name.to_string()).to_string()
  }
}

pub fn property_access_str(obj: &str, prop: &str) -> String {
  if is_validate_identifier_name(prop) {
    concat_string!(obj, ".", prop)
  } else {
    concat_string!(obj, "[", serde_json::Value::String(prop.to_string()).to_string(), "]")
  }
}

/// Quotes `value` as a JavaScript string literal.
pub fn js_string_literal(value: &str) -> String {
  serde_json::Value::String(value.to_string()).to_string()
}

#[test]
fn test_is_validate_identifier_name() {
  assert!(is_validate_identifier_name("foo"));
  assert!(!is_validate_identifier_name("1aaaa"));
  assert!(!is_validate_identifier_name("😈"));
}

#[test]
fn test_legitimize_identifier_name() {
  assert_eq!(legitimize_identifier_name("foo"), "foo");
  assert_eq!(legitimize_identifier_name("foo-bar.baz"), "foo_bar_baz");
  assert_eq!(legitimize_identifier_name("1st"), "_1st");
  assert_eq!(legitimize_identifier_name("@scope"), "__scope");
}

#[test]
fn test_property_helpers() {
  assert_eq!(property_key("a"), "a");
  assert_eq!(property_key("a-b"), "\"a-b\"");
  assert_eq!(property_access_str("ns", "a-b"), "ns[\"a-b\"]");
  assert_eq!(js_string_literal("./deps/a.js"), "\"./deps/a.js\"");
}
