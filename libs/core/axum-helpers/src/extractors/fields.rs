//! Field-by-field reading of loosely typed input.
//!
//! Deserializing a whole struct stops at the first field with the wrong type
//! and reports it as a body error. [`FieldReader`] instead checks each field
//! on its own, so a wrong type becomes one more entry in the same
//! `{ field: [messages] }` map the `validator` rules produce.
//!
//! Strings are accepted for numeric fields when their content parses
//! (`"5"`, `" 9.99 "`), which is how query strings always arrive. Blank
//! strings and `null` count as absent.
//!
//! Errors are keyed by the input key, so a `from_price` rule failure is
//! reported under `fromPrice` when that is the key the reader was asked for.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use validator::{Validate, ValidationError, ValidationErrors};

/// Types that can be assembled from a [`FieldReader`].
///
/// ```rust
/// use axum_helpers::{FieldReader, FromFields};
/// use serde_json::json;
/// use validator::Validate;
///
/// #[derive(Validate)]
/// struct Restock {
///     #[validate(range(min = 0))]
///     amount: Option<i32>,
/// }
///
/// impl FromFields for Restock {
///     fn from_fields(fields: &mut FieldReader) -> Self {
///         Self {
///             amount: fields.read("amount", "The amount must be an integer."),
///         }
///     }
/// }
///
/// let mut fields = FieldReader::from_json(json!({ "amount": "lots" })).unwrap();
/// let restock = Restock::from_fields(&mut fields);
/// let errors = fields.finish(&restock).unwrap_err();
/// assert!(errors.field_errors().contains_key("amount"));
/// ```
pub trait FromFields: Sized {
    fn from_fields(fields: &mut FieldReader) -> Self;
}

#[derive(Debug, Default)]
pub struct FieldReader {
    fields: Map<String, Value>,
    keys: Vec<&'static str>,
    mistyped: Vec<(&'static str, ValidationError)>,
}

impl FieldReader {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            keys: Vec::new(),
            mistyped: Vec::new(),
        }
    }

    /// `None` when `value` is not a JSON object.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(fields)),
            _ => None,
        }
    }

    /// Decoded query pairs. A repeated key keeps its last value.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        Self::new(fields)
    }

    /// Read `key` as `T`.
    ///
    /// Absent, `null` and blank values give `None`. A value of the wrong type
    /// also gives `None` and records `message` against `key`.
    pub fn read<T: DeserializeOwned>(&mut self, key: &'static str, message: &'static str) -> Option<T> {
        self.keys.push(key);
        let value = match self.fields.remove(key) {
            None | Some(Value::Null) => return None,
            Some(Value::String(raw)) if raw.trim().is_empty() => return None,
            Some(value) => value,
        };

        let parsed = match &value {
            Value::String(raw) => serde_json::from_value::<T>(value.clone())
                .or_else(|_| serde_json::from_str::<T>(raw.trim())),
            _ => serde_json::from_value::<T>(value),
        };

        match parsed {
            Ok(typed) => Some(typed),
            Err(_) => {
                let error = ValidationError::new("type").with_message(Cow::Borrowed(message));
                self.mistyped.push((key, error));
                None
            }
        }
    }

    pub fn has_mistyped(&self) -> bool {
        !self.mistyped.is_empty()
    }

    /// Run `value`'s rules and merge in the type errors.
    ///
    /// A mistyped field reports only its type error; rules on the same field
    /// saw `None` and their output is dropped.
    pub fn finish<T: Validate>(self, value: &T) -> Result<(), ValidationErrors> {
        let rule_errors = match value.validate() {
            Ok(()) => HashMap::new(),
            Err(errors) => errors.into_errors(),
        };

        let mut errors = ValidationErrors::new();
        for (field, kind) in rule_errors {
            let key = self.input_key(field);
            if self.mistyped.iter().any(|(mistyped, _)| key.as_ref() == *mistyped) {
                continue;
            }
            errors.errors_mut().insert(key, kind);
        }
        for (key, error) in self.mistyped {
            errors.add(key, error);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Input key read for the struct field `field` (`from_price` matches
    /// `fromPrice`), or `field` itself when none was read.
    fn input_key(&self, field: Cow<'static, str>) -> Cow<'static, str> {
        self.keys
            .iter()
            .find(|key| snake_case(key) == field.as_ref())
            .map(|key| Cow::Borrowed(*key))
            .unwrap_or(field)
    }
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Validate)]
    struct Item {
        #[validate(required(message = "The name field is required."))]
        name: Option<String>,
        #[validate(range(min = 0.0, message = "The price must be at least 0."))]
        price: Option<f64>,
        #[validate(range(min = 0, message = "The stock must be at least 0."))]
        stock: Option<i32>,
    }

    impl FromFields for Item {
        fn from_fields(fields: &mut FieldReader) -> Self {
            Self {
                name: fields.read("name", "The name must be a string."),
                price: fields.read("price", "The price must be a number."),
                stock: fields.read("stock", "The stock must be an integer."),
            }
        }
    }

    fn read(value: Value) -> (Item, Result<(), ValidationErrors>) {
        let mut fields = FieldReader::from_json(value).unwrap();
        let item = Item::from_fields(&mut fields);
        let result = fields.finish(&item);
        (item, result)
    }

    fn messages(errors: &ValidationErrors, field: &str) -> Vec<String> {
        errors.field_errors()[field]
            .iter()
            .map(|e| e.message.as_ref().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_every_mistyped_field_is_reported() {
        let (_, result) = read(json!({ "name": 5, "price": "cheap", "stock": "lots" }));
        let errors = result.unwrap_err();

        assert_eq!(messages(&errors, "name"), ["The name must be a string."]);
        assert_eq!(messages(&errors, "price"), ["The price must be a number."]);
        assert_eq!(messages(&errors, "stock"), ["The stock must be an integer."]);
    }

    #[test]
    fn test_type_error_replaces_rule_errors_on_same_field() {
        // `name` read as None would otherwise also fail `required`
        let (_, result) = read(json!({ "name": ["Widget"], "price": -1 }));
        let errors = result.unwrap_err();

        assert_eq!(messages(&errors, "name"), ["The name must be a string."]);
        assert_eq!(messages(&errors, "price"), ["The price must be at least 0."]);
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let (item, result) = read(json!({ "name": "Widget", "price": " 9.5 ", "stock": "3" }));

        assert!(result.is_ok());
        assert_eq!(item.price, Some(9.5));
        assert_eq!(item.stock, Some(3));
    }

    #[test]
    fn test_non_finite_and_fractional_strings_are_mistyped() {
        for (price, stock) in [("NaN", "1"), ("inf", "1"), ("1", "2.5"), ("1e999", "1")] {
            let (_, result) = read(json!({ "name": "Widget", "price": price, "stock": stock }));
            assert!(result.is_err(), "price={price} stock={stock}");
        }
    }

    #[test]
    fn test_null_and_blank_are_absent() {
        let (item, result) = read(json!({ "name": "  ", "price": null }));

        assert_eq!(item.price, None);
        assert_eq!(
            messages(&result.unwrap_err(), "name"),
            ["The name field is required."]
        );
    }

    #[derive(Validate)]
    struct Bounds {
        #[validate(range(min = 0, message = "The from stock must be at least 0."))]
        from_stock: Option<i32>,
        #[validate(range(min = 0, message = "The to stock must be at least 0."))]
        to_stock: Option<i32>,
    }

    #[test]
    fn test_rule_errors_use_input_keys() {
        let mut fields = FieldReader::from_pairs([
            ("fromStock".to_string(), "-1".to_string()),
            ("toStock".to_string(), "many".to_string()),
        ]);
        let bounds = Bounds {
            from_stock: fields.read("fromStock", "The from stock must be an integer."),
            to_stock: fields.read("toStock", "The to stock must be an integer."),
        };

        let errors = fields.finish(&bounds).unwrap_err();
        let keys: Vec<String> = {
            let mut keys: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
            keys.sort();
            keys
        };
        assert_eq!(keys, ["fromStock", "toStock"]);
        assert_eq!(messages(&errors, "toStock"), ["The to stock must be an integer."]);
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("perPage"), "per_page");
        assert_eq!(snake_case("name"), "name");
    }

    #[test]
    fn test_from_pairs_keeps_last_value() {
        let mut fields = FieldReader::from_pairs([
            ("stock".to_string(), "1".to_string()),
            ("stock".to_string(), "7".to_string()),
        ]);
        assert_eq!(fields.read::<i32>("stock", "bad"), Some(7));
        assert!(!fields.has_mistyped());
    }

    #[test]
    fn test_from_json_requires_object() {
        assert!(FieldReader::from_json(json!([1, 2])).is_none());
        assert!(FieldReader::from_json(json!("text")).is_none());
    }
}
