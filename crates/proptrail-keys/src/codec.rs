//! Composite key encoding, splitting, and prefix ranges.
//!
//! Attribute rules:
//! - Must be non-empty
//! - Must not contain [`DELIMITER`] (U+0000)
//! - Must not contain [`RANGE_SENTINEL`] (U+10FFFF), which closes prefix ranges
//!
//! Rust compares `str` values byte-wise on their UTF-8 encoding, which is the
//! same as code point order, so the ordering arguments below hold for any
//! sorted store keyed by `String`.

use crate::error::{KeyError, KeyResult};

/// Separator written before and after every attribute.
pub const DELIMITER: char = '\u{0}';

/// Highest code point; appended to a prefix to form an exclusive upper bound.
pub const RANGE_SENTINEL: char = char::MAX;

/// Characters that are forbidden anywhere in an attribute.
const RESERVED_CHARS: &[char] = &[DELIMITER, RANGE_SENTINEL];

/// Half-open key range `[start, end)` covering every key that extends a prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyRange {
    /// Inclusive lower bound: the encoded prefix itself.
    pub start: String,
    /// Exclusive upper bound: the prefix followed by [`RANGE_SENTINEL`].
    pub end: String,
}

impl KeyRange {
    /// Returns `true` if `key` falls inside `[start, end)`.
    pub fn contains(&self, key: &str) -> bool {
        key >= self.start.as_str() && key < self.end.as_str()
    }
}

/// Validate a single attribute, returning `Ok(())` if it can be encoded.
///
/// # Examples
///
/// ```
/// use proptrail_keys::validate_attribute;
///
/// assert!(validate_attribute("widget-1").is_ok());
/// assert!(validate_attribute("").is_err());
/// assert!(validate_attribute("bad\0name").is_err());
/// ```
pub fn validate_attribute(attribute: &str) -> KeyResult<()> {
    if attribute.is_empty() {
        return Err(KeyError::InvalidArgument {
            attribute: attribute.to_string(),
            reason: "attribute must not be empty".into(),
        });
    }

    for ch in RESERVED_CHARS {
        if attribute.contains(*ch) {
            return Err(KeyError::InvalidArgument {
                attribute: attribute.to_string(),
                reason: format!("contains reserved character: {ch:?}"),
            });
        }
    }

    Ok(())
}

/// Encode an ordered attribute list into a single composite key.
///
/// Layout: `DELIM a0 DELIM a1 DELIM ... a(n-1) DELIM`.
///
/// # Examples
///
/// ```
/// use proptrail_keys::encode;
///
/// assert_eq!(encode(&["widget-1", "color"]).unwrap(), "\0widget-1\0color\0");
/// assert!(encode(&["", "color"]).is_err());
/// ```
pub fn encode<S: AsRef<str>>(attributes: &[S]) -> KeyResult<String> {
    if attributes.is_empty() {
        return Err(KeyError::InvalidArgument {
            attribute: String::new(),
            reason: "at least one attribute is required".into(),
        });
    }

    let capacity = attributes
        .iter()
        .map(|a| a.as_ref().len() + DELIMITER.len_utf8())
        .sum::<usize>()
        + DELIMITER.len_utf8();
    let mut key = String::with_capacity(capacity);
    key.push(DELIMITER);
    for attribute in attributes {
        let attribute = attribute.as_ref();
        validate_attribute(attribute)?;
        key.push_str(attribute);
        key.push(DELIMITER);
    }
    Ok(key)
}

/// Build the scan range selecting every key whose attributes begin with
/// `attributes`.
///
/// A key built from `["A"]` never lands in the range for `["AB"]` and vice
/// versa, because the encoded prefix ends with [`DELIMITER`].
pub fn prefix_bounds<S: AsRef<str>>(attributes: &[S]) -> KeyResult<KeyRange> {
    let start = encode(attributes)?;
    let mut end = String::with_capacity(start.len() + RANGE_SENTINEL.len_utf8());
    end.push_str(&start);
    end.push(RANGE_SENTINEL);
    Ok(KeyRange { start, end })
}

/// Split a composite key back into its attributes.
pub fn split(key: &str) -> KeyResult<Vec<String>> {
    let malformed = |reason: &str| KeyError::MalformedKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let inner = key
        .strip_prefix(DELIMITER)
        .and_then(|rest| rest.strip_suffix(DELIMITER))
        .ok_or_else(|| malformed("must start and end with the delimiter"))?;
    if inner.is_empty() {
        return Err(malformed("no attributes"));
    }

    inner
        .split(DELIMITER)
        .map(|part| {
            if part.is_empty() {
                Err(malformed("empty attribute"))
            } else {
                Ok(part.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_single_attribute() {
        assert_eq!(encode(&["A"]).unwrap(), "\0A\0");
    }

    #[test]
    fn encode_two_attributes() {
        assert_eq!(
            encode(&["widget-1", "weight"]).unwrap(),
            "\0widget-1\0weight\0"
        );
    }

    #[test]
    fn encode_accepts_owned_strings() {
        let attrs = vec!["P1".to_string(), "temp".to_string()];
        assert_eq!(encode(&attrs).unwrap(), "\0P1\0temp\0");
    }

    #[test]
    fn reject_empty_list() {
        let none: [&str; 0] = [];
        assert!(matches!(
            encode(&none),
            Err(KeyError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn reject_empty_attribute() {
        assert!(matches!(
            encode(&["", "temp"]),
            Err(KeyError::InvalidArgument { .. })
        ));
        assert!(matches!(
            encode(&["P1", ""]),
            Err(KeyError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn reject_reserved_chars() {
        assert!(encode(&["P\u{0}1"]).is_err());
        assert!(encode(&["P1", "te\u{0}mp"]).is_err());
        assert!(encode(&["P1", "max\u{10FFFF}"]).is_err());
    }

    #[test]
    fn non_ascii_attributes_are_allowed() {
        assert_eq!(encode(&["café", "température"]).unwrap(), "\0café\0température\0");
    }

    #[test]
    fn error_names_the_attribute() {
        let err = validate_attribute("").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn prefix_bounds_layout() {
        let range = prefix_bounds(&["A"]).unwrap();
        assert_eq!(range.start, "\0A\0");
        assert_eq!(range.end, "\0A\0\u{10FFFF}");
    }

    #[test]
    fn prefix_bounds_rejects_invalid() {
        assert!(prefix_bounds(&[""]).is_err());
    }

    #[test]
    fn range_isolates_textual_prefixes() {
        let a = prefix_bounds(&["A"]).unwrap();
        let ab = prefix_bounds(&["AB"]).unwrap();

        let a_key = encode(&["A", "temp"]).unwrap();
        let ab_key = encode(&["AB", "temp"]).unwrap();

        assert!(a.contains(&a_key));
        assert!(!a.contains(&ab_key));
        assert!(ab.contains(&ab_key));
        assert!(!ab.contains(&a_key));
    }

    #[test]
    fn range_excludes_its_end() {
        let range = prefix_bounds(&["A"]).unwrap();
        assert!(range.contains(&range.start));
        assert!(!range.contains(&range.end));
    }

    #[test]
    fn split_round_trip() {
        let key = encode(&["widget-1", "color"]).unwrap();
        assert_eq!(split(&key).unwrap(), vec!["widget-1", "color"]);
    }

    #[test]
    fn split_rejects_malformed() {
        for key in ["", "\0", "\0\0", "plain", "\0A", "A\0", "\0A\0\0B\0"] {
            assert!(
                matches!(split(key), Err(KeyError::MalformedKey { .. })),
                "expected {key:?} to be malformed"
            );
        }
    }

    /// Any char the codec accepts, biased towards the edges next to the
    /// reserved ones.
    fn attribute_char() -> impl Strategy<Value = char> {
        prop_oneof![
            4 => any::<char>(),
            1 => prop::sample::select(vec!['\u{1}', '\u{7f}', '\u{ffff}', '\u{10fffe}']),
        ]
        .prop_filter("reserved", |c| !RESERVED_CHARS.contains(c))
    }

    fn attribute() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9 _.:-]{1,8}",
            proptest::collection::vec(attribute_char(), 1..8)
                .prop_map(|chars| chars.into_iter().collect::<String>()),
        ]
    }

    fn attributes() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(attribute(), 1..4)
    }

    proptest! {
        /// Extending an attribute list extends its key.
        #[test]
        fn key_of_prefix_is_string_prefix(a in attributes(), b in attributes()) {
            let mut extended = a.clone();
            extended.extend(b);
            let short = encode(&a).unwrap();
            let long = encode(&extended).unwrap();
            prop_assert!(long.starts_with(&short));
            prop_assert!(prefix_bounds(&a).unwrap().contains(&long));
        }

        /// Key order matches element-wise attribute order.
        #[test]
        fn encoding_preserves_ordering(a in attributes(), b in attributes()) {
            prop_assert_eq!(a.cmp(&b), encode(&a).unwrap().cmp(&encode(&b).unwrap()));
        }

        /// A single-attribute range holds a key iff the key's first attribute matches.
        #[test]
        fn range_matches_only_its_entity(
            entity in attribute(),
            other in attribute(),
            property in attribute(),
        ) {
            let range = prefix_bounds(&[entity.as_str()]).unwrap();
            let key = encode(&[other.as_str(), property.as_str()]).unwrap();
            prop_assert_eq!(range.contains(&key), entity == other);
        }

        /// `split` inverts `encode`.
        #[test]
        fn split_inverts_encode(a in attributes()) {
            prop_assert_eq!(split(&encode(&a).unwrap()).unwrap(), a);
        }
    }
}
