/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Package and namespace naming for generated clients.
 */

/// Convert a hyphen-delimited identifier into a capitalized package name.
///
/// The first character is uppercased, and every hyphen followed by a word
/// character (`[A-Za-z0-9_]`) is removed while that character is uppercased.
/// A hyphen not followed by a word character is left in place. Empty input
/// is returned unchanged.
///
/// ```rust
/// use specsync_core::to_package_name;
///
/// assert_eq!(to_package_name("widget-api-client"), "WidgetApiClient");
/// assert_eq!(to_package_name("a--b"), "A-B");
/// ```
pub fn to_package_name(identifier: &str) -> String {
    let mut result = String::with_capacity(identifier.len());
    let mut chars = identifier.chars().peekable();
    let mut at_start = true;

    while let Some(c) = chars.next() {
        if c == '-' {
            if let Some(&next) = chars.peek() {
                if is_word_char(next) {
                    chars.next();
                    result.extend(next.to_uppercase());
                    at_start = false;
                    continue;
                }
            }
            result.push(c);
        } else if at_start {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        at_start = false;
    }

    result
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// How a spec repository identifier becomes a client identifier.
///
/// Applied to the hyphenated identifier, before [`to_package_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixPolicy {
    /// Use the identifier as-is
    Keep,
    /// Append a fixed suffix (`widget-api` + `-client`)
    Append(String),
    /// Swap a trailing suffix (`widget-api` → `widget-client`).
    /// Identifiers without `from` get `to` appended instead.
    Replace { from: String, to: String },
}

impl SuffixPolicy {
    /// Derive the client identifier for `identifier`
    pub fn apply(&self, identifier: &str) -> String {
        match self {
            SuffixPolicy::Keep => identifier.to_string(),
            SuffixPolicy::Append(suffix) => format!("{identifier}{suffix}"),
            SuffixPolicy::Replace { from, to } => match identifier.strip_suffix(from.as_str()) {
                Some(stem) if !from.is_empty() => format!("{stem}{to}"),
                _ => format!("{identifier}{to}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_package_name_basic() {
        assert_eq!(to_package_name("widget-api"), "WidgetApi");
        assert_eq!(to_package_name("widget-api-client"), "WidgetApiClient");
        assert_eq!(to_package_name("widget"), "Widget");
    }

    #[test]
    fn test_to_package_name_empty() {
        assert_eq!(to_package_name(""), "");
    }

    #[test]
    fn test_to_package_name_hyphen_edge_cases() {
        // Trailing hyphen has no word character to merge with
        assert_eq!(to_package_name("widget-"), "Widget-");
        // Only the second hyphen of a pair is followed by a word character
        assert_eq!(to_package_name("a--b"), "A-B");
        // Digits and underscores count as word characters
        assert_eq!(to_package_name("v-2-api"), "V2Api");
        assert_eq!(to_package_name("a-_b"), "A_b");
        // Leading hyphen merges with the next character
        assert_eq!(to_package_name("-widget"), "Widget");
        // Non-word characters after a hyphen are left alone
        assert_eq!(to_package_name("a-.b"), "A-.b");
    }

    #[test]
    fn test_to_package_name_keeps_existing_case() {
        assert_eq!(to_package_name("Widget-API"), "WidgetAPI");
        assert_eq!(to_package_name("myHTTP-service"), "MyHTTPService");
    }

    #[test]
    fn test_to_package_name_properties() {
        let inputs = [
            "widget-api",
            "a-b-c-d",
            "x--y",
            "-lead",
            "trail-",
            "mixed-Case-id",
            "with_underscore-part",
            "n-1-2-3",
            "q",
        ];

        for input in inputs {
            let name = to_package_name(input);
            let chars: Vec<char> = name.chars().collect();
            for pair in chars.windows(2) {
                assert!(
                    !(pair[0] == '-' && pair[1].is_ascii_lowercase()),
                    "{input} -> {name} still has a hyphen before a lowercase letter"
                );
            }
            let first = chars[0];
            assert!(
                !first.is_ascii_lowercase(),
                "{input} -> {name} does not start uppercase"
            );
        }
    }

    #[test]
    fn test_suffix_policy_keep() {
        assert_eq!(SuffixPolicy::Keep.apply("widget-api"), "widget-api");
    }

    #[test]
    fn test_suffix_policy_append() {
        let policy = SuffixPolicy::Append("-client".to_string());
        assert_eq!(policy.apply("widget-api"), "widget-api-client");
        assert_eq!(to_package_name(&policy.apply("widget-api")), "WidgetApiClient");
    }

    #[test]
    fn test_suffix_policy_replace() {
        let policy = SuffixPolicy::Replace {
            from: "-api".to_string(),
            to: "-client".to_string(),
        };
        assert_eq!(policy.apply("widget-api"), "widget-client");
        assert_eq!(to_package_name(&policy.apply("widget-api")), "WidgetClient");
        // Without the suffix the replacement is appended
        assert_eq!(policy.apply("widgets"), "widgets-client");
    }

    #[test]
    fn test_suffix_policy_replace_empty_from_appends() {
        let policy = SuffixPolicy::Replace {
            from: String::new(),
            to: "-client".to_string(),
        };
        assert_eq!(policy.apply("widget"), "widget-client");
    }
}
