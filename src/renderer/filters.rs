use log::warn;
use regex::Regex;

pub use cruet::{
    case::{
        camel::to_camel_case, kebab::to_kebab_case, pascal::to_pascal_case,
        screaming_snake::to_screaming_snake_case, snake::to_snake_case,
        train::to_train_case,
    },
    string::{pluralize::to_plural, singularize::to_singular},
};

/// Tests if a string matches a given regular expression pattern.
///
/// An invalid pattern never matches.
pub fn regex_filter(val: &str, re: &str) -> bool {
    match Regex::new(re) {
        Ok(re) => re.is_match(val),
        Err(err) => {
            warn!("Invalid regex '{re}': {err}");
            false
        }
    }
}

/// Replaces every match of `re` in `val` with `replacement`.
///
/// Capture groups are available as `$1`, `$name`. An invalid pattern leaves
/// the input unchanged.
pub fn regex_replace_filter(val: &str, re: &str, replacement: &str) -> String {
    match Regex::new(re) {
        Ok(re) => re.replace_all(val, replacement).into_owned(),
        Err(err) => {
            warn!("Invalid regex '{re}': {err}");
            val.to_string()
        }
    }
}
