use std::cmp::min;
use syn::Path;

/// True when the trailing segments of `path` match the trailing items of `expect`.
///
/// `std::vec::Vec`, `vec::Vec` and `Vec` all match `["std", "vec", "Vec"]`.
pub fn matches_path(path: &Path, expect: &[&str]) -> bool {
    let len = min(path.segments.len(), expect.len());
    path.segments
        .iter()
        .rev()
        .take(len)
        .map(|v| &v.ident)
        .eq(expect.iter().rev().take(len))
}

pub fn consume_while<'s>(input: &mut &'s str, predicate: impl FnMut(&char) -> bool) -> &'s str {
    let len: usize = input
        .chars()
        .take_while(predicate)
        .map(char::len_utf8)
        .sum();
    if len == 0 {
        return "";
    }
    let result = &input[..len];
    *input = &input[len..];
    result
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            &$query[..$query
                .char_indices()
                .nth(497)
                .map(|(i, _)| i)
                .unwrap_or($query.len())]
                .trim_end(),
            if $query.chars().count() > 497 { "..." } else { "" },
        )
    };
}

/// Builds the argument list of an invocation, converting every item into a [`Value`](crate::Value).
///
/// ```rust
/// use rivet_core::{Value, args};
/// let arguments = args![42, "active", None::<i64>];
/// assert_eq!(arguments[0], Value::Int32(Some(42)));
/// assert_eq!(arguments[2], Value::Int64(None));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}
