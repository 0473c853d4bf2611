//! Percent-encoding of identifiers and query values

use compact_str::{CompactString, ToCompactString};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything but ASCII alphanumerics and `- _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// RFC 5987 value characters: alphanumerics and `- _ . ! ~ | ` ^`.
const RFC5987_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'|')
    .remove(b'`')
    .remove(b'^');

/// Encode a path identifier such as `"namespace/name"` as one URL segment.
pub fn encode_path_segment(value: &str) -> CompactString {
    utf8_percent_encode(value, RFC5987_VALUE).to_compact_string()
}

/// Encode a query parameter value.
pub fn encode_component(value: &str) -> CompactString {
    utf8_percent_encode(value, URI_COMPONENT).to_compact_string()
}

/// Encode a repository file path for the files API.
///
/// Dots are escaped as well so `..` segments never reach GitLab's router.
pub fn encode_file_path(path: &str) -> CompactString {
    encode_component(path).replace('.', "%2E").into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_escape_slashes_and_quotes() {
        assert_eq!(encode_path_segment("group/project"), "group%2Fproject");
        assert_eq!(encode_path_segment("a-b_c.d!e~f|g`h^i"), "a-b_c.d!e~f|g`h^i");
        assert_eq!(encode_path_segment("it's (mine)*"), "it%27s%20%28mine%29%2A");
        assert_eq!(encode_path_segment("grüne"), "gr%C3%BCne");
    }

    #[test]
    fn components_keep_uri_marks() {
        assert_eq!(encode_component("No Milestone"), "No%20Milestone");
        assert_eq!(encode_component("feature/x*(y)"), "feature%2Fx*(y)");
        assert_eq!(encode_component("a&b=c"), "a%26b%3Dc");
    }

    #[test]
    fn file_paths_escape_every_dot() {
        assert_eq!(encode_file_path("lib/class.rb"), "lib%2Fclass%2Erb");
        assert_eq!(encode_file_path("../.env"), "%2E%2E%2F%2Eenv");
    }
}
