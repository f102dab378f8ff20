use once_cell::sync::Lazy;
use regex::Regex;

// Namespace identifier followed by one or more colon-separated specific tokens.
static URN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{0,31}(:[A-Za-z0-9()+,\-.=@;$_!*'%/?#]+)+$")
        .expect("URN pattern is a valid regex")
});

/// Whether `urn` follows the `namespace:token[:token...]` grammar.
pub fn is_valid_urn(urn: &str) -> bool {
    URN_PATTERN.is_match(urn)
}

/// Whether `id` is a hyphenated UUID, the shape of generated child-slot ids.
pub fn is_valid_uuid(id: &str) -> bool {
    id.len() == 36 && uuid::Uuid::try_parse(id).is_ok()
}
