/// Bound-variable references arrive from traversal wrapped for routing: a
/// `VariableID:` prefix, and for library-routed references a key segment
/// before a `/` separator. Lookups need the bare identifier.
pub fn normalize_variable_id(raw: &str) -> String {
    let trimmed = raw.strip_prefix("VariableID:").unwrap_or(raw);
    match trimmed.rfind('/') {
        Some(separator) => trimmed[separator + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_variable_id;

    #[test]
    fn strips_routing_prefix() {
        assert_eq!(normalize_variable_id("VariableID:12:34"), "12:34");
    }

    #[test]
    fn strips_library_segment() {
        assert_eq!(normalize_variable_id("VariableID:abc123/56:78"), "56:78");
        assert_eq!(normalize_variable_id("abc123/56:78"), "56:78");
    }

    #[test]
    fn passes_bare_ids_through() {
        assert_eq!(normalize_variable_id("12:34"), "12:34");
    }

    #[test]
    fn empty_reference_stays_empty() {
        assert_eq!(normalize_variable_id(""), "");
        assert_eq!(normalize_variable_id("VariableID:"), "");
    }
}
