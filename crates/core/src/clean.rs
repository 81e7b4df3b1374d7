use regex::Regex;

/// Strip HTML markup from a free-text study field.
///
/// Removes everything between angle brackets, replaces the literal
/// `&nbsp;` entity with a space and `&amp;` with `&`, then trims
/// surrounding whitespace. No other entities are decoded. This is a
/// best-effort strip for feed text, not an HTML parser; malformed or
/// unbalanced markup never causes an error.
pub fn clean(text: &str) -> String {
    let re = Regex::new(r"<[^>]*>").unwrap();
    let stripped = re.replace_all(text, "");
    stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
