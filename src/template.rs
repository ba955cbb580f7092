/// Replace `<KEY>` markers in `text` with their substitution values.
///
/// Markers with no entry in `substitutions` are left untouched.
pub fn substitute(text: &str, substitutions: &[(&str, String)]) -> String {
    substitutions
        .iter()
        .fold(text.to_string(), |text, (key, value)| {
            text.replace(&format!("<{key}>"), value)
        })
}
