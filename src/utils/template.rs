//! Literal `$TOKEN` placeholder substitution.

pub struct TemplateVars;

impl TemplateVars {
    pub const PROJECT_NAME: &'static str = "PROJECT_NAME";
    pub const LINKS: &'static str = "LINKS";
    pub const DATE: &'static str = "DATE";
}

/// Replace every `$KEY` occurrence, one variable at a time in slice order.
///
/// Tokens without a matching variable are left verbatim. A value containing
/// a later token is substituted too, since replacement runs sequentially.
pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("${}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

pub fn is_present(template: &str, key: &str) -> bool {
    template.contains(&format!("${}", key))
}
