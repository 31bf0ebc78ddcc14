/// Label templates
///
/// Data labels may embed a placeholder that stands for the run parameter
/// (alpha). It is replaced by the parameter formatted with two decimals.
pub const PLACEHOLDER: &str = "param";

/// Format the run parameter the way it appears inside data labels
pub fn format_alpha(alpha: f64) -> String {
    format!("{:.2}", alpha)
}

/// Replace every occurrence of the placeholder in `label`
pub fn expand_label(label: &str, alpha: f64) -> String {
    if !label.contains(PLACEHOLDER) {
        return label.to_string();
    }
    label.replace(PLACEHOLDER, &format_alpha(alpha))
}
