use validator::ValidationErrors;

use crate::core::error::FieldViolation;

/// Convert a snake_case struct field into the camelCase name clients submit
pub fn wire_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Flatten `validator` errors into one violation per field, sorted by field
/// name so callers see a stable order.
pub fn field_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let message = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "is invalid".to_string());
            FieldViolation::new(wire_field_name(&field), message)
        })
        .collect();
    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations
}
