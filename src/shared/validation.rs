use validator::{ValidationError, ValidationErrors};

/// Schema-level check shared by sign-up style forms
pub fn validate_passwords_match(password: &str, confirm_password: &str) -> Result<(), ValidationError> {
    if password == confirm_password {
        Ok(())
    } else {
        let mut error = ValidationError::new("password_mismatch");
        error.message = Some("Passwords do not match".into());
        Err(error)
    }
}

/// First human-readable message out of a validation failure.
///
/// Falls back to the `Display` form when no rule carried a message.
pub fn first_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .collect();
    messages.sort();

    messages
        .into_iter()
        .next()
        .unwrap_or_else(|| errors.to_string())
}
