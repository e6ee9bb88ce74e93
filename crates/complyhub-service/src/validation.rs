//! Bridges `validator` derive output into [`AppError`] field errors.

use validator::{Validate, ValidationErrors};

use complyhub_core::error::{AppError, FieldError};

/// Run the derived validation rules of `request`.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request.validate().map_err(into_app_error)
}

fn into_app_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let name = camel_case(&field);
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{name} is invalid"));
                FieldError::new(name.clone(), message)
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));

    let message = fields
        .first()
        .map(|f| f.message.clone())
        .unwrap_or_else(|| "Validation failed".to_string());
    AppError::validation(message).with_errors(fields)
}

/// `phone_number` -> `phoneNumber`, matching the JSON field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use complyhub_core::error::ErrorKind;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(email(message = "Invalid email address"))]
        email: String,
        #[validate(length(min = 3, message = "Phone number is too short"))]
        phone_number: String,
    }

    #[test]
    fn reports_camel_case_fields() {
        let err = validate_request(&Sample {
            email: "nope".into(),
            phone_number: "1".into(),
        })
        .expect_err("invalid");
        assert_eq!(err.kind, ErrorKind::Validation);
        let names: Vec<_> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(names, ["email", "phoneNumber"]);
        assert_eq!(err.message, "Invalid email address");
    }

    #[test]
    fn valid_input_passes() {
        let ok = Sample {
            email: "a@example.com".into(),
            phone_number: "5550100".into(),
        };
        assert!(validate_request(&ok).is_ok());
    }
}
