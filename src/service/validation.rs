//! Request validation from config rules.

use crate::config::ValidationRule;
use crate::error::AppError;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against per-column rules. All required fields must be
    /// present.
    pub fn validate(
        body: &HashMap<String, Value>,
        rules: &HashMap<String, ValidationRule>,
    ) -> Result<(), AppError> {
        for (col, rule) in rules {
            let val = body.get(col);
            if rule.required == Some(true) && (val.is_none() || val == Some(&Value::Null)) {
                return Err(AppError::Validation(format!("{} is required", col)));
            }
            if let Some(v) = val {
                validate_field(col, v, rule)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (for PATCH). Required is not
    /// enforced for missing fields.
    pub fn validate_partial(
        body: &HashMap<String, Value>,
        rules: &HashMap<String, ValidationRule>,
    ) -> Result<(), AppError> {
        for (col, v) in body {
            if let Some(rule) = rules.get(col) {
                validate_field(col, v, rule)?;
            }
        }
        Ok(())
    }
}

fn validate_field(col: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(format) = &rule.format {
        validate_format(col, v, format)?;
    }
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.len() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col, max
                )));
            }
        }
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = v.as_str() {
            if s.len() < min as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    col, min
                )));
            }
        }
    }
    if let Some(ref pattern) = rule.pattern {
        let re = Regex::new(pattern)
            .map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!(
                    "{} does not match required pattern",
                    col
                )));
            }
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            return Err(AppError::Validation(format!(
                "{} must be one of: {:?}",
                col,
                allowed.iter().take(5).collect::<Vec<_>>()
            )));
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = v.as_f64() {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", col, min)));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = v.as_f64() {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(col: &str, v: &Value, format: &str) -> Result<(), AppError> {
    match format.to_lowercase().as_str() {
        "email" => {
            if let Some(s) = v.as_str() {
                if !s.contains('@') || s.len() < 3 {
                    return Err(AppError::Validation(format!("{} must be a valid email", col)));
                }
            }
        }
        "uuid" => {
            if let Some(s) = v.as_str() {
                if uuid::Uuid::parse_str(s).is_err() {
                    return Err(AppError::Validation(format!("{} must be a valid UUID", col)));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(col: &str, rule: ValidationRule) -> HashMap<String, ValidationRule> {
        let mut m = HashMap::new();
        m.insert(col.to_string(), rule);
        m
    }

    fn body(col: &str, v: Value) -> HashMap<String, Value> {
        let mut m = HashMap::new();
        m.insert(col.to_string(), v);
        m
    }

    #[test]
    fn required_field_must_be_present_and_non_null() {
        let r = rules("title", ValidationRule { required: Some(true), ..Default::default() });
        assert!(RequestValidator::validate(&HashMap::new(), &r).is_err());
        assert!(RequestValidator::validate(&body("title", Value::Null), &r).is_err());
        assert!(RequestValidator::validate(&body("title", json!("x")), &r).is_ok());
    }

    #[test]
    fn partial_validation_skips_missing_required() {
        let r = rules("title", ValidationRule { required: Some(true), ..Default::default() });
        assert!(RequestValidator::validate_partial(&HashMap::new(), &r).is_ok());
    }

    #[test]
    fn length_bounds() {
        let r = rules(
            "title",
            ValidationRule { min_length: Some(3), max_length: Some(5), ..Default::default() },
        );
        assert!(RequestValidator::validate(&body("title", json!("ab")), &r).is_err());
        assert!(RequestValidator::validate(&body("title", json!("abcdef")), &r).is_err());
        assert!(RequestValidator::validate(&body("title", json!("abcd")), &r).is_ok());
    }

    #[test]
    fn allowed_values_compare_numbers_loosely() {
        let r = rules(
            "rating",
            ValidationRule { allowed: Some(vec![json!(1), json!(2), json!(3)]), ..Default::default() },
        );
        assert!(RequestValidator::validate(&body("rating", json!(2.0)), &r).is_ok());
        assert!(RequestValidator::validate(&body("rating", json!(9)), &r).is_err());
    }

    #[test]
    fn uuid_format() {
        let r = rules("fund_id", ValidationRule { format: Some("uuid".into()), ..Default::default() });
        assert!(RequestValidator::validate(
            &body("fund_id", json!("67e55044-10b1-426f-9247-bb680e5fe0c8")),
            &r
        )
        .is_ok());
        assert!(RequestValidator::validate(&body("fund_id", json!("nope")), &r).is_err());
    }
}
