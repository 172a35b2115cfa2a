use crate::core::error::ValidationError;
use crate::models::user::{UserFields, UserPayload};
use serde_json::Value;

/// Inclusive upper bound for `age`
pub const MAX_AGE: i64 = 150;

impl UserPayload {
    /// Check the payload against the field rules
    ///
    /// Rules run in order and the first failure wins:
    /// 1. all three fields present (`fullname` and `study_level` must also be
    ///    truthy; `age` only has to be present, so `0` and `null` pass here)
    /// 2. `fullname` is a string, non-empty once trimmed
    /// 3. `study_level` is a string, non-empty once trimmed
    /// 4. `age` is an integer greater than 0
    /// 5. `age` is at most 150
    pub fn validate(&self) -> Result<UserFields, ValidationError> {
        let fullname = self.fullname.as_ref().filter(|v| is_truthy(v));
        let study_level = self.study_level.as_ref().filter(|v| is_truthy(v));

        let (Some(fullname), Some(study_level), Some(age)) =
            (fullname, study_level, self.age.as_ref())
        else {
            return Err(ValidationError::MissingFields);
        };

        let fullname = non_blank(fullname).ok_or(ValidationError::InvalidFullname)?;
        let study_level = non_blank(study_level).ok_or(ValidationError::InvalidStudyLevel)?;

        let age = positive_integer(age).ok_or(ValidationError::InvalidAge)?;
        if age > MAX_AGE {
            return Err(ValidationError::AgeOutOfRange);
        }

        Ok(UserFields {
            fullname,
            study_level,
            // Bounded by MAX_AGE above
            age: age as i32,
        })
    }
}

/// Truthiness as seen by a dynamically typed client: `null`, `false`, `0` and
/// `""` count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_blank(value: &Value) -> Option<String> {
    let trimmed = value.as_str()?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accepts integral JSON numbers, including `25.0`
fn positive_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };

    let n = if let Some(i) = number.as_i64() {
        i
    } else {
        let f = number.as_f64()?;
        if f.fract() != 0.0 || !f.is_finite() {
            return None;
        }
        // Anything this large fails the upper bound anyway
        if f > i64::MAX as f64 {
            i64::MAX
        } else {
            f as i64
        }
    };

    (n > 0).then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> UserPayload {
        serde_json::from_value(value).expect("payload should deserialize")
    }

    #[test]
    fn test_valid_payload_is_trimmed() {
        let fields = payload(json!({
            "fullname": "  Ada Lovelace ",
            "study_level": "\tMaster\n",
            "age": 36
        }))
        .validate()
        .unwrap();

        assert_eq!(fields.fullname, "Ada Lovelace");
        assert_eq!(fields.study_level, "Master");
        assert_eq!(fields.age, 36);
    }

    #[test]
    fn test_missing_fields() {
        let cases = vec![
            json!({}),
            json!({ "study_level": "Master", "age": 20 }),
            json!({ "fullname": "Ada", "age": 20 }),
            json!({ "fullname": "Ada", "study_level": "Master" }),
        ];

        for case in cases {
            assert_eq!(
                payload(case.clone()).validate(),
                Err(ValidationError::MissingFields),
                "case {}",
                case
            );
        }
    }

    #[test]
    fn test_falsy_text_fields_count_as_missing() {
        for falsy in [json!(""), json!(null), json!(false), json!(0)] {
            let result = payload(json!({
                "fullname": falsy,
                "study_level": "Master",
                "age": 20
            }))
            .validate();
            assert_eq!(result, Err(ValidationError::MissingFields));
        }
    }

    #[test]
    fn test_blank_fullname() {
        let result = payload(json!({ "fullname": "   ", "study_level": "Master", "age": 20 })).validate();
        assert_eq!(result, Err(ValidationError::InvalidFullname));
    }

    #[test]
    fn test_non_string_fullname() {
        let result = payload(json!({ "fullname": 42, "study_level": "Master", "age": 20 })).validate();
        assert_eq!(result, Err(ValidationError::InvalidFullname));
    }

    #[test]
    fn test_blank_study_level() {
        let result = payload(json!({ "fullname": "Ada", "study_level": " \t ", "age": 20 })).validate();
        assert_eq!(result, Err(ValidationError::InvalidStudyLevel));
    }

    #[test]
    fn test_age_zero_passes_presence_but_fails_integer_rule() {
        let result = payload(json!({ "fullname": "Ada", "study_level": "Master", "age": 0 })).validate();
        assert_eq!(result, Err(ValidationError::InvalidAge));
    }

    #[test]
    fn test_age_null_fails_integer_rule() {
        let result = payload(json!({ "fullname": "Ada", "study_level": "Master", "age": null })).validate();
        assert_eq!(result, Err(ValidationError::InvalidAge));
    }

    #[test]
    fn test_invalid_ages() {
        for age in [json!(-1), json!(25.5), json!("25"), json!(true), json!([25])] {
            let result = payload(json!({ "fullname": "Ada", "study_level": "Master", "age": age })).validate();
            assert_eq!(result, Err(ValidationError::InvalidAge), "age {}", age);
        }
    }

    #[test]
    fn test_integral_float_age_is_accepted() {
        let fields = payload(json!({ "fullname": "Ada", "study_level": "Master", "age": 25.0 }))
            .validate()
            .unwrap();
        assert_eq!(fields.age, 25);
    }

    #[test]
    fn test_age_upper_bound_is_inclusive() {
        let ok = payload(json!({ "fullname": "Ada", "study_level": "Master", "age": 150 })).validate();
        assert_eq!(ok.unwrap().age, 150);

        for age in [json!(151), json!(1e300), json!(u64::MAX)] {
            let result = payload(json!({ "fullname": "Ada", "study_level": "Master", "age": age })).validate();
            assert_eq!(result, Err(ValidationError::AgeOutOfRange), "age {}", age);
        }
    }

    #[test]
    fn test_first_failure_wins() {
        // Both text fields are blank and age is out of range
        let result = payload(json!({ "fullname": " ", "study_level": " ", "age": 500 })).validate();
        assert_eq!(result, Err(ValidationError::InvalidFullname));
    }
}
