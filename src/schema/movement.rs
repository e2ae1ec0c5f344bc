//! `<forward>` and `<backup>` schemas

use serde_json::Value;

use super::fields::RecordReader;
use super::ValidationError;
use crate::models::{Backup, ElementKind, Forward};

/// Validate a `<forward>` record
pub fn forward(raw: &Value) -> Result<Forward, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::Forward, raw)?;

    let duration = r.required_integer("duration", 0, u32::MAX as i64);
    let voice = r.string("voice");
    let staff = r.integer("staff", 1, u32::MAX as i64).map(|s| s as u32);

    match duration {
        Some(duration) => r.finish(Forward {
            duration: duration as u32,
            voice,
            staff,
        }),
        None => r.reject(),
    }
}

/// Validate a `<backup>` record
pub fn backup(raw: &Value) -> Result<Backup, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::Backup, raw)?;

    match r.required_integer("duration", 0, u32::MAX as i64) {
        Some(duration) => r.finish(Backup {
            duration: duration as u32,
        }),
        None => r.reject(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidationProblem;
    use serde_json::json;

    #[test]
    fn test_forward_with_voice_and_staff() {
        let f = forward(&json!({ "_type": "forward", "duration": 8, "voice": "2", "staff": 2 })).unwrap();
        assert_eq!(f.duration, 8);
        assert_eq!(f.voice.as_deref(), Some("2"));
        assert_eq!(f.staff, Some(2));
    }

    #[test]
    fn test_zero_duration_allowed() {
        assert_eq!(backup(&json!({ "duration": 0 })).unwrap().duration, 0);
    }

    #[test]
    fn test_backup_requires_non_negative_duration() {
        let errors = backup(&json!({ "duration": -4 })).unwrap_err();
        assert!(matches!(errors[0].problem, ValidationProblem::OutOfRange { .. }));

        let errors = backup(&json!({})).unwrap_err();
        assert_eq!(errors[0].problem, ValidationProblem::Missing);
    }

    #[test]
    fn test_forward_staff_must_be_positive() {
        let errors = forward(&json!({ "duration": 1, "staff": 0 })).unwrap_err();
        assert_eq!(errors[0].field, "staff");
    }
}
