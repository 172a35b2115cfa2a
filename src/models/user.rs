use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A persisted user row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// 36-character UUID v4, minted by the service
    pub id: String,
    pub fullname: String,
    pub study_level: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User fields after validation: trimmed and range-checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub fullname: String,
    pub study_level: String,
    pub age: i32,
}

impl User {
    /// Mint a new user with a fresh identifier
    pub fn create(fields: UserFields, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            fullname: fields.fullname,
            study_level: fields.study_level,
            age: fields.age,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field, keeping `id` and `created_at`
    pub fn apply(&mut self, fields: UserFields, now: DateTime<Utc>) {
        self.fullname = fields.fullname;
        self.study_level = fields.study_level;
        self.age = fields.age;
        self.updated_at = now;
    }
}

/// Raw request body for create and update
///
/// Each field keeps the difference between "missing" (`None`) and an explicit
/// JSON `null` (`Some(Value::Null)`), which the validator treats differently
/// for `age`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserPayload {
    #[serde(default, deserialize_with = "present")]
    pub fullname: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub study_level: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
