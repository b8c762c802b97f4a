//! User profile
//!
//! The one backend payload the client reads fields from. Everything the
//! backend adds beyond these fields is kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET users/me/`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Nested student details
    #[serde(default)]
    pub profile: Option<ProfileDetails>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Student details nested under `profile`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileDetails {
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl UserProfile {
    /// The eight fields a complete profile must have
    fn required_fields(&self) -> [bool; 8] {
        let details = self.profile.as_ref();
        let detail = |value: Option<&Option<String>>| value.is_some_and(filled);
        [
            filled(&self.first_name),
            filled(&self.last_name),
            filled(&self.phone),
            detail(details.map(|d| &d.date_of_birth)),
            detail(details.map(|d| &d.gender)),
            detail(details.map(|d| &d.address)),
            detail(details.map(|d| &d.nationality)),
            detail(details.map(|d| &d.field_of_study)),
        ]
    }

    /// Every required field present, including the nested details
    pub fn is_profile_complete(&self) -> bool {
        self.profile.is_some() && self.required_fields().iter().all(|f| *f)
    }

    /// Share of required fields filled, rounded to a whole percent
    pub fn profile_completion(&self) -> u8 {
        let fields = self.required_fields();
        let done = fields.iter().filter(|f| **f).count();
        ((done * 100) as f64 / fields.len() as f64).round() as u8
    }

    /// Upper-cased first letters of first and last name
    pub fn initials(&self) -> String {
        [&self.first_name, &self.last_name]
            .into_iter()
            .filter_map(|name| name.as_deref().and_then(|n| n.chars().next()))
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Best name to show for the user
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                format!("{first} {last}")
            }
            (Some(first), _) if !first.is_empty() => first.to_string(),
            _ => self.username.clone(),
        }
    }
}
