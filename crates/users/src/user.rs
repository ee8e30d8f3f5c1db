use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use natours_core::{Entity, FieldError, RawError, UserId};

/// Access role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    #[default]
    User,
    Guide,
    LeadGuide,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Guide => "guide",
            Role::LeadGuide => "lead-guide",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "guide" => Some(Role::Guide),
            "lead-guide" => Some(Role::LeadGuide),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// A stored user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied user fields (all optional; see [`User::create`] / [`User::update`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub role: Option<String>,
}

impl User {
    pub fn create(id: UserId, input: UserInput, created_at: DateTime<Utc>) -> Result<User, RawError> {
        build(id, input, created_at)
    }

    /// Apply a partial update; unspecified fields keep their current value.
    pub fn update(&self, patch: UserInput) -> Result<User, RawError> {
        let merged = UserInput {
            name: patch.name.or_else(|| Some(self.name.clone())),
            email: patch.email.or_else(|| Some(self.email.clone())),
            photo: patch.photo.or_else(|| self.photo.clone()),
            role: patch.role.or_else(|| Some(self.role.as_str().to_string())),
        };
        build(self.id, merged, self.created_at)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email.clone())]
    }
}

fn build(id: UserId, input: UserInput, created_at: DateTime<Utc>) -> Result<User, RawError> {
    let mut errors = Vec::new();

    let name = input.name.as_deref().map(str::trim).unwrap_or_default().to_string();
    if name.is_empty() {
        errors.push(FieldError::new("name", "required", "Please tell us your name!"));
    }

    let email = input
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    if email.is_empty() {
        errors.push(FieldError::new("email", "required", "Please provide your email"));
    } else if !looks_like_email(&email) {
        errors.push(
            FieldError::new("email", "user defined", "Please provide a valid email").with_value(email.clone()),
        );
    }

    let role = match input.role.as_deref() {
        None => Some(Role::default()),
        Some(raw) => {
            let parsed = Role::parse(raw);
            if parsed.is_none() {
                errors.push(
                    FieldError::new("role", "enum", "Role is either: user, guide, lead-guide, admin")
                        .with_value(raw),
                );
            }
            parsed
        }
    };

    match role {
        Some(role) if errors.is_empty() => Ok(User {
            id,
            name,
            email,
            photo: input.photo,
            role,
            created_at,
        }),
        _ => Err(RawError::validation("User", errors)),
    }
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !s.chars().any(char::is_whitespace)
}
