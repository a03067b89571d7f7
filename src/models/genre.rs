//! Genre model and the fixed choice set

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// The fixed set of genre names the catalog accepts.
pub const GENRE_CHOICES: [&str; 7] = [
    "horror",
    "mystery",
    "romance",
    "fantasy",
    "adventure",
    "comedy",
    "other",
];

pub fn is_genre_choice(name: &str) -> bool {
    GENRE_CHOICES.contains(&name)
}

pub fn validate_genre_choice(name: &str) -> Result<(), validator::ValidationError> {
    if is_genre_choice(name) {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("genre_choice");
        error.message = Some(format!("must be one of: {}", GENRE_CHOICES.join(", ")).into());
        Err(error)
    }
}

/// Genre row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Create genre request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGenre {
    #[validate(custom(function = validate_genre_choice))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_choices_are_accepted() {
        for name in GENRE_CHOICES {
            assert!(validate_genre_choice(name).is_ok(), "{} rejected", name);
        }
    }

    #[test]
    fn unknown_choice_is_rejected_with_a_message() {
        let error = validate_genre_choice("western").unwrap_err();
        assert!(error.message.unwrap().contains("must be one of"));
    }
}
