use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use natours_core::{Entity, FieldError, RawError, TourId};

const NAME_MIN_LEN: usize = 10;
const NAME_MAX_LEN: usize = 40;
const DEFAULT_RATINGS_AVERAGE: f64 = 4.5;

/// Tour difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Difficult => "difficult",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "difficult" => Some(Difficulty::Difficult),
            _ => None,
        }
    }
}

/// A stored tour document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(rename = "_id")]
    pub id: TourId,
    pub name: String,
    pub duration: u32,
    pub max_group_size: u32,
    pub difficulty: Difficulty,
    pub ratings_average: f64,
    pub ratings_quantity: u32,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<f64>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub start_dates: Vec<DateTime<Utc>>,
    pub secret_tour: bool,
}

/// Client-supplied tour fields. Every field is optional so the same shape
/// serves creation (missing required fields are reported) and partial updates.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourInput {
    pub name: Option<String>,
    pub duration: Option<u32>,
    pub max_group_size: Option<u32>,
    pub difficulty: Option<String>,
    pub ratings_average: Option<f64>,
    pub ratings_quantity: Option<u32>,
    pub price: Option<f64>,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    pub secret_tour: Option<bool>,
}

impl TourInput {
    /// Fields set in `patch` replace the ones in `self`.
    pub fn overlay(self, patch: TourInput) -> TourInput {
        TourInput {
            name: patch.name.or(self.name),
            duration: patch.duration.or(self.duration),
            max_group_size: patch.max_group_size.or(self.max_group_size),
            difficulty: patch.difficulty.or(self.difficulty),
            ratings_average: patch.ratings_average.or(self.ratings_average),
            ratings_quantity: patch.ratings_quantity.or(self.ratings_quantity),
            price: patch.price.or(self.price),
            price_discount: patch.price_discount.or(self.price_discount),
            summary: patch.summary.or(self.summary),
            description: patch.description.or(self.description),
            image_cover: patch.image_cover.or(self.image_cover),
            images: patch.images.or(self.images),
            start_dates: patch.start_dates.or(self.start_dates),
            secret_tour: patch.secret_tour.or(self.secret_tour),
        }
    }
}

impl From<&Tour> for TourInput {
    fn from(tour: &Tour) -> Self {
        Self {
            name: Some(tour.name.clone()),
            duration: Some(tour.duration),
            max_group_size: Some(tour.max_group_size),
            difficulty: Some(tour.difficulty.as_str().to_string()),
            ratings_average: Some(tour.ratings_average),
            ratings_quantity: Some(tour.ratings_quantity),
            price: Some(tour.price),
            price_discount: tour.price_discount,
            summary: Some(tour.summary.clone()),
            description: tour.description.clone(),
            image_cover: Some(tour.image_cover.clone()),
            images: Some(tour.images.clone()),
            start_dates: Some(tour.start_dates.clone()),
            secret_tour: Some(tour.secret_tour),
        }
    }
}

impl Tour {
    /// Validate `input` and build a new tour document.
    pub fn create(id: TourId, input: TourInput, created_at: DateTime<Utc>) -> Result<Tour, RawError> {
        build(id, input, created_at)
    }

    /// Apply a partial update, re-running every schema rule on the result.
    pub fn update(&self, patch: TourInput) -> Result<Tour, RawError> {
        let merged = TourInput::from(self).overlay(patch);
        build(self.id, merged, self.created_at)
    }
}

impl Entity for Tour {
    type Id = TourId;

    fn id(&self) -> TourId {
        self.id
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }
}

fn build(id: TourId, input: TourInput, created_at: DateTime<Utc>) -> Result<Tour, RawError> {
    let mut errors = Vec::new();

    let name = input.name.as_deref().map(str::trim).unwrap_or_default().to_string();
    if name.is_empty() {
        errors.push(FieldError::new("name", "required", "A tour must have a name"));
    } else if name.chars().count() > NAME_MAX_LEN {
        errors.push(
            FieldError::new(
                "name",
                "maxlength",
                "A tour name must have less or equal then 40 characters",
            )
            .with_value(name.clone()),
        );
    } else if name.chars().count() < NAME_MIN_LEN {
        errors.push(
            FieldError::new(
                "name",
                "minlength",
                "A tour name must have more or equal then 10 characters",
            )
            .with_value(name.clone()),
        );
    }

    let duration = required_positive(&mut errors, "duration", input.duration, "A tour must have a duration");
    let max_group_size = required_positive(
        &mut errors,
        "maxGroupSize",
        input.max_group_size,
        "A tour must have a group size",
    );

    let difficulty = match input.difficulty.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(FieldError::new("difficulty", "required", "A tour must have a difficulty"));
            None
        }
        Some(raw) => {
            let parsed = Difficulty::parse(raw);
            if parsed.is_none() {
                errors.push(
                    FieldError::new("difficulty", "enum", "Difficulty is either: easy, medium, difficult")
                        .with_value(raw),
                );
            }
            parsed
        }
    };

    let ratings_average = input.ratings_average.unwrap_or(DEFAULT_RATINGS_AVERAGE);
    if ratings_average < 1.0 {
        errors.push(
            FieldError::new("ratingsAverage", "min", "Rating must be above 1.0").with_value(ratings_average),
        );
    } else if ratings_average > 5.0 {
        errors.push(
            FieldError::new("ratingsAverage", "max", "Rating must be below 5.0").with_value(ratings_average),
        );
    }

    let price = input.price;
    if price.is_none() {
        errors.push(FieldError::new("price", "required", "A tour must have a price"));
    }

    if let (Some(discount), Some(price)) = (input.price_discount, price) {
        if discount >= price {
            errors.push(
                FieldError::new(
                    "priceDiscount",
                    "user defined",
                    format!("Discount price ({discount}) should be below regular price"),
                )
                .with_value(discount),
            );
        }
    }

    let summary = input.summary.as_deref().map(str::trim).unwrap_or_default().to_string();
    if summary.is_empty() {
        errors.push(FieldError::new("summary", "required", "A tour must have a description"));
    }

    let image_cover = input.image_cover.unwrap_or_default();
    if image_cover.trim().is_empty() {
        errors.push(FieldError::new("imageCover", "required", "A tour must have a cover image"));
    }

    if !errors.is_empty() {
        return Err(RawError::validation("Tour", errors));
    }

    match (duration, max_group_size, difficulty, price) {
        (Some(duration), Some(max_group_size), Some(difficulty), Some(price)) => Ok(Tour {
            id,
            name,
            duration,
            max_group_size,
            difficulty,
            ratings_average,
            ratings_quantity: input.ratings_quantity.unwrap_or(0),
            price,
            price_discount: input.price_discount,
            summary,
            description: input.description.map(|d| d.trim().to_string()),
            image_cover,
            images: input.images.unwrap_or_default(),
            created_at,
            start_dates: input.start_dates.unwrap_or_default(),
            secret_tour: input.secret_tour.unwrap_or(false),
        }),
        _ => Err(RawError::validation("Tour", Vec::new())),
    }
}

fn required_positive(
    errors: &mut Vec<FieldError>,
    path: &'static str,
    value: Option<u32>,
    message: &str,
) -> Option<u32> {
    match value {
        None => {
            errors.push(FieldError::new(path, "required", message));
            None
        }
        Some(0) => {
            errors.push(FieldError::new(path, "min", format!("{path} must be at least 1")).with_value(0));
            None
        }
        Some(v) => Some(v),
    }
}
