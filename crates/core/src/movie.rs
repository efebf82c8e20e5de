//! Movie and opinion records.
//!
//! These are the shapes stored in the catalog document and returned by the store. Field
//! names match the persisted JSON exactly.
//!
//! Reading is lenient because the document may be edited by hand or carry records written
//! by older versions: text fields accept any JSON scalar, ids may be numbers, and a date
//! that is not `YYYY-MM-DD` is read as no date. One odd record never makes the rest of the
//! catalog unreadable.

use crate::constants::MAX_OPINIONS_PER_MOVIE;
use catalog_files::AssetRef;
use catalog_types::Rating;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Movie {
    /// Opaque identifier; new movies get a timestamp id
    #[serde(default, deserialize_with = "lenient_text")]
    #[cfg_attr(
        feature = "openapi",
        schema(example = "20261018T101500.123Z-550e8400e29b41d4a716446655440000")
    )]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_date")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "2021-10-22"))]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<f64>))]
    pub rating: Rating,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "/uploads/20261018T101500.120Z-550e8400e29b41d4a716446655440000.png"))]
    pub image: Option<AssetRef>,
    #[serde(default)]
    pub opinions: Vec<Opinion>,
}

impl Movie {
    /// True while the movie holds fewer than [`MAX_OPINIONS_PER_MOVIE`] opinions.
    pub fn accepts_opinions(&self) -> bool {
        self.opinions.len() < MAX_OPINIONS_PER_MOVIE
    }
}

/// A user review attached to a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Opinion {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub user: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<f64>))]
    pub rating: Rating,
    #[serde(default, deserialize_with = "lenient_text")]
    pub comment: String,
}

/// Any JSON scalar a hand-edited document might hold where text is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Int(n) => n.to_string(),
            Scalar::UInt(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw.map(Scalar::into_text).unwrap_or_default())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| parse_stored_date(&value.into_text())))
}

/// Reads the date of a stored record. Full ISO timestamps are cut to their date part.
fn parse_stored_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let date_part = text.get(..10).unwrap_or(text);
    match NaiveDate::parse_from_str(date_part, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!(date = text, "ignoring unreadable stored date");
            None
        }
    }
}

/// Fields supplied when creating a movie. The store assigns the id and starts with no
/// opinions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMovie {
    pub name: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub rating: Rating,
}

/// A partial update. `None` keeps the stored value, `Some` replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub rating: Option<Rating>,
}

impl MoviePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.rating.is_none()
    }

    /// Overwrites the supplied fields of `movie`. Id, image and opinions are untouched.
    pub fn apply(self, movie: &mut Movie) {
        if let Some(name) = self.name {
            movie.name = name;
        }
        if let Some(description) = self.description {
            movie.description = description;
        }
        if let Some(date) = self.date {
            movie.date = Some(date);
        }
        if let Some(rating) = self.rating {
            movie.rating = rating;
        }
    }
}

/// Fields supplied when adding an opinion (also the JSON request body).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewOpinion {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<f64>, example = 8))]
    pub rating: Rating,
    #[serde(default)]
    pub comment: String,
}
