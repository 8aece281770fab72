//! Record types stored through the tiered data store.
//!
//! Records are deliberately loose: every field has a default so partially
//! populated rows (hand-edited JSON files, older Supabase rows) still load.

pub mod category;
pub mod inquiry;
pub mod post;
pub mod property;
pub mod settings;
pub mod subscriber;
pub mod user;

pub use self::category::*;
pub use self::inquiry::*;
pub use self::post::*;
pub use self::property::*;
pub use self::settings::*;
pub use self::subscriber::*;
pub use self::user::*;

use serde::{de, Deserialize, Deserializer};

/// Deserialize an id given either as a JSON number or as a numeric string.
///
/// Missing or null ids deserialize to 0, which the store treats as "unassigned".
pub fn flexible_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Float(f64),
        Text(String),
        Null(()),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Int(v) => Ok(v),
        RawId::Float(v) if v.fract() == 0.0 => Ok(v as i64),
        RawId::Float(v) => Err(de::Error::custom(format!("invalid id: {}", v))),
        RawId::Text(s) if s.trim().is_empty() => Ok(0),
        RawId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid id: {}", s))),
        RawId::Null(()) => Ok(0),
    }
}

/// Same as [`flexible_id`] for optional foreign keys.
pub fn flexible_opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    flexible_id(deserializer).map(|id| (id != 0).then_some(id))
}

/// Lowercase, ASCII-alphanumeric slug with single dashes ("Luxury Villas!" -> "luxury-villas").
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
