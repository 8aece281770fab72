use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::flexible_id;
use crate::db::Record;

pub const STATUS_FOR_SALE: &str = "For Sale";
pub const STATUS_FOR_RENT: &str = "For Rent";
pub const STATUS_SOLD: &str = "Sold";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Property {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub currency: String,
    pub location: String,
    #[serde(rename = "type", alias = "property_type", alias = "propertyType")]
    pub property_type: String,
    pub category: Option<String>,
    pub status: String,
    #[serde(alias = "bedrooms")]
    pub beds: u32,
    #[serde(alias = "bathrooms")]
    pub baths: f64,
    #[serde(alias = "area")]
    pub sqft: f64,
    pub images: Vec<String>,
    pub description: String,
    pub features: Vec<String>,
    pub featured: bool,
    pub agent: Option<Agent>,
    #[serde(alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Alternate spellings accepted by [`Property`], paired with the serialized key.
pub const PROPERTY_KEY_ALIASES: &[(&str, &str)] = &[
    ("property_type", "type"),
    ("propertyType", "type"),
    ("bedrooms", "beds"),
    ("bathrooms", "baths"),
    ("area", "sqft"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Agent {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub image: Option<String>,
}

impl Default for Property {
    fn default() -> Self {
        Self {
            id: 0,
            title: String::new(),
            price: 0.0,
            currency: "USD".to_string(),
            location: String::new(),
            property_type: String::new(),
            category: None,
            status: STATUS_FOR_SALE.to_string(),
            beds: 0,
            baths: 0.0,
            sqft: 0.0,
            images: Vec::new(),
            description: String::new(),
            features: Vec::new(),
            featured: false,
            agent: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Property {
    /// Status compared case-insensitively, ignoring separators ("for-sale" == "For Sale").
    pub fn has_status(&self, status: &str) -> bool {
        normalize_label(&self.status) == normalize_label(status)
    }

    pub fn is_sold(&self) -> bool {
        self.has_status(STATUS_SOLD)
    }

    /// Listing creation time; older records without `created_at` fall back to
    /// their id when it looks like a millisecond timestamp.
    pub fn listed_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.or_else(|| {
            // 2001-09-09 in milliseconds; smaller ids are sequence numbers.
            if self.id >= 1_000_000_000_000 {
                Utc.timestamp_millis_opt(self.id).single()
            } else {
                None
            }
        })
    }
}

/// Lowercase label with dashes/underscores treated as spaces.
pub fn normalize_label(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Record for Property {
    const COLLECTION: &'static str = "properties";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn defaults() -> Vec<Self> {
        let agent = Agent {
            name: "Sarah Johnson".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            email: "sarah@example.com".to_string(),
            image: None,
        };

        vec![
            Property {
                id: 3,
                title: "Modern Downtown Penthouse".to_string(),
                price: 1_250_000.0,
                location: "Downtown".to_string(),
                property_type: "Penthouse".to_string(),
                category: Some("Apartments".to_string()),
                beds: 3,
                baths: 2.5,
                sqft: 2400.0,
                images: vec!["/images/penthouse-1.jpg".to_string()],
                description: "Top-floor penthouse with panoramic city views, private terrace and concierge service.".to_string(),
                features: vec![
                    "Terrace".to_string(),
                    "Concierge".to_string(),
                    "Parking".to_string(),
                ],
                featured: true,
                agent: Some(agent.clone()),
                ..Property::default()
            },
            Property {
                id: 2,
                title: "Family Villa with Garden".to_string(),
                price: 890_000.0,
                location: "Green Hills".to_string(),
                property_type: "Villa".to_string(),
                category: Some("Villas".to_string()),
                beds: 5,
                baths: 4.0,
                sqft: 4100.0,
                images: vec!["/images/villa-1.jpg".to_string()],
                description: "Spacious villa on a quiet street with landscaped garden and pool.".to_string(),
                features: vec!["Pool".to_string(), "Garden".to_string()],
                featured: true,
                agent: Some(agent.clone()),
                ..Property::default()
            },
            Property {
                id: 1,
                title: "Cozy Studio near the Park".to_string(),
                price: 1_800.0,
                location: "Riverside".to_string(),
                property_type: "Apartment".to_string(),
                category: Some("Apartments".to_string()),
                status: STATUS_FOR_RENT.to_string(),
                beds: 1,
                baths: 1.0,
                sqft: 550.0,
                images: vec!["/images/studio-1.jpg".to_string()],
                description: "Bright studio a short walk from the riverside park, fully furnished.".to_string(),
                features: vec!["Furnished".to_string()],
                agent: Some(agent),
                ..Property::default()
            },
        ]
    }
}
