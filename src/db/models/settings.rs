use serde::{Deserialize, Serialize};

use super::flexible_id;
use crate::db::Record;

/// Site settings are a singleton stored as a single record with this id.
pub const SETTINGS_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    pub stats: SiteStats,
    pub contact: ContactInfo,
    pub social: SocialLinks,
}

/// Marketing counters shown on the home page ("1,200+" style display strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteStats {
    #[serde(alias = "propertiesSold")]
    pub properties_sold: String,
    #[serde(alias = "happyClients")]
    pub happy_clients: String,
    #[serde(alias = "yearsExperience")]
    pub years_experience: String,
    pub awards: String,
}

/// Alternate spellings accepted by [`SiteStats`], paired with the serialized key.
pub const SITE_STATS_KEY_ALIASES: &[(&str, &str)] = &[
    ("propertiesSold", "properties_sold"),
    ("happyClients", "happy_clients"),
    ("yearsExperience", "years_experience"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub hours: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub facebook: String,
    pub instagram: String,
    pub twitter: String,
    pub linkedin: String,
    pub youtube: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: SETTINGS_ID,
            stats: SiteStats::default(),
            contact: ContactInfo::default(),
            social: SocialLinks::default(),
        }
    }
}

impl Default for SiteStats {
    fn default() -> Self {
        Self {
            properties_sold: "1,200+".to_string(),
            happy_clients: "950+".to_string(),
            years_experience: "15".to_string(),
            awards: "25".to_string(),
        }
    }
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            phone: "+1 (555) 123-4567".to_string(),
            email: "info@example.com".to_string(),
            address: "123 Main Street, Suite 100".to_string(),
            hours: "Mon - Fri: 9:00 - 18:00".to_string(),
        }
    }
}

impl Record for Settings {
    const COLLECTION: &'static str = "settings";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn defaults() -> Vec<Self> {
        vec![Settings::default()]
    }
}
