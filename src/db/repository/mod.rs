pub mod category;
pub mod inquiry;
pub mod post;
pub mod property;
pub mod settings;
pub mod subscriber;
pub mod user;

pub use category::CategoryRepository;
pub use inquiry::InquiryRepository;
pub use post::PostRepository;
pub use property::{PropertyFilter, PropertyRepository};
pub use settings::SettingsRepository;
pub use subscriber::SubscriberRepository;
pub use user::UserRepository;

use serde_json::Value;

/// Loose address check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Rename alias keys of a JSON object to their serialized names so the object
/// can be merged over a serialized record without producing duplicate fields.
/// When both spellings are present the serialized name wins.
pub fn canonicalize_keys(value: &mut Value, aliases: &[(&str, &str)]) {
    let Value::Object(obj) = value else {
        return;
    };
    for (alias, canonical) in aliases {
        if let Some(v) = obj.remove(*alias) {
            if !obj.contains_key(*canonical) {
                obj.insert((*canonical).to_string(), v);
            }
        }
    }
}

/// Overwrite top-level fields of `target` with the fields present in `patch`.
pub fn shallow_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(obj), Value::Object(fields)) => {
            for (k, v) in fields {
                obj.insert(k, v);
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Recursively merge objects; any non-object value in `patch` replaces the target value.
pub fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(obj), Value::Object(fields)) => {
            for (k, v) in fields {
                match obj.get_mut(&k) {
                    Some(existing) => deep_merge(existing, v),
                    None => {
                        obj.insert(k, v);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}
