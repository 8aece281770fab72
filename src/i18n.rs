/*
Message catalog for user-facing API messages.

This module provides:
- A tiny embedded translations store for EN/RU (compile-time embedded JSON).
- A simple `tr` function to lookup translations by key + optional params.
- A `t` convenience wrapper using the default language (DEFAULT_LANG).

Usage:
    use crate::i18n;
    let msg = i18n::t("not_found.property");
    let msg_with = i18n::t_with("validation.required", &[("field", "email")]);

Notes:
- Placeholders in translation strings use single-brace format: `{name}`.
- Default language is `en`. If a key is missing for the requested language,
  the fallback language will be used.
*/

use std::collections::HashMap;
use std::sync::OnceLock;

pub const DEFAULT_LANG: &str = "en";

static TRANSLATIONS: OnceLock<HashMap<String, HashMap<String, String>>> = OnceLock::new();

const EN_JSON: &str = r#"
{
  "not_found.property": "Property not found",
  "not_found.inquiry": "Inquiry not found",
  "not_found.category": "Category not found",
  "not_found.post": "Post not found",
  "validation.required": "Field '{field}' is required",
  "validation.invalid_email": "Please provide a valid email address",
  "validation.negative_price": "Price cannot be negative",
  "validation.invalid_status": "Unknown status: {status}",
  "validation.settings_shape": "Settings payload has an invalid shape: {err}",
  "validation.property_shape": "Property payload has an invalid shape: {err}",
  "auth.invalid_credentials": "Invalid email or password",
  "auth.logged_in": "Login successful",
  "inquiry.received": "Thank you! Your message has been received.",
  "inquiry.deleted": "Inquiry deleted successfully",
  "property.deleted": "Property deleted successfully",
  "category.deleted": "Category deleted successfully",
  "newsletter.subscribed": "You have been subscribed to our newsletter",
  "newsletter.already_subscribed": "This email is already subscribed",
  "upload.missing_file": "No file was provided (expected a 'file' or 'image' field)",
  "upload.empty_file": "The uploaded file is empty",
  "app.name": "Estate"
}
"#;

const RU_JSON: &str = r#"
{
  "not_found.property": "Объект недвижимости не найден",
  "not_found.inquiry": "Заявка не найдена",
  "not_found.category": "Категория не найдена",
  "not_found.post": "Статья не найдена",
  "validation.required": "Поле '{field}' обязательно",
  "validation.invalid_email": "Укажите корректный адрес электронной почты",
  "validation.negative_price": "Цена не может быть отрицательной",
  "validation.invalid_status": "Неизвестный статус: {status}",
  "validation.settings_shape": "Некорректная структура настроек: {err}",
  "validation.property_shape": "Некорректная структура объекта: {err}",
  "auth.invalid_credentials": "Неверный email или пароль",
  "auth.logged_in": "Вход выполнен",
  "inquiry.received": "Спасибо! Ваше сообщение получено.",
  "inquiry.deleted": "Заявка удалена",
  "property.deleted": "Объект удалён",
  "category.deleted": "Категория удалена",
  "newsletter.subscribed": "Вы подписались на рассылку",
  "newsletter.already_subscribed": "Этот email уже подписан",
  "upload.missing_file": "Файл не передан (ожидается поле 'file' или 'image')",
  "upload.empty_file": "Загруженный файл пуст",
  "app.name": "Estate"
}
"#;

fn build_translations() -> HashMap<String, HashMap<String, String>> {
    let mut out: HashMap<String, HashMap<String, String>> = HashMap::new();

    let en_map: HashMap<String, String> = serde_json::from_str(EN_JSON).unwrap_or_else(|e| {
        panic!("failed to parse EN_JSON in i18n module: {}", e);
    });
    out.insert("en".to_string(), en_map);

    let ru_map: HashMap<String, String> = serde_json::from_str(RU_JSON).unwrap_or_else(|e| {
        panic!("failed to parse RU_JSON in i18n module: {}", e);
    });
    out.insert("ru".to_string(), ru_map);

    out
}

fn translations() -> &'static HashMap<String, HashMap<String, String>> {
    TRANSLATIONS.get_or_init(build_translations)
}

/// Normalize a language tag into a short, lowercase code (e.g. "en-US" -> "en").
pub fn normalize_language(lang: &str) -> String {
    lang.split('-').next().unwrap_or(lang).trim().to_lowercase()
}

pub fn is_supported_language(lang: &str) -> bool {
    translations().contains_key(lang)
}

/// Pick the first supported language from an `Accept-Language` header value.
///
/// Quality weights are ignored; entries are taken in the order given.
pub fn language_from_header(header: &str) -> Option<String> {
    header
        .split(',')
        .map(|part| part.split(';').next().unwrap_or(part))
        .map(normalize_language)
        .find(|l| is_supported_language(l))
}

/// Translate a key using an explicit language (or default if None).
///
/// Returns the translated and parameter-substituted string. If no translation is found,
/// returns the default language value or the key itself.
pub fn tr(lang: Option<&str>, key: &str, params: Option<&[(&str, &str)]>) -> String {
    let map = translations();

    let desired = lang.unwrap_or(DEFAULT_LANG);

    let val = map
        .get(desired)
        .and_then(|m| m.get(key))
        .cloned()
        .or_else(|| map.get(DEFAULT_LANG).and_then(|m| m.get(key)).cloned())
        .unwrap_or_else(|| key.to_string());

    if let Some(params) = params {
        let mut s = val;
        for (k, v) in params {
            s = s.replace(&format!("{{{}}}", k), v);
        }
        s
    } else {
        val
    }
}

pub fn t(key: &str) -> String {
    tr(None, key, None)
}

pub fn t_with(key: &str, params: &[(&str, &str)]) -> String {
    tr(None, key, Some(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tr_basic() {
        let s = tr(Some("en"), "not_found.property", None);
        assert_eq!(s, "Property not found");
    }

    #[test]
    fn test_t_with_params() {
        let s = t_with("validation.required", &[("field", "email")]);
        assert_eq!(s, "Field 'email' is required");
    }

    #[test]
    fn test_fallback_to_default() {
        let s = tr(Some("fr"), "inquiry.deleted", None);
        assert_eq!(s, "Inquiry deleted successfully");
    }

    #[test]
    fn missing_key_returns_key() {
        let k = "non.existent.key";
        assert_eq!(t(k), k.to_string());
    }

    #[test]
    fn catalogs_share_keys() {
        let map = translations();
        let en = &map["en"];
        let ru = &map["ru"];
        for key in en.keys() {
            assert!(ru.contains_key(key), "ru catalog is missing {}", key);
        }
    }

    #[test]
    fn accept_language_picks_first_supported() {
        assert_eq!(
            language_from_header("fr-FR,ru;q=0.8,en;q=0.5"),
            Some("ru".to_string())
        );
        assert_eq!(language_from_header("de, fr"), None);
        assert_eq!(normalize_language("EN-us"), "en");
    }
}
