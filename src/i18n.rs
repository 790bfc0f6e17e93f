//! English and Thai strings for the booking pages.

use std::collections::HashMap;

pub const SUPPORTED_LANGS: [&str; 2] = ["en", "th"];

/// Session key holding the chosen language.
pub const SESSION_KEY: &str = "lang";

const EN: &[(&str, &str)] = &[
    (
        "tap_calendar",
        "Tap the calendar to choose check-in and check-out. <b>Red</b> = booked, <b>Green</b> = available.",
    ),
    ("availability_title", "Availability (click green days to select)"),
    ("view_button", "View"),
    ("book_button", "Book & Pay"),
    ("clear_button", "Clear"),
    ("booking_confirmed", "✅ Booking confirmed. Dates blocked."),
    ("booking_processing", "Processing…"),
    ("booking_failed", "❌ Booking failed"),
    ("price_per_night", "/ night"),
    ("view_public", "View"),
    ("book", "Book"),
];

const TH: &[(&str, &str)] = &[
    (
        "tap_calendar",
        "แตะปฏิทินเพื่อเลือกวันเช็คอินและเช็คเอาต์ <b>สีแดง</b> = จองแล้ว, <b>สีเขียว</b> = ว่าง",
    ),
    ("availability_title", "สถานะว่าง (คลิกวันที่สีเขียวเพื่อเลือก)"),
    ("view_button", "ดู"),
    ("book_button", "จองและชำระ"),
    ("clear_button", "ล้าง"),
    ("booking_confirmed", "✅ การจองเสร็จสมบูรณ์ วันถูกล็อคแล้ว"),
    ("booking_processing", "กำลังทำรายการ…"),
    ("booking_failed", "❌ การจองล้มเหลว"),
    ("price_per_night", "/ คืน"),
    ("view_public", "ดูหน้า"),
    ("book", "จอง"),
];

fn table(lang: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match lang {
        "en" => Some(EN),
        "th" => Some(TH),
        _ => None,
    }
}

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGS.contains(&code)
}

/// Chosen language if supported, otherwise the configured default.
pub fn resolve_lang<'a>(chosen: Option<&'a str>, default_lang: &'a str) -> &'a str {
    match chosen {
        Some(code) if is_supported(code) => code,
        _ => default_lang,
    }
}

/// Look `key` up in `lang`, then in `default_lang`, then return the key itself.
pub fn tr<'a>(lang: &str, default_lang: &str, key: &'a str) -> &'a str {
    table(lang)
        .or_else(|| table(default_lang))
        .and_then(|entries| entries.iter().find(|(k, _)| *k == key))
        .map(|(_, v)| *v)
        .unwrap_or(key)
}

/// Whole table for templates, exposed as `t` in the render context.
pub fn translations(lang: &str, default_lang: &str) -> HashMap<&'static str, &'static str> {
    table(lang)
        .or_else(|| table(default_lang))
        .unwrap_or(EN)
        .iter()
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thai_strings_are_used_when_chosen() {
        assert_eq!(tr("th", "en", "book"), "จอง");
        assert_eq!(tr("en", "en", "book"), "Book");
    }

    #[test]
    fn unknown_language_falls_back_to_default() {
        assert_eq!(tr("fr", "th", "clear_button"), "ล้าง");
    }

    #[test]
    fn unknown_key_falls_back_to_itself() {
        assert_eq!(tr("en", "en", "no_such_key"), "no_such_key");
    }

    #[test]
    fn only_supported_codes_are_resolved() {
        assert_eq!(resolve_lang(Some("th"), "en"), "th");
        assert_eq!(resolve_lang(Some("de"), "en"), "en");
        assert_eq!(resolve_lang(None, "th"), "th");
    }

    #[test]
    fn tables_share_keys() {
        let en = translations("en", "en");
        let th = translations("th", "en");
        assert_eq!(en.len(), th.len());
        assert!(en.keys().all(|k| th.contains_key(k)));
    }
}
