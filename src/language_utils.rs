use anyhow::{Result, anyhow};
use isolang::Language;

/// Locale utilities
///
/// Locale tags such as `fr`, `pt-BR`, `pt_BR` or `zh-Hant` are split into an
/// ISO 639 language subtag and an optional region or script subtag. The
/// language subtag may be ISO 639-1 (2-letter) or ISO 639-2 (3-letter).
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn terminological_code(code: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(bibliographic, _)| *bibliographic == code)
        .map(|(_, terminological)| *terminological)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 if Language::from_639_1(&normalized_code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&normalized_code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if terminological_code(&normalized_code).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    match validate_language_code(&normalized_code)? {
        LanguageCodeType::Part1 => Language::from_639_1(&normalized_code)
            .map(|lang| lang.to_639_3().to_string())
            .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code)),
        LanguageCodeType::Part2T => Ok(normalized_code),
        LanguageCodeType::Part2B => terminological_code(&normalized_code)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code)),
    }
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(normalized1), Ok(normalized2)) => normalized1 == normalized2,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Split a locale tag into its language subtag and optional region/script subtag
pub fn split_locale(tag: &str) -> (&str, Option<&str>) {
    let tag = tag.trim();
    match tag.split_once(|c: char| c == '-' || c == '_') {
        Some((language, rest)) if !rest.is_empty() => (language, Some(rest)),
        Some((language, _)) => (language, None),
        None => (tag, None),
    }
}

/// Validate a locale tag; only the language subtag is checked
pub fn validate_locale(tag: &str) -> Result<()> {
    let (language, _) = split_locale(tag);
    validate_language_code(language)
        .map(|_| ())
        .map_err(|_| anyhow!("Invalid locale: {}", tag))
}

/// Human-readable name of a locale, e.g. `pt-BR` → `Portuguese (BR)`.
///
/// Unknown languages fall back to the tag itself.
pub fn locale_display_name(tag: &str) -> String {
    let (language, region) = split_locale(tag);
    match (get_language_name(language), region) {
        (Ok(name), Some(region)) => format!("{} ({})", name, region),
        (Ok(name), None) => name,
        (Err(_), _) => tag.trim().to_string(),
    }
}

/// Check if two locale tags designate the same locale.
///
/// Languages are compared through their ISO 639-2/T form, region subtags
/// case-insensitively; `pt_BR` matches `pt-br` and `por-BR`.
pub fn locales_match(tag1: &str, tag2: &str) -> bool {
    let (language1, region1) = split_locale(tag1);
    let (language2, region2) = split_locale(tag2);
    let same_region = match (region1, region2) {
        (Some(r1), Some(r2)) => r1.eq_ignore_ascii_case(r2),
        (None, None) => true,
        _ => false,
    };
    same_region && (language_codes_match(language1, language2) || language1.eq_ignore_ascii_case(language2))
}
