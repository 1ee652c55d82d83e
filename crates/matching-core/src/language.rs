//! Language detection and multilingual stopword removal.
//!
//! Detection runs on the raw name text; below the confidence floor the
//! caller may supply a country whose primary language wins instead, and
//! English is the last resort. Numeric tokens are never treated as
//! stopwords in any language.

use phf::{phf_map, phf_set};

use crate::text::is_numeric_token;

/// Detection results below this confidence defer to the country fallback.
const CONFIDENCE_FLOOR: f64 = 0.5;

pub static STOPWORDS_EN: phf::Set<&'static str> = phf_set! {
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has",
    "he", "in", "is", "it", "its", "of", "on", "or", "that", "the", "to",
    "was", "were", "will", "with",
};

pub static STOPWORDS_ES: phf::Set<&'static str> = phf_set! {
    "de", "la", "que", "el", "en", "y", "a", "los", "del", "se", "las",
    "por", "un", "para", "con", "no", "una", "su", "al", "lo", "como",
    "mas", "pero", "sus", "le", "ya", "o", "este", "si",
};

pub static STOPWORDS_FR: phf::Set<&'static str> = phf_set! {
    "au", "aux", "avec", "ce", "ces", "dans", "de", "des", "du", "elle",
    "en", "et", "eux", "il", "je", "la", "le", "les", "leur", "lui", "ma",
    "mais", "me", "meme", "mes", "moi", "mon", "ne", "nos", "notre",
    "nous", "on", "ou", "par", "pas", "pour", "qu", "que", "qui", "sa",
    "se", "ses", "son", "sur", "ta", "te", "tes", "toi", "ton", "tu",
    "un", "une", "vos", "votre", "vous",
};

pub static STOPWORDS_DE: phf::Set<&'static str> = phf_set! {
    "aber", "als", "am", "an", "auch", "auf", "aus", "bei", "bin", "bis",
    "das", "dem", "den", "der", "des", "die", "ein", "eine", "einem",
    "einen", "einer", "eines", "er", "es", "fur", "hat", "im", "in",
    "ist", "mit", "nach", "nicht", "noch", "nur", "oder", "sich", "sie",
    "sind", "so", "uber", "um", "und", "von", "vor", "wie", "zu", "zum",
    "zur",
};

pub static STOPWORDS_RU: phf::Set<&'static str> = phf_set! {
    "а", "без", "более", "бы", "был", "была", "были", "было", "быть",
    "в", "вам", "вас", "во", "вот", "все", "всего", "всех", "вы", "да",
    "для", "до", "его", "ее", "если", "есть", "еще", "же", "за", "и",
    "из", "или", "им", "их", "к", "как", "ко", "когда", "кто", "ли",
    "мы", "на", "над", "не", "него", "нее", "нет", "ни", "них", "но",
    "ну", "о", "об", "он", "она", "они", "оно", "от", "по", "под",
    "при", "с", "со", "так", "также", "такой", "там", "те", "тем", "то",
    "того", "тоже", "той", "только", "том", "ты", "у", "уже", "хотя",
    "чего", "чем", "что", "чтобы", "эта", "эти", "это", "я",
};

pub static STOPWORDS_AR: phf::Set<&'static str> = phf_set! {
    "في", "من", "على", "و", "ان", "الى", "عن", "مع", "هذا", "هذه",
    "ذلك", "التي", "الذي", "كان", "كانت", "لم", "لن", "له", "لها",
    "ما", "هو", "هي", "كل", "بعد", "قد", "او", "اي", "ثم", "حتى",
    "اذا", "بين", "عند", "غير", "لا",
};

pub static STOPWORDS_ZH: phf::Set<&'static str> = phf_set! {
    "的", "了", "和", "是", "在", "我", "有", "他", "这", "中", "大",
    "来", "上", "国", "个", "到", "说", "们", "为", "子", "与", "也",
    "你", "地", "出", "道", "不", "就", "其", "或", "及", "等",
};

/// Primary language by country, ISO 3166 alpha-2 keys. Countries with no
/// clear primary language are simply absent.
static COUNTRY_LANGUAGE: phf::Map<&'static str, &'static str> = phf_map! {
    "US" => "en", "GB" => "en", "AU" => "en", "CA" => "en", "NZ" => "en",
    "IE" => "en", "ZA" => "en", "NG" => "en", "KE" => "en", "GH" => "en",
    "IN" => "en", "PK" => "en", "PH" => "en", "SG" => "en",
    "ES" => "es", "MX" => "es", "AR" => "es", "CO" => "es", "VE" => "es",
    "PE" => "es", "CL" => "es", "EC" => "es", "CU" => "es", "BO" => "es",
    "DO" => "es", "GT" => "es", "HN" => "es", "NI" => "es", "PA" => "es",
    "PY" => "es", "SV" => "es", "UY" => "es",
    "FR" => "fr", "BE" => "fr", "CH" => "de", "SN" => "fr", "CI" => "fr",
    "ML" => "fr", "CM" => "fr", "CD" => "fr", "MG" => "fr", "HT" => "fr",
    "DE" => "de", "AT" => "de", "LI" => "de",
    "RU" => "ru", "BY" => "ru", "KZ" => "ru", "KG" => "ru", "TJ" => "ru",
    "UA" => "ru", "UZ" => "ru", "TM" => "ru",
    "SA" => "ar", "EG" => "ar", "IQ" => "ar", "SY" => "ar", "YE" => "ar",
    "JO" => "ar", "LB" => "ar", "LY" => "ar", "DZ" => "ar", "MA" => "ar",
    "TN" => "ar", "SD" => "ar", "AE" => "ar", "KW" => "ar", "QA" => "ar",
    "BH" => "ar", "OM" => "ar",
    "CN" => "zh", "TW" => "zh", "HK" => "zh", "MO" => "zh",
};

/// Same fallback keyed by the canonical country names the address
/// normalizer produces.
static COUNTRY_NAME_LANGUAGE: phf::Map<&'static str, &'static str> = phf_map! {
    "united states" => "en", "united kingdom" => "en", "australia" => "en",
    "canada" => "en", "ireland" => "en", "india" => "en",
    "spain" => "es", "mexico" => "es", "argentina" => "es",
    "colombia" => "es", "venezuela" => "es", "cuba" => "es",
    "france" => "fr", "belgium" => "fr",
    "germany" => "de", "austria" => "de", "switzerland" => "de",
    "russia" => "ru", "belarus" => "ru", "kazakhstan" => "ru",
    "ukraine" => "ru",
    "saudi arabia" => "ar", "egypt" => "ar", "iraq" => "ar",
    "syria" => "ar", "yemen" => "ar", "libya" => "ar", "lebanon" => "ar",
    "china" => "zh", "taiwan" => "zh", "hong kong" => "zh",
};

/// Detects the language of `text`. Returns an ISO 639-1 code for the
/// languages we carry stopwords for, the ISO 639-3 code whatlang reports
/// otherwise, and ("und", 0.0) when detection produces nothing.
pub fn detect_language(text: &str) -> (String, f64) {
    match whatlang::detect(text) {
        Some(info) => {
            let code = match info.lang() {
                whatlang::Lang::Eng => "en",
                whatlang::Lang::Spa => "es",
                whatlang::Lang::Fra => "fr",
                whatlang::Lang::Deu => "de",
                whatlang::Lang::Rus => "ru",
                whatlang::Lang::Ara => "ar",
                whatlang::Lang::Cmn => "zh",
                other => other.code(),
            };
            (code.to_string(), info.confidence())
        }
        None => ("und".to_string(), 0.0),
    }
}

pub fn country_language(country: &str) -> Option<&'static str> {
    let trimmed = country.trim();
    if trimmed.len() == 2 {
        if let Some(lang) = COUNTRY_LANGUAGE.get(trimmed.to_ascii_uppercase().as_str()).copied() {
            return Some(lang);
        }
    }
    COUNTRY_NAME_LANGUAGE.get(trimmed.to_ascii_lowercase().as_str()).copied()
}

/// Language whose stopword set should apply: confident detection wins,
/// then the country's primary language, then English.
pub fn stopword_language(text: &str, country: Option<&str>) -> String {
    let (detected, confidence) = detect_language(text);
    if confidence >= CONFIDENCE_FLOOR && stopword_set(&detected).is_some() {
        return detected;
    }
    if let Some(lang) = country.and_then(country_language) {
        return lang.to_string();
    }
    "en".to_string()
}

pub fn stopword_set(lang: &str) -> Option<&'static phf::Set<&'static str>> {
    match lang {
        "en" => Some(&STOPWORDS_EN),
        "es" => Some(&STOPWORDS_ES),
        "fr" => Some(&STOPWORDS_FR),
        "de" => Some(&STOPWORDS_DE),
        "ru" => Some(&STOPWORDS_RU),
        "ar" => Some(&STOPWORDS_AR),
        "zh" => Some(&STOPWORDS_ZH),
        _ => None,
    }
}

/// Drops stopwords of `lang`, keeping numeric tokens unconditionally.
/// Never empties the list: a name made entirely of stopwords is kept
/// as-is rather than destroyed.
pub fn remove_stopwords(tokens: Vec<String>, lang: &str) -> Vec<String> {
    let set = match stopword_set(lang) {
        Some(set) => set,
        None => &STOPWORDS_EN,
    };
    let kept: Vec<String> = tokens
        .iter()
        .filter(|t| is_numeric_token(t) || !set.contains(t.as_str()))
        .cloned()
        .collect();
    if kept.is_empty() {
        tokens
    } else {
        kept
    }
}
