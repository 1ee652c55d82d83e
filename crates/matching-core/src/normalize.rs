//! The eight-step normalization pipeline that turns parser output into
//! scorable entities. Runs once per entity at index time and once per
//! query; the scorer only ever reads the cached `PreparedFields`.

use std::sync::Arc;

use phf::{phf_map, phf_set};
use watchgate_core::{Entity, PreparedFields, ScreenError};

use crate::config::MatchConfig;
use crate::language;
use crate::phonetics::soundex;
use crate::similarity::generate_word_combinations;
use crate::text::{lower_and_strip_punctuation, tokenize};

/// Legal-form suffixes stripped from the tail of a name, iteratively.
static COMPANY_SUFFIXES: phf::Set<&'static str> = phf_set! {
    "corporation", "incorporated", "inc", "ltd", "llc", "corp", "co",
    "company", "companies", "gmbh", "sa", "ag", "plc", "pllc", "llp",
    "lp", "ltda", "bv", "nv", "sarl", "srl", "spa", "oao", "ooo", "zao",
    "pao", "oy", "ab", "limited", "organization", "organisation", "org",
};

/// ISO 3166 alpha-2/alpha-3 codes and common official-name variants to
/// the canonical names the comparators match on. The sanctioned-country
/// overrides keep all four source lists consistent with each other.
static COUNTRY_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "US" => "united states", "USA" => "united states",
    "UNITED STATES OF AMERICA" => "united states",
    "GB" => "united kingdom", "UK" => "united kingdom",
    "GBR" => "united kingdom", "GREAT BRITAIN" => "united kingdom",
    "KP" => "north korea", "PRK" => "north korea",
    "KOREA NORTH" => "north korea",
    "DEMOCRATIC PEOPLES REPUBLIC OF KOREA" => "north korea",
    "KR" => "south korea", "KOR" => "south korea",
    "CZ" => "czech republic", "CZE" => "czech republic",
    "CZECHIA" => "czech republic",
    "RU" => "russia", "RUS" => "russia", "RUSSIAN FEDERATION" => "russia",
    "IR" => "iran", "IRN" => "iran",
    "IRAN ISLAMIC REPUBLIC OF" => "iran",
    "SY" => "syria", "SYR" => "syria", "SYRIAN ARAB REPUBLIC" => "syria",
    "CU" => "cuba", "CUB" => "cuba",
    "VE" => "venezuela", "VEN" => "venezuela",
    "VENEZUELA BOLIVARIAN REPUBLIC OF" => "venezuela",
    "BY" => "belarus", "BLR" => "belarus",
    "MM" => "myanmar", "MMR" => "myanmar", "BURMA" => "myanmar",
    "AF" => "afghanistan", "AFG" => "afghanistan",
    "IQ" => "iraq", "IRQ" => "iraq",
    "LY" => "libya", "LBY" => "libya",
    "SD" => "sudan", "SDN" => "sudan",
    "SS" => "south sudan", "SSD" => "south sudan",
    "SO" => "somalia", "SOM" => "somalia",
    "YE" => "yemen", "YEM" => "yemen",
    "LB" => "lebanon", "LBN" => "lebanon",
    "CN" => "china", "CHN" => "china",
    "HK" => "hong kong", "HKG" => "hong kong",
    "TW" => "taiwan", "TWN" => "taiwan",
    "DE" => "germany", "DEU" => "germany",
    "FR" => "france", "FRA" => "france",
    "ES" => "spain", "ESP" => "spain",
    "IT" => "italy", "ITA" => "italy",
    "NL" => "netherlands", "NLD" => "netherlands",
    "BE" => "belgium", "BEL" => "belgium",
    "CH" => "switzerland", "CHE" => "switzerland",
    "AT" => "austria", "AUT" => "austria",
    "PL" => "poland", "POL" => "poland",
    "UA" => "ukraine", "UKR" => "ukraine",
    "TR" => "turkey", "TUR" => "turkey", "TURKIYE" => "turkey",
    "GR" => "greece", "GRC" => "greece",
    "PT" => "portugal", "PRT" => "portugal",
    "SE" => "sweden", "SWE" => "sweden",
    "NO" => "norway", "NOR" => "norway",
    "DK" => "denmark", "DNK" => "denmark",
    "FI" => "finland", "FIN" => "finland",
    "CA" => "canada", "CAN" => "canada",
    "MX" => "mexico", "MEX" => "mexico",
    "BR" => "brazil", "BRA" => "brazil",
    "AR" => "argentina", "ARG" => "argentina",
    "CO" => "colombia", "COL" => "colombia",
    "PE" => "peru", "PER" => "peru",
    "CL" => "chile", "CHL" => "chile",
    "PA" => "panama", "PAN" => "panama",
    "NI" => "nicaragua", "NIC" => "nicaragua",
    "JP" => "japan", "JPN" => "japan",
    "IN" => "india", "IND" => "india",
    "PK" => "pakistan", "PAK" => "pakistan",
    "SG" => "singapore", "SGP" => "singapore",
    "MY" => "malaysia", "MYS" => "malaysia",
    "ID" => "indonesia", "IDN" => "indonesia",
    "TH" => "thailand", "THA" => "thailand",
    "VN" => "vietnam", "VNM" => "vietnam", "VIET NAM" => "vietnam",
    "PH" => "philippines", "PHL" => "philippines",
    "AU" => "australia", "AUS" => "australia",
    "NZ" => "new zealand", "NZL" => "new zealand",
    "SA" => "saudi arabia", "SAU" => "saudi arabia",
    "AE" => "united arab emirates", "ARE" => "united arab emirates",
    "QA" => "qatar", "QAT" => "qatar",
    "KW" => "kuwait", "KWT" => "kuwait",
    "BH" => "bahrain", "BHR" => "bahrain",
    "OM" => "oman", "OMN" => "oman",
    "JO" => "jordan", "JOR" => "jordan",
    "IL" => "israel", "ISR" => "israel",
    "EG" => "egypt", "EGY" => "egypt",
    "DZ" => "algeria", "DZA" => "algeria",
    "MA" => "morocco", "MAR" => "morocco",
    "TN" => "tunisia", "TUN" => "tunisia",
    "NG" => "nigeria", "NGA" => "nigeria",
    "ZA" => "south africa", "ZAF" => "south africa",
    "KE" => "kenya", "KEN" => "kenya",
    "ET" => "ethiopia", "ETH" => "ethiopia",
    "CD" => "democratic republic of the congo",
    "COD" => "democratic republic of the congo",
    "ZW" => "zimbabwe", "ZWE" => "zimbabwe",
    "ML" => "mali", "MLI" => "mali",
    "NE" => "niger", "NER" => "niger",
    "ER" => "eritrea", "ERI" => "eritrea",
    "KZ" => "kazakhstan", "KAZ" => "kazakhstan",
    "KG" => "kyrgyzstan", "KGZ" => "kyrgyzstan",
    "UZ" => "uzbekistan", "UZB" => "uzbekistan",
    "TJ" => "tajikistan", "TJK" => "tajikistan",
    "TM" => "turkmenistan", "TKM" => "turkmenistan",
    "AM" => "armenia", "ARM" => "armenia",
    "AZ" => "azerbaijan", "AZE" => "azerbaijan",
    "GE" => "georgia", "GEO" => "georgia",
    "MD" => "moldova", "MDA" => "moldova",
    "RS" => "serbia", "SRB" => "serbia",
    "BA" => "bosnia and herzegovina", "BIH" => "bosnia and herzegovina",
    "HR" => "croatia", "HRV" => "croatia",
    "SI" => "slovenia", "SVN" => "slovenia",
    "SK" => "slovakia", "SVK" => "slovakia",
    "HU" => "hungary", "HUN" => "hungary",
    "RO" => "romania", "ROU" => "romania",
    "BG" => "bulgaria", "BGR" => "bulgaria",
    "CY" => "cyprus", "CYP" => "cyprus",
    "MT" => "malta", "MLT" => "malta",
    "IE" => "ireland", "IRL" => "ireland",
    "IS" => "iceland", "ISL" => "iceland",
    "LU" => "luxembourg", "LUX" => "luxembourg",
    "LI" => "liechtenstein", "LIE" => "liechtenstein",
    "MC" => "monaco", "MCO" => "monaco",
    "EE" => "estonia", "EST" => "estonia",
    "LV" => "latvia", "LVA" => "latvia",
    "LT" => "lithuania", "LTU" => "lithuania",
};

/// Rebuilds an entity into its normalized form. Returns a new record;
/// the input is consumed. Idempotent: normalizing a normalized entity is
/// an identity operation.
pub struct Normalizer {
    config: Arc<MatchConfig>,
}

impl Normalizer {
    pub fn new(config: Arc<MatchConfig>) -> Self {
        Self { config }
    }

    pub fn normalize(&self, mut entity: Entity) -> Result<Entity, ScreenError> {
        entity.validate()?;

        // Prepared fields are computed exactly once; a normalized entity
        // passes through untouched.
        if entity.prepared.is_some() {
            return Ok(entity);
        }

        // Country hint for stopword language, taken before addresses are
        // rewritten.
        let country_hint = entity
            .addresses
            .iter()
            .find_map(|a| a.country.clone());

        let primary = normalize_name(&entity.name, self.config.keep_stopwords, country_hint.as_deref());
        let mut alt_names: Vec<String> = Vec::with_capacity(entity.alt_names.len());
        for alt in &entity.alt_names {
            let normalized = normalize_name(alt, self.config.keep_stopwords, country_hint.as_deref());
            if !normalized.is_empty() && !alt_names.contains(&normalized) {
                alt_names.push(normalized);
            }
        }

        if let Some(contact) = entity.contact_info.as_mut() {
            if let Some(phone) = contact.phone_number.take() {
                contact.phone_number = non_empty(normalize_phone(&phone));
            }
            if let Some(fax) = contact.fax_number.take() {
                contact.fax_number = non_empty(normalize_phone(&fax));
            }
            if let Some(email) = contact.email_address.take() {
                contact.email_address = non_empty(email.trim().to_lowercase());
            }
        }

        for address in entity.addresses.iter_mut() {
            for field in [
                &mut address.line1,
                &mut address.line2,
                &mut address.city,
                &mut address.state,
                &mut address.postal_code,
            ] {
                if let Some(value) = field.take() {
                    *field = non_empty(normalize_address_field(&value));
                }
            }
            if let Some(country) = address.country.take() {
                address.country = non_empty(normalize_country(&country));
            }
        }

        if let Some(person) = entity.person.as_mut() {
            if let Some(gender) = person.gender.take() {
                person.gender = Some(normalize_gender(&gender).to_string());
            }
        }

        for id in entity.government_ids.iter_mut() {
            id.identifier = normalize_identifier(&id.identifier);
            if let Some(country) = id.country.take() {
                id.country = non_empty(normalize_country(&country));
            }
        }

        for crypto in entity.crypto_addresses.iter_mut() {
            crypto.address = crypto.address.trim().to_string();
            if let Some(currency) = crypto.currency.take() {
                crypto.currency = non_empty(currency.trim().to_lowercase());
            }
        }

        if let Some(vessel) = entity.vessel.as_mut() {
            for field in [&mut vessel.imo_number, &mut vessel.call_sign, &mut vessel.mmsi] {
                if let Some(value) = field.take() {
                    *field = non_empty(normalize_identifier(&value));
                }
            }
        }
        if let Some(aircraft) = entity.aircraft.as_mut() {
            for field in [&mut aircraft.serial_number, &mut aircraft.icao_code] {
                if let Some(value) = field.take() {
                    *field = non_empty(normalize_identifier(&value));
                }
            }
        }

        let name_tokens = tokenize(&primary);
        let alt_name_tokens: Vec<Vec<String>> = alt_names.iter().map(|a| tokenize(a)).collect();
        let name_combinations = generate_word_combinations(&name_tokens);

        let (detected, confidence) = language::detect_language(&entity.name);
        let detected_language = if confidence >= 0.5 { detected } else { "und".to_string() };

        let phonetic_class = name_tokens.first().map(|t| soundex(t)).unwrap_or_default();
        let alt_phonetic_classes = alt_name_tokens
            .iter()
            .map(|tokens| tokens.first().map(|t| soundex(t)).unwrap_or_default())
            .collect();

        entity.name = entity.name.trim().to_string();
        entity.prepared = Some(PreparedFields {
            normalized_name: primary,
            normalized_alt_names: alt_names,
            name_tokens,
            alt_name_tokens,
            name_combinations,
            detected_language,
            phonetic_class,
            alt_phonetic_classes,
        });

        Ok(entity)
    }
}

/// "MADURO MOROS, Nicolas" becomes "Nicolas MADURO MOROS". Names with
/// zero or several commas pass through unchanged.
pub fn reorder_last_first(name: &str) -> String {
    let mut parts = name.splitn(2, ',');
    let before = parts.next().unwrap_or("").trim();
    match parts.next() {
        Some(after) if !after.trim().is_empty() && !before.is_empty() && !after.contains(',') => {
            format!("{} {}", after.trim(), before)
        }
        _ => name.trim().to_string(),
    }
}

/// The full name pipeline: reorder, strip apostrophes, fold, strip legal
/// suffixes from the tail, remove stopwords of the detected (or country
/// inferred) language.
pub fn normalize_name(raw: &str, keep_stopwords: bool, country: Option<&str>) -> String {
    let reordered = reorder_last_first(raw);
    let without_apostrophes: String = reordered
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | '`'))
        .collect();
    let folded = lower_and_strip_punctuation(&without_apostrophes);

    let mut tokens = tokenize(&folded);
    while tokens.len() > 1 {
        let last = tokens.last().map(String::as_str).unwrap_or_default();
        if COMPANY_SUFFIXES.contains(last) {
            tokens.pop();
        } else {
            break;
        }
    }

    if !keep_stopwords {
        let lang = language::stopword_language(&folded, country);
        tokens = language::remove_stopwords(tokens, &lang);
    }

    tokens.join(" ")
}

pub fn normalize_phone(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '+' | '-' | '(' | ')' | '.' | ' '))
        .collect();
    stripped.strip_prefix("00").unwrap_or(&stripped).to_string()
}

pub fn normalize_address_field(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let cleaned: String = lowered.chars().filter(|c| !matches!(c, ',' | '.' | '#')).collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_country(raw: &str) -> String {
    let key: String = raw
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | '(' | ')' | '\''))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    match COUNTRY_MAP.get(key.as_str()) {
        Some(canonical) => canonical.to_string(),
        None => lower_and_strip_punctuation(raw),
    }
}

pub fn normalize_gender(raw: &str) -> &'static str {
    match raw.trim().to_lowercase().as_str() {
        "m" | "male" | "man" | "guy" => "male",
        "f" | "female" | "woman" | "gal" | "girl" => "female",
        _ => "unknown",
    }
}

/// "AB 12-34-56 C" becomes "AB123456C".
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
