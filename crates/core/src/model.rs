use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScreenError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Person,
    Business,
    Organization,
    Vessel,
    Aircraft,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceList {
    OfacSdn,
    UsCsl,
    EuCsl,
    UkCsl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdKind {
    Passport,
    TaxId,
    DriverLicense,
    NationalId,
    Registration,
    Other,
}

/// One sanctioned party as consumed from the source parsers.
///
/// Exactly one of the detail payloads is populated, matching `kind`.
/// `prepared` is set by the normalizer; an entity must not reach the scorer
/// without it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub source_id: String,
    pub name: String,
    pub kind: EntityKind,
    pub source: SourceList,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<PersonInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessel: Option<VesselInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<AircraftInfo>,

    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub crypto_addresses: Vec<CryptoAddress>,
    #[serde(default)]
    pub alt_names: Vec<String>,
    #[serde(default)]
    pub government_ids: Vec<GovernmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanctions_info: Option<SanctionsInfo>,
    #[serde(default)]
    pub historical_info: Vec<HistoricalEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default)]
    pub programs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepared: Option<PreparedFields>,
}

impl Entity {
    /// Bare entity of the given kind; detail payload left empty for the
    /// caller to fill in.
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        name: impl Into<String>,
        kind: EntityKind,
        source: SourceList,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            name: name.into(),
            kind,
            source,
            person: None,
            business: None,
            organization: None,
            vessel: None,
            aircraft: None,
            addresses: Vec::new(),
            crypto_addresses: Vec::new(),
            alt_names: Vec::new(),
            government_ids: Vec::new(),
            contact_info: None,
            sanctions_info: None,
            historical_info: Vec::new(),
            remarks: None,
            programs: Vec::new(),
            prepared: None,
        }
    }

    /// Transient query entity. Queries are screened with the same pipeline
    /// as indexed records; the source slot is meaningless for them.
    pub fn query(name: impl Into<String>, kind: EntityKind) -> Self {
        let mut e = Self::new("query", "query", name, kind, SourceList::OfacSdn);
        match kind {
            EntityKind::Person => e.person = Some(PersonInfo::default()),
            EntityKind::Business => e.business = Some(BusinessInfo::default()),
            EntityKind::Organization => e.organization = Some(OrganizationInfo::default()),
            EntityKind::Vessel => e.vessel = Some(VesselInfo::default()),
            EntityKind::Aircraft => e.aircraft = Some(AircraftInfo::default()),
            EntityKind::Unknown => {}
        }
        e
    }

    /// Rows of one logical entity share this key across source files.
    pub fn merge_key(&self) -> (SourceList, &str, EntityKind) {
        (self.source, self.source_id.as_str(), self.kind)
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// Checks the kind/detail invariant: the payload slot matching `kind`
    /// may be set, every other slot must be empty.
    pub fn validate(&self) -> Result<(), ScreenError> {
        let slots = [
            (self.person.is_some(), EntityKind::Person),
            (self.business.is_some(), EntityKind::Business),
            (self.organization.is_some(), EntityKind::Organization),
            (self.vessel.is_some(), EntityKind::Vessel),
            (self.aircraft.is_some(), EntityKind::Aircraft),
        ];
        for (present, slot_kind) in slots {
            if present && slot_kind != self.kind {
                return Err(ScreenError::invalid_entity(
                    &self.id,
                    format!("{:?} detail on a {:?} entity", slot_kind, self.kind),
                ));
            }
        }
        if self.name.trim().is_empty() {
            return Err(ScreenError::invalid_entity(&self.id, "empty primary name"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PersonInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub affiliations: Vec<Affiliation>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BusinessInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dissolved: Option<NaiveDate>,
    #[serde(default)]
    pub affiliations: Vec<Affiliation>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrganizationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dissolved: Option<NaiveDate>,
    #[serde(default)]
    pub affiliations: Vec<Affiliation>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VesselInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imo_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_sign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mmsi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tonnage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AircraftInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built: Option<NaiveDate>,
}

/// Relationship to another listed or unlisted party, e.g.
/// ("Rosneft", "owned by").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Affiliation {
    pub entity_name: String,
    pub relationship: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.line1.is_none()
            && self.line2.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
            && self.country.is_none()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernmentId {
    pub kind: IdKind,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CryptoAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub address: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fax_number: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.email_address.is_none() && self.phone_number.is_none() && self.fax_number.is_none()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SanctionsInfo {
    #[serde(default)]
    pub secondary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A former value carried by the source list, e.g.
/// ("Former Name", "Bank Rossiya OAO").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoricalEntry {
    pub value_type: String,
    pub value: String,
}

/// Normalized representation computed once during indexing and read on
/// every comparison. Primary and alt names stay separate so the scorer can
/// tell a primary-name hit from an AKA hit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreparedFields {
    pub normalized_name: String,
    pub normalized_alt_names: Vec<String>,
    pub name_tokens: Vec<String>,
    pub alt_name_tokens: Vec<Vec<String>>,
    pub name_combinations: Vec<Vec<String>>,
    /// ISO 639-1 code, or "und" when detection failed.
    pub detected_language: String,
    /// Soundex of the first primary-name token.
    pub phonetic_class: String,
    /// Soundex of each alt name's first token, same order as
    /// `normalized_alt_names`.
    pub alt_phonetic_classes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_mismatched_detail() {
        let mut e = Entity::new("t1", "123", "Test Corp", EntityKind::Business, SourceList::OfacSdn);
        e.person = Some(PersonInfo::default());
        assert!(e.validate().is_err());
    }

    #[test]
    fn validate_accepts_matching_detail() {
        let mut e = Entity::new("t2", "124", "Test Corp", EntityKind::Business, SourceList::OfacSdn);
        e.business = Some(BusinessInfo::default());
        assert!(e.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name() {
        let e = Entity::new("t3", "125", "   ", EntityKind::Unknown, SourceList::EuCsl);
        assert!(e.validate().is_err());
    }

    #[test]
    fn merge_key_distinguishes_kind() {
        let a = Entity::new("a", "42", "X", EntityKind::Person, SourceList::EuCsl);
        let b = Entity::new("b", "42", "X", EntityKind::Business, SourceList::EuCsl);
        assert_ne!(a.merge_key(), b.merge_key());
    }
}
