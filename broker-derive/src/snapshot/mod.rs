//! Immutable reference snapshot
//!
//! Every lookup table a derivation reads, built once per batch by
//! [`SnapshotBuilder`] and shared read-only (`Arc<ReferenceSnapshot>`)
//! across workers. Keys are stored uppercased; accessors uppercase their
//! arguments so callers can pass submitted values as-is.

mod builder;

pub use builder::{
    CityRow, CountyRow, ExecCompRow, FrecRow, OfficeRow, PublishedAwardRow, RecipientRow,
    SnapshotBuilder, StateRow, SubTierRow, ZipRow, REQUIRED_TABLES,
};

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Geography attached to one ZIP row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipGeo {
    pub state: String,
    pub county: String,
    pub congressional_district: Option<String>,
}

/// ZIP5-level summary: the first row seen plus every distinct district
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zip5Entry {
    pub geo: ZipGeo,
    pub districts: BTreeSet<String>,
}

impl Zip5Entry {
    /// Number of distinct congressional districts served by the ZIP5, at least 1
    pub fn cd_count(&self) -> usize {
        self.districts.len().max(1)
    }
}

/// A top-tier agency (CGAC or FREC)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgencyRef {
    pub code: String,
    pub name: Option<String>,
}

/// A sub-tier agency with its resolved parents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTier {
    pub code: String,
    pub name: Option<String>,
    pub is_frec: bool,
    pub cgac: Option<AgencyRef>,
    pub frec: Option<AgencyRef>,
}

impl SubTier {
    /// The parent selected by `is_frec`, if it resolved
    pub fn top_tier(&self) -> Option<&AgencyRef> {
        if self.is_frec {
            self.frec.as_ref()
        } else {
            self.cgac.as_ref()
        }
    }
}

/// Role an office code can fill on a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfficeRole {
    AssistanceAwards,
    /// Funding office on an assistance record; either funding flag qualifies
    Funding,
}

/// Role flags carried by an office
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfficeRoles {
    pub contract_awards: bool,
    pub contract_funding: bool,
    pub assistance_awards: bool,
    pub assistance_funding: bool,
}

impl OfficeRoles {
    pub fn allows(&self, role: OfficeRole) -> bool {
        match role {
            OfficeRole::AssistanceAwards => self.assistance_awards,
            OfficeRole::Funding => self.contract_funding || self.assistance_funding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Office {
    pub code: String,
    pub name: Option<String>,
    pub sub_tier_code: Option<String>,
    pub roles: OfficeRoles,
}

/// City-code table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub name: String,
    pub county_number: Option<String>,
    pub county_name: Option<String>,
}

/// Ultimate-parent data for a recipient
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipient {
    pub ultimate_parent_unique_ide: Option<String>,
    pub ultimate_parent_legal_enti: Option<String>,
}

/// Officer (name, amount) pairs in rank order
pub type OfficerSlots = [(Option<String>, Option<String>); 5];

/// Lookup key for an earlier published award
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DonorKey {
    /// Aggregate awards are keyed by URI, all others by FAIN
    pub aggregate: bool,
    pub award_key: String,
    pub sub_tier: String,
}

impl DonorKey {
    pub fn new(aggregate: bool, award_key: &str, sub_tier: &str) -> Self {
        Self {
            aggregate,
            award_key: award_key.trim().to_uppercase(),
            sub_tier: sub_tier.trim().to_uppercase(),
        }
    }
}

/// Earliest active published transaction of an award
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardDonor {
    pub action_date: NaiveDate,
    pub award_modification_amendme: Option<String>,
    pub awarding_office_code: Option<String>,
    pub funding_office_code: Option<String>,
}

/// Read-only reference tables for one batch
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    pub(crate) countries: HashMap<String, String>,
    pub(crate) states: HashMap<String, String>,
    pub(crate) states_by_name: HashMap<String, String>,
    pub(crate) counties_by_code: HashMap<(String, String), String>,
    pub(crate) counties_by_name: HashMap<(String, String), String>,
    pub(crate) cities: HashMap<(String, String), City>,
    pub(crate) cities_by_name: HashMap<(String, String), String>,
    pub(crate) zip_cities: HashMap<String, String>,
    pub(crate) zips_by_zip9: HashMap<(String, String), ZipGeo>,
    pub(crate) zips_by_zip5: HashMap<String, Zip5Entry>,
    pub(crate) sub_tiers: HashMap<String, SubTier>,
    pub(crate) offices: HashMap<String, Office>,
    pub(crate) cfda: HashMap<String, String>,
    pub(crate) recipients: HashMap<String, Recipient>,
    pub(crate) exec_comp: HashMap<String, OfficerSlots>,
    pub(crate) award_donors: HashMap<DonorKey, AwardDonor>,
}

/// Uppercase and collapse internal whitespace
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn key(value: &str) -> String {
    value.trim().to_uppercase()
}

impl ReferenceSnapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    pub fn country_name(&self, code: &str) -> Option<&str> {
        self.countries.get(&key(code)).map(String::as_str)
    }

    pub fn state_name(&self, code: &str) -> Option<&str> {
        self.states.get(&key(code)).map(String::as_str)
    }

    pub fn state_by_name(&self, name: &str) -> Option<&str> {
        self.states_by_name
            .get(&normalize_name(name))
            .map(String::as_str)
    }

    pub fn county_name(&self, state: &str, county_number: &str) -> Option<&str> {
        self.counties_by_code
            .get(&(key(state), county_number.trim().to_string()))
            .map(String::as_str)
    }

    pub fn county_by_name(&self, state: &str, county_name: &str) -> Option<&str> {
        self.counties_by_name
            .get(&(key(state), normalize_name(county_name)))
            .map(String::as_str)
    }

    pub fn city(&self, state: &str, city_code: &str) -> Option<&City> {
        self.cities.get(&(key(state), city_code.trim().to_string()))
    }

    pub fn city_code_by_name(&self, state: &str, city_name: &str) -> Option<&str> {
        self.cities_by_name
            .get(&(key(state), normalize_name(city_name)))
            .map(String::as_str)
    }

    pub fn zip_city(&self, zip5: &str) -> Option<&str> {
        self.zip_cities.get(zip5).map(String::as_str)
    }

    pub fn zip9(&self, zip5: &str, zip4: &str) -> Option<&ZipGeo> {
        self.zips_by_zip9.get(&(zip5.to_string(), zip4.to_string()))
    }

    pub fn zip5(&self, zip5: &str) -> Option<&Zip5Entry> {
        self.zips_by_zip5.get(zip5)
    }

    pub fn sub_tier(&self, code: &str) -> Option<&SubTier> {
        self.sub_tiers.get(&key(code))
    }

    pub fn office(&self, code: &str) -> Option<&Office> {
        self.offices.get(&key(code))
    }

    pub fn cfda_title(&self, program_number: &str) -> Option<&str> {
        self.cfda.get(program_number.trim()).map(String::as_str)
    }

    pub fn recipient(&self, recipient_id: &str) -> Option<&Recipient> {
        self.recipients.get(&key(recipient_id))
    }

    pub fn exec_comp(&self, recipient_id: &str) -> Option<&OfficerSlots> {
        self.exec_comp.get(&key(recipient_id))
    }

    pub fn award_donor(&self, donor_key: &DonorKey) -> Option<&AwardDonor> {
        self.award_donors.get(donor_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  prince   george's "), "PRINCE GEORGE'S");
        assert_eq!(normalize_name("Kings"), "KINGS");
    }

    #[test]
    fn test_sub_tier_top_tier_follows_flag() {
        let mut sub_tier = SubTier {
            code: "1100".to_string(),
            name: None,
            is_frec: false,
            cgac: Some(AgencyRef { code: "011".to_string(), name: None }),
            frec: Some(AgencyRef { code: "1100".to_string(), name: None }),
        };
        assert_eq!(sub_tier.top_tier().map(|a| a.code.as_str()), Some("011"));

        sub_tier.is_frec = true;
        assert_eq!(sub_tier.top_tier().map(|a| a.code.as_str()), Some("1100"));

        sub_tier.frec = None;
        assert!(sub_tier.top_tier().is_none());
    }

    #[test]
    fn test_funding_role_accepts_either_flag() {
        let contract_only = OfficeRoles { contract_funding: true, ..Default::default() };
        let assistance_only = OfficeRoles { assistance_funding: true, ..Default::default() };

        assert!(contract_only.allows(OfficeRole::Funding));
        assert!(assistance_only.allows(OfficeRole::Funding));
        assert!(!assistance_only.allows(OfficeRole::AssistanceAwards));
    }

    #[test]
    fn test_zip5_cd_count_is_at_least_one() {
        let entry = Zip5Entry {
            geo: ZipGeo { state: "NY".into(), county: "001".into(), congressional_district: None },
            districts: BTreeSet::new(),
        };
        assert_eq!(entry.cd_count(), 1);
    }
}
