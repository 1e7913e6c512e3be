//! Procurement transaction record

use super::fields::lenient_f64;
use super::officers::HighCompOfficers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Feed a procurement record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AtomType {
    /// Definitive contracts, purchase orders, delivery orders
    #[default]
    Award,
    /// Indefinite-delivery vehicles (base contract vehicles)
    Idv,
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomType::Award => write!(f, "award"),
            AtomType::Idv => write!(f, "idv"),
        }
    }
}

impl FromStr for AtomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "award" => Ok(AtomType::Award),
            "idv" => Ok(AtomType::Idv),
            other => Err(format!("unknown atom type '{}' (expected award or idv)", other)),
        }
    }
}

/// Socio-economic and organizational attributes reported on a contract
///
/// Each flag is nullable in the feed; only `Some(true)` counts as set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FpdsBusinessFlags {
    /// Contracting officer's size determination: `S` small, `O` other than small
    pub contracting_officers_deter: Option<String>,
    /// `A` US owned, `C` foreign owned and US located, `D` foreign owned and located
    pub domestic_or_foreign_entity: Option<String>,

    // Business
    pub corporate_entity_tax_exemp: Option<bool>,
    pub corporate_entity_not_tax_e: Option<bool>,
    pub partnership_or_limited_li: Option<bool>,
    pub sole_proprietorship: Option<bool>,
    pub manufacturer_of_goods: Option<bool>,
    pub subchapter_s_corporation: Option<bool>,
    pub limited_liability_corporat: Option<bool>,
    pub for_profit_organization: Option<bool>,

    // Minority owned
    pub alaskan_native_owned_corpo: Option<bool>,
    pub american_indian_owned_busi: Option<bool>,
    pub asian_pacific_american_own: Option<bool>,
    pub black_american_owned_busin: Option<bool>,
    pub hispanic_american_owned_bu: Option<bool>,
    pub native_american_owned_busi: Option<bool>,
    pub native_hawaiian_owned_busi: Option<bool>,
    pub subcontinent_asian_asian_i: Option<bool>,
    pub tribally_owned_business: Option<bool>,
    pub other_minority_owned_busin: Option<bool>,
    pub minority_owned_business: Option<bool>,

    // Woman owned
    pub women_owned_small_business: Option<bool>,
    pub economically_disadvantaged: Option<bool>,
    pub joint_venture_women_owned: Option<bool>,
    pub joint_venture_economically: Option<bool>,
    pub woman_owned_business: Option<bool>,

    // Veteran owned
    pub service_disabled_veteran_o: Option<bool>,
    pub veteran_owned_business: Option<bool>,

    // Special designations
    pub c8a_program_participant: Option<bool>,
    pub the_ability_one_program: Option<bool>,
    pub dot_certified_disadvantage: Option<bool>,
    pub emerging_small_business: Option<bool>,
    pub federally_funded_research: Option<bool>,
    pub historically_underutilized: Option<bool>,
    pub labor_surplus_area_firm: Option<bool>,
    pub sba_certified_8_a_joint_ve: Option<bool>,
    pub self_certified_small_disad: Option<bool>,
    pub small_agricultural_coopera: Option<bool>,
    pub small_disadvantaged_busine: Option<bool>,
    pub community_developed_corpor: Option<bool>,
    pub foreign_government: Option<bool>,
    pub international_organization: Option<bool>,
    pub domestic_shelter: Option<bool>,
    pub hospital_flag: Option<bool>,
    pub veterinary_hospital: Option<bool>,

    // Nonprofit
    pub foundation: Option<bool>,
    pub community_development_corp: Option<bool>,
    pub nonprofit_organization: Option<bool>,
    pub other_not_for_profit_organ: Option<bool>,

    // Higher education
    pub state_controlled_instituti: Option<bool>,
    pub private_university_or_coll: Option<bool>,
    pub c1862_land_grant_college: Option<bool>,
    pub c1890_land_grant_college: Option<bool>,
    pub c1994_land_grant_college: Option<bool>,
    pub historically_black_college: Option<bool>,
    pub tribal_college: Option<bool>,
    pub alaskan_native_servicing_i: Option<bool>,
    pub native_hawaiian_servicing: Option<bool>,
    pub hispanic_servicing_institu: Option<bool>,
    pub minority_institution: Option<bool>,
    pub school_of_forestry: Option<bool>,
    pub veterinary_college: Option<bool>,
    pub educational_institution: Option<bool>,

    // Government
    pub us_federal_government: Option<bool>,
    pub federal_agency: Option<bool>,
    pub us_government_entity: Option<bool>,
    pub interstate_entity: Option<bool>,
    pub us_state_government: Option<bool>,
    pub council_of_governments: Option<bool>,
    pub city_local_government: Option<bool>,
    pub county_local_government: Option<bool>,
    pub inter_municipal_local_gove: Option<bool>,
    pub municipality_local_governm: Option<bool>,
    pub township_local_government: Option<bool>,
    pub us_local_government: Option<bool>,
    pub local_government_owned: Option<bool>,
    pub school_district_local_gov: Option<bool>,
    pub us_tribal_government: Option<bool>,
    pub indian_tribe_federally_rec: Option<bool>,
    pub housing_authorities_public: Option<bool>,
    pub airport_authority: Option<bool>,
    pub port_authority: Option<bool>,
    pub transit_authority: Option<bool>,
    pub planning_commission: Option<bool>,
    pub regional_organization: Option<bool>,
    pub us_territory_or_possession: Option<bool>,
}

/// One FPDS transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FpdsRecord {
    // ========================================================================
    // Contract identification
    // ========================================================================
    pub detached_award_proc_unique: Option<String>,
    pub unique_award_key: Option<String>,
    pub piid: Option<String>,
    pub agency_id: Option<String>,
    pub parent_award_id: Option<String>,
    pub referenced_idv_agency_iden: Option<String>,
    pub award_modification_amendme: Option<String>,
    pub transaction_number: Option<String>,
    pub action_date: Option<String>,
    pub action_type: Option<String>,
    pub action_type_description: Option<String>,
    pub contract_award_type: Option<String>,
    pub idv_type: Option<String>,
    pub award_description: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub federal_action_obligation: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub base_and_all_options_value: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub base_exercised_options_val: Option<f64>,

    // ========================================================================
    // Agencies and offices
    // ========================================================================
    pub awarding_agency_code: Option<String>,
    pub awarding_agency_name: Option<String>,
    pub awarding_sub_tier_agency_c: Option<String>,
    pub awarding_sub_tier_agency_n: Option<String>,
    pub awarding_office_code: Option<String>,
    pub awarding_office_name: Option<String>,
    pub funding_agency_code: Option<String>,
    pub funding_agency_name: Option<String>,
    pub funding_sub_tier_agency_co: Option<String>,
    pub funding_sub_tier_agency_na: Option<String>,
    pub funding_office_code: Option<String>,
    pub funding_office_name: Option<String>,

    // ========================================================================
    // Recipient (legal entity)
    // ========================================================================
    pub awardee_or_recipient_legal: Option<String>,
    pub awardee_or_recipient_uniqu: Option<String>,
    pub awardee_or_recipient_uei: Option<String>,
    pub ultimate_parent_legal_enti: Option<String>,
    pub ultimate_parent_unique_ide: Option<String>,
    pub business_categories: Option<Vec<String>>,
    pub legal_entity_address_line1: Option<String>,
    pub legal_entity_address_line2: Option<String>,
    pub legal_entity_address_line3: Option<String>,
    pub legal_entity_city_name: Option<String>,
    pub legal_entity_congressional: Option<String>,
    pub legal_entity_country_code: Option<String>,
    pub legal_entity_country_name: Option<String>,
    pub legal_entity_county_code: Option<String>,
    pub legal_entity_county_name: Option<String>,
    pub legal_entity_state_code: Option<String>,
    pub legal_entity_state_descrip: Option<String>,
    pub legal_entity_zip4: Option<String>,
    pub legal_entity_zip5: Option<String>,
    pub legal_entity_zip_last4: Option<String>,

    // ========================================================================
    // Place of performance
    // ========================================================================
    pub place_of_perform_city_name: Option<String>,
    pub place_of_performance_congr: Option<String>,
    pub place_of_perform_country_c: Option<String>,
    pub place_of_perf_country_desc: Option<String>,
    pub place_of_perform_county_co: Option<String>,
    pub place_of_perform_county_na: Option<String>,
    pub place_of_performance_state: Option<String>,
    pub place_of_perfor_state_desc: Option<String>,
    pub place_of_performance_zip4a: Option<String>,
    pub place_of_performance_zip5: Option<String>,
    pub place_of_perform_zip_last4: Option<String>,

    #[serde(flatten)]
    pub flags: FpdsBusinessFlags,

    #[serde(flatten)]
    pub officers: HighCompOfficers,

    pub updated_at: Option<DateTime<Utc>>,

    /// Feed columns the engine does not interpret, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
