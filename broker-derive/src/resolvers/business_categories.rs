//! Business-category tags
//!
//! Both record kinds share one roll-up table. Assistance records feed it
//! from the characters of `business_types`; procurement records from their
//! boolean attribute flags. Output is sorted and de-duplicated.

use crate::models::fields::present;
use crate::models::FpdsBusinessFlags;
use std::collections::BTreeSet;

/// Per-character tags for assistance `business_types`
const FABS_TYPE_TAGS: &[(char, &[&str])] = &[
    ('A', &["regional_and_state_government"]),
    ('B', &["local_government"]),
    ('C', &["local_government"]),
    ('D', &["local_government"]),
    ('E', &["regional_organization"]),
    ('F', &["us_territory_or_possession"]),
    ('G', &["local_government"]),
    ('H', &["public_institution_of_higher_education"]),
    ('I', &["indian_native_american_tribal_government"]),
    ('J', &["indian_native_american_tribal_government"]),
    ('K', &["indian_native_american_tribal_government"]),
    ('L', &["authorities_and_commissions"]),
    ('M', &["nonprofit"]),
    ('N', &["nonprofit"]),
    ('O', &["private_institution_of_higher_education"]),
    ('P', &["individuals"]),
    ('Q', &["other_than_small_business"]),
    ('R', &["small_business"]),
    ('S', &["minority_serving_institution_of_higher_education"]),
    ('T', &["minority_serving_institution_of_higher_education"]),
    ('U', &["minority_serving_institution_of_higher_education"]),
    ('V', &["minority_serving_institution_of_higher_education"]),
    ('W', &["foreign_owned_and_located_business"]),
];

/// Parent tag added when any listed child tag is present
const ROLLUPS: &[(&str, &[&str])] = &[
    (
        "category_business",
        &[
            "small_business",
            "other_than_small_business",
            "corporate_entity_tax_exempt",
            "corporate_entity_not_tax_exempt",
            "partnership_or_limited_liability_partnership",
            "sole_proprietorship",
            "manufacturer_of_goods",
            "subchapter_s_corporation",
            "limited_liability_corporation",
        ],
    ),
    (
        "minority_owned_business",
        &[
            "alaskan_native_owned_business",
            "american_indian_owned_business",
            "asian_pacific_american_owned_business",
            "black_american_owned_business",
            "hispanic_american_owned_business",
            "native_american_owned_business",
            "native_hawaiian_owned_business",
            "subcontinent_asian_indian_american_owned_business",
            "tribally_owned_business",
            "other_minority_owned_business",
        ],
    ),
    (
        "woman_owned_business",
        &[
            "women_owned_small_business",
            "economically_disadvantaged_women_owned_small_business",
            "joint_venture_women_owned_small_business",
            "joint_venture_economically_disadvantaged_women_owned_small_business",
        ],
    ),
    ("veteran_owned_business", &["service_disabled_veteran_owned_business"]),
    (
        "special_designations",
        &[
            "8a_program_participant",
            "ability_one_program",
            "dot_certified_disadvantaged_business_enterprise",
            "emerging_small_business",
            "federally_funded_research_and_development_corp",
            "historically_underutilized_business_firm",
            "labor_surplus_area_firm",
            "sba_certified_8a_joint_venture",
            "self_certified_small_disadvantaged_business",
            "small_agricultural_cooperative",
            "small_disadvantaged_business",
            "community_developed_corporation_owned_firm",
            "us_owned_business",
            "foreign_owned_and_us_located_business",
            "foreign_owned_and_located_business",
            "foreign_government",
            "international_organization",
            "domestic_shelter",
            "hospital",
            "veterinary_hospital",
        ],
    ),
    ("nonprofit", &["foundation", "community_development_corporations"]),
    (
        "higher_education",
        &[
            "public_institution_of_higher_education",
            "private_institution_of_higher_education",
            "minority_serving_institution_of_higher_education",
        ],
    ),
    (
        "government",
        &[
            "national_government",
            "regional_and_state_government",
            "us_territory_or_possession",
            "local_government",
            "indian_native_american_tribal_government",
            "authorities_and_commissions",
            "council_of_governments",
            "interstate_entity",
            "regional_organization",
        ],
    ),
];

/// Procurement rule: tag emitted when the predicate holds
struct FlagRule {
    tag: &'static str,
    test: fn(&FpdsBusinessFlags) -> bool,
}

fn set(flag: Option<bool>) -> bool {
    flag == Some(true)
}

fn code_is(value: &Option<String>, code: &str) -> bool {
    present(value)
        .map(|v| v.eq_ignore_ascii_case(code))
        .unwrap_or(false)
}

static FPDS_RULES: &[FlagRule] = &[
    // Business
    FlagRule { tag: "small_business", test: |f| code_is(&f.contracting_officers_deter, "S") },
    FlagRule { tag: "other_than_small_business", test: |f| code_is(&f.contracting_officers_deter, "O") },
    FlagRule { tag: "corporate_entity_tax_exempt", test: |f| set(f.corporate_entity_tax_exemp) },
    FlagRule { tag: "corporate_entity_not_tax_exempt", test: |f| set(f.corporate_entity_not_tax_e) },
    FlagRule { tag: "partnership_or_limited_liability_partnership", test: |f| set(f.partnership_or_limited_li) },
    FlagRule { tag: "sole_proprietorship", test: |f| set(f.sole_proprietorship) },
    FlagRule { tag: "manufacturer_of_goods", test: |f| set(f.manufacturer_of_goods) },
    FlagRule { tag: "subchapter_s_corporation", test: |f| set(f.subchapter_s_corporation) },
    FlagRule { tag: "limited_liability_corporation", test: |f| set(f.limited_liability_corporat) },
    FlagRule { tag: "category_business", test: |f| set(f.for_profit_organization) },
    // Minority owned
    FlagRule { tag: "alaskan_native_owned_business", test: |f| set(f.alaskan_native_owned_corpo) },
    FlagRule { tag: "american_indian_owned_business", test: |f| set(f.american_indian_owned_busi) },
    FlagRule { tag: "asian_pacific_american_owned_business", test: |f| set(f.asian_pacific_american_own) },
    FlagRule { tag: "black_american_owned_business", test: |f| set(f.black_american_owned_busin) },
    FlagRule { tag: "hispanic_american_owned_business", test: |f| set(f.hispanic_american_owned_bu) },
    FlagRule { tag: "native_american_owned_business", test: |f| set(f.native_american_owned_busi) },
    FlagRule { tag: "native_hawaiian_owned_business", test: |f| set(f.native_hawaiian_owned_busi) },
    FlagRule { tag: "subcontinent_asian_indian_american_owned_business", test: |f| set(f.subcontinent_asian_asian_i) },
    FlagRule { tag: "tribally_owned_business", test: |f| set(f.tribally_owned_business) },
    FlagRule { tag: "other_minority_owned_business", test: |f| set(f.other_minority_owned_busin) },
    FlagRule { tag: "minority_owned_business", test: |f| set(f.minority_owned_business) },
    // Woman owned
    FlagRule { tag: "women_owned_small_business", test: |f| set(f.women_owned_small_business) },
    FlagRule { tag: "economically_disadvantaged_women_owned_small_business", test: |f| set(f.economically_disadvantaged) },
    FlagRule { tag: "joint_venture_women_owned_small_business", test: |f| set(f.joint_venture_women_owned) },
    FlagRule { tag: "joint_venture_economically_disadvantaged_women_owned_small_business", test: |f| set(f.joint_venture_economically) },
    FlagRule { tag: "woman_owned_business", test: |f| set(f.woman_owned_business) },
    // Veteran owned
    FlagRule { tag: "service_disabled_veteran_owned_business", test: |f| set(f.service_disabled_veteran_o) },
    FlagRule { tag: "veteran_owned_business", test: |f| set(f.veteran_owned_business) },
    // Special designations
    FlagRule { tag: "8a_program_participant", test: |f| set(f.c8a_program_participant) },
    FlagRule { tag: "ability_one_program", test: |f| set(f.the_ability_one_program) },
    FlagRule { tag: "dot_certified_disadvantaged_business_enterprise", test: |f| set(f.dot_certified_disadvantage) },
    FlagRule { tag: "emerging_small_business", test: |f| set(f.emerging_small_business) },
    FlagRule { tag: "federally_funded_research_and_development_corp", test: |f| set(f.federally_funded_research) },
    FlagRule { tag: "historically_underutilized_business_firm", test: |f| set(f.historically_underutilized) },
    FlagRule { tag: "labor_surplus_area_firm", test: |f| set(f.labor_surplus_area_firm) },
    FlagRule { tag: "sba_certified_8a_joint_venture", test: |f| set(f.sba_certified_8_a_joint_ve) },
    FlagRule { tag: "self_certified_small_disadvantaged_business", test: |f| set(f.self_certified_small_disad) },
    FlagRule { tag: "small_agricultural_cooperative", test: |f| set(f.small_agricultural_coopera) },
    FlagRule { tag: "small_disadvantaged_business", test: |f| set(f.small_disadvantaged_busine) },
    FlagRule { tag: "community_developed_corporation_owned_firm", test: |f| set(f.community_developed_corpor) },
    FlagRule { tag: "us_owned_business", test: |f| code_is(&f.domestic_or_foreign_entity, "A") },
    FlagRule { tag: "foreign_owned_and_us_located_business", test: |f| code_is(&f.domestic_or_foreign_entity, "C") },
    FlagRule { tag: "foreign_owned_and_located_business", test: |f| code_is(&f.domestic_or_foreign_entity, "D") },
    FlagRule { tag: "foreign_government", test: |f| set(f.foreign_government) },
    FlagRule { tag: "international_organization", test: |f| set(f.international_organization) },
    FlagRule { tag: "domestic_shelter", test: |f| set(f.domestic_shelter) },
    FlagRule { tag: "hospital", test: |f| set(f.hospital_flag) },
    FlagRule { tag: "veterinary_hospital", test: |f| set(f.veterinary_hospital) },
    // Nonprofit
    FlagRule { tag: "foundation", test: |f| set(f.foundation) },
    FlagRule { tag: "community_development_corporations", test: |f| set(f.community_development_corp) },
    FlagRule {
        tag: "nonprofit",
        test: |f| set(f.nonprofit_organization) || set(f.other_not_for_profit_organ),
    },
    // Higher education
    FlagRule {
        tag: "public_institution_of_higher_education",
        test: |f| {
            set(f.state_controlled_instituti)
                || set(f.c1862_land_grant_college)
                || set(f.c1890_land_grant_college)
                || set(f.c1994_land_grant_college)
        },
    },
    FlagRule { tag: "private_institution_of_higher_education", test: |f| set(f.private_university_or_coll) },
    FlagRule {
        tag: "minority_serving_institution_of_higher_education",
        test: |f| {
            set(f.minority_institution)
                || set(f.historically_black_college)
                || set(f.tribal_college)
                || set(f.alaskan_native_servicing_i)
                || set(f.native_hawaiian_servicing)
                || set(f.hispanic_servicing_institu)
        },
    },
    FlagRule {
        tag: "higher_education",
        test: |f| {
            set(f.educational_institution) || set(f.school_of_forestry) || set(f.veterinary_college)
        },
    },
    // Government
    FlagRule {
        tag: "national_government",
        test: |f| set(f.us_federal_government) || set(f.federal_agency) || set(f.us_government_entity),
    },
    FlagRule { tag: "interstate_entity", test: |f| set(f.interstate_entity) },
    FlagRule { tag: "regional_and_state_government", test: |f| set(f.us_state_government) },
    FlagRule { tag: "regional_organization", test: |f| set(f.regional_organization) },
    FlagRule { tag: "us_territory_or_possession", test: |f| set(f.us_territory_or_possession) },
    FlagRule { tag: "council_of_governments", test: |f| set(f.council_of_governments) },
    FlagRule {
        tag: "local_government",
        test: |f| {
            set(f.city_local_government)
                || set(f.county_local_government)
                || set(f.inter_municipal_local_gove)
                || set(f.municipality_local_governm)
                || set(f.township_local_government)
                || set(f.us_local_government)
                || set(f.local_government_owned)
                || set(f.school_district_local_gov)
        },
    },
    FlagRule {
        tag: "indian_native_american_tribal_government",
        test: |f| set(f.us_tribal_government) || set(f.indian_tribe_federally_rec),
    },
    FlagRule {
        tag: "authorities_and_commissions",
        test: |f| {
            set(f.housing_authorities_public)
                || set(f.airport_authority)
                || set(f.port_authority)
                || set(f.transit_authority)
                || set(f.planning_commission)
        },
    },
];

fn roll_up(mut tags: BTreeSet<&'static str>) -> Vec<String> {
    for (parent, children) in ROLLUPS {
        if children.iter().any(|child| tags.contains(child)) {
            tags.insert(*parent);
        }
    }
    tags.into_iter().map(str::to_string).collect()
}

/// Categories for an assistance record's `business_types`
pub fn fabs_business_categories(business_types: &Option<String>) -> Vec<String> {
    let mut tags = BTreeSet::new();
    if let Some(codes) = present(business_types) {
        for c in codes.chars().map(|c| c.to_ascii_uppercase()) {
            if let Some((_, found)) = FABS_TYPE_TAGS.iter().find(|(code, _)| *code == c) {
                tags.extend(found.iter().copied());
            }
        }
    }
    roll_up(tags)
}

/// Categories for a procurement record's attribute flags
pub fn fpds_business_categories(flags: &FpdsBusinessFlags) -> Vec<String> {
    let tags = FPDS_RULES
        .iter()
        .filter(|rule| (rule.test)(flags))
        .map(|rule| rule.tag)
        .collect();
    roll_up(tags)
}
