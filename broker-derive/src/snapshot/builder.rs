//! Snapshot construction
//!
//! Loaders push rows table by table; `build()` resolves cross-table links
//! (sub-tier parents) and refuses to produce a snapshot when any required
//! table was never supplied. An empty table is fine, a missing one is not.

use super::{
    normalize_name, AgencyRef, AwardDonor, City, DonorKey, Office, OfficeRoles, OfficerSlots,
    Recipient, ReferenceSnapshot, SubTier, Zip5Entry, ZipGeo,
};
use crate::error::DeriveError;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Tables a snapshot cannot be built without
pub const REQUIRED_TABLES: &[&str] = &[
    "country_code",
    "states",
    "county_code",
    "city_code",
    "zip_city",
    "zips",
    "cgac",
    "frec",
    "sub_tier_agency",
    "office",
    "cfda_program",
    "recipient",
    "executive_compensation",
];

#[derive(Debug, Clone, Default)]
pub struct StateRow {
    pub state_code: String,
    pub state_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct CountyRow {
    pub state_code: String,
    pub county_number: String,
    pub county_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct CityRow {
    pub state_code: String,
    pub city_code: String,
    pub feature_name: String,
    pub county_number: Option<String>,
    pub county_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ZipRow {
    pub zip5: String,
    pub zip_last4: Option<String>,
    pub state_abbreviation: String,
    pub county_number: String,
    pub congressional_district_no: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FrecRow {
    pub frec_code: String,
    pub agency_name: Option<String>,
    pub cgac_code: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SubTierRow {
    pub sub_tier_agency_code: String,
    pub sub_tier_agency_name: Option<String>,
    pub cgac_code: Option<String>,
    pub frec_code: Option<String>,
    pub is_frec: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OfficeRow {
    pub office_code: String,
    pub office_name: Option<String>,
    pub sub_tier_code: Option<String>,
    pub roles: OfficeRoles,
}

#[derive(Debug, Clone, Default)]
pub struct RecipientRow {
    pub recipient_id: String,
    pub ultimate_parent_unique_ide: Option<String>,
    pub ultimate_parent_legal_enti: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExecCompRow {
    pub recipient_id: String,
    pub officers: OfficerSlots,
}

/// One active published assistance transaction
#[derive(Debug, Clone, Default)]
pub struct PublishedAwardRow {
    pub record_type: Option<i32>,
    pub fain: Option<String>,
    pub uri: Option<String>,
    pub awarding_sub_tier_agency_c: Option<String>,
    pub award_modification_amendme: Option<String>,
    pub action_date: Option<String>,
    pub awarding_office_code: Option<String>,
    pub funding_office_code: Option<String>,
}

/// Accumulates reference rows and produces a [`ReferenceSnapshot`]
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: ReferenceSnapshot,
    cgacs: HashMap<String, Option<String>>,
    frecs: HashMap<String, FrecRow>,
    sub_tier_rows: Vec<SubTierRow>,
    supplied: HashSet<&'static str>,
}

fn upper(value: &str) -> String {
    value.trim().to_uppercase()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse the date formats published rows carry
pub fn parse_action_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn countries(mut self, rows: impl IntoIterator<Item = (String, String)>) -> Self {
        for (code, name) in rows {
            self.snapshot.countries.insert(upper(&code), name);
        }
        self.supplied.insert("country_code");
        self
    }

    pub fn states(mut self, rows: impl IntoIterator<Item = StateRow>) -> Self {
        for row in rows {
            let code = upper(&row.state_code);
            self.snapshot
                .states_by_name
                .insert(normalize_name(&row.state_name), code.clone());
            self.snapshot.states.insert(code, row.state_name);
        }
        self.supplied.insert("states");
        self
    }

    pub fn counties(mut self, rows: impl IntoIterator<Item = CountyRow>) -> Self {
        for row in rows {
            let state = upper(&row.state_code);
            let number = row.county_number.trim().to_string();
            self.snapshot.counties_by_name.insert(
                (state.clone(), normalize_name(&row.county_name)),
                number.clone(),
            );
            self.snapshot
                .counties_by_code
                .insert((state, number), row.county_name);
        }
        self.supplied.insert("county_code");
        self
    }

    pub fn cities(mut self, rows: impl IntoIterator<Item = CityRow>) -> Self {
        for row in rows {
            let state = upper(&row.state_code);
            let code = row.city_code.trim().to_string();
            // First code wins when two places share a name within a state
            self.snapshot
                .cities_by_name
                .entry((state.clone(), normalize_name(&row.feature_name)))
                .or_insert_with(|| code.clone());
            self.snapshot.cities.insert(
                (state, code),
                City {
                    name: row.feature_name,
                    county_number: blank_to_none(row.county_number),
                    county_name: blank_to_none(row.county_name),
                },
            );
        }
        self.supplied.insert("city_code");
        self
    }

    pub fn zip_cities(mut self, rows: impl IntoIterator<Item = (String, String)>) -> Self {
        for (zip5, city) in rows {
            self.snapshot.zip_cities.insert(zip5.trim().to_string(), city);
        }
        self.supplied.insert("zip_city");
        self
    }

    pub fn zips(mut self, rows: impl IntoIterator<Item = ZipRow>) -> Self {
        for row in rows {
            let zip5 = row.zip5.trim().to_string();
            let district = blank_to_none(row.congressional_district_no);
            let geo = ZipGeo {
                state: upper(&row.state_abbreviation),
                county: row.county_number.trim().to_string(),
                congressional_district: district.clone(),
            };

            let entry = self
                .snapshot
                .zips_by_zip5
                .entry(zip5.clone())
                .or_insert_with(|| Zip5Entry {
                    geo: geo.clone(),
                    districts: BTreeSet::new(),
                });
            if let Some(cd) = district {
                entry.districts.insert(cd);
            }

            if let Some(zip4) = blank_to_none(row.zip_last4) {
                self.snapshot
                    .zips_by_zip9
                    .insert((zip5, zip4.trim().to_string()), geo);
            }
        }
        self.supplied.insert("zips");
        self
    }

    pub fn cgacs(mut self, rows: impl IntoIterator<Item = (String, Option<String>)>) -> Self {
        for (code, name) in rows {
            self.cgacs.insert(upper(&code), name);
        }
        self.supplied.insert("cgac");
        self
    }

    pub fn frecs(mut self, rows: impl IntoIterator<Item = FrecRow>) -> Self {
        for row in rows {
            self.frecs.insert(upper(&row.frec_code), row);
        }
        self.supplied.insert("frec");
        self
    }

    pub fn sub_tiers(mut self, rows: impl IntoIterator<Item = SubTierRow>) -> Self {
        self.sub_tier_rows.extend(rows);
        self.supplied.insert("sub_tier_agency");
        self
    }

    pub fn offices(mut self, rows: impl IntoIterator<Item = OfficeRow>) -> Self {
        for row in rows {
            let code = upper(&row.office_code);
            self.snapshot.offices.insert(
                code.clone(),
                Office {
                    code,
                    name: row.office_name,
                    sub_tier_code: blank_to_none(row.sub_tier_code).map(|s| upper(&s)),
                    roles: row.roles,
                },
            );
        }
        self.supplied.insert("office");
        self
    }

    pub fn cfda_programs(mut self, rows: impl IntoIterator<Item = (String, String)>) -> Self {
        for (number, title) in rows {
            self.snapshot.cfda.insert(number.trim().to_string(), title);
        }
        self.supplied.insert("cfda_program");
        self
    }

    pub fn recipients(mut self, rows: impl IntoIterator<Item = RecipientRow>) -> Self {
        for row in rows {
            self.snapshot.recipients.insert(
                upper(&row.recipient_id),
                Recipient {
                    ultimate_parent_unique_ide: blank_to_none(row.ultimate_parent_unique_ide),
                    ultimate_parent_legal_enti: blank_to_none(row.ultimate_parent_legal_enti),
                },
            );
        }
        self.supplied.insert("recipient");
        self
    }

    pub fn exec_comp(mut self, rows: impl IntoIterator<Item = ExecCompRow>) -> Self {
        for row in rows {
            self.snapshot
                .exec_comp
                .insert(upper(&row.recipient_id), row.officers);
        }
        self.supplied.insert("executive_compensation");
        self
    }

    /// Reduce published rows to the earliest transaction per award
    ///
    /// Optional: without it office back-fill never finds a donor.
    pub fn published_awards(mut self, rows: impl IntoIterator<Item = PublishedAwardRow>) -> Self {
        for row in rows {
            let aggregate = row.record_type == Some(1);
            let award_key = if aggregate { &row.uri } else { &row.fain };
            let (Some(award_key), Some(sub_tier)) = (
                award_key.as_deref().filter(|v| !v.trim().is_empty()),
                row.awarding_sub_tier_agency_c
                    .as_deref()
                    .filter(|v| !v.trim().is_empty()),
            ) else {
                continue;
            };
            let Some(action_date) = row.action_date.as_deref().and_then(parse_action_date) else {
                debug!("Skipping published award with unparseable action_date");
                continue;
            };

            let donor_key = DonorKey::new(aggregate, award_key, sub_tier);
            let donor = AwardDonor {
                action_date,
                award_modification_amendme: row.award_modification_amendme,
                awarding_office_code: blank_to_none(row.awarding_office_code),
                funding_office_code: blank_to_none(row.funding_office_code),
            };

            match self.snapshot.award_donors.get(&donor_key) {
                Some(existing) if existing.action_date <= donor.action_date => {}
                _ => {
                    self.snapshot.award_donors.insert(donor_key, donor);
                }
            }
        }
        self.supplied.insert("published_fabs");
        self
    }

    /// Finish the snapshot
    ///
    /// # Errors
    /// `DeriveError::Snapshot` naming the first required table never supplied.
    pub fn build(mut self) -> Result<ReferenceSnapshot, DeriveError> {
        if let Some(missing) = REQUIRED_TABLES
            .iter()
            .find(|table| !self.supplied.contains(**table))
        {
            return Err(DeriveError::Snapshot((*missing).to_string()));
        }

        for row in std::mem::take(&mut self.sub_tier_rows) {
            let code = upper(&row.sub_tier_agency_code);
            // A parent code with no row in its table leaves the sub-tier orphaned
            let cgac = blank_to_none(row.cgac_code).and_then(|c| {
                let c = upper(&c);
                self.cgacs.get(&c).map(|name| AgencyRef {
                    name: name.clone(),
                    code: c,
                })
            });
            let frec = blank_to_none(row.frec_code).and_then(|f| {
                let f = upper(&f);
                self.frecs.get(&f).map(|r| AgencyRef {
                    name: r.agency_name.clone(),
                    code: f,
                })
            });

            self.snapshot.sub_tiers.insert(
                code.clone(),
                SubTier {
                    code,
                    name: row.sub_tier_agency_name,
                    is_frec: row.is_frec,
                    cgac,
                    frec,
                },
            );
        }

        debug!(
            "Built reference snapshot: {} zips, {} sub-tiers, {} offices, {} award donors",
            self.snapshot.zips_by_zip5.len(),
            self.snapshot.sub_tiers.len(),
            self.snapshot.offices.len(),
            self.snapshot.award_donors.len()
        );

        Ok(self.snapshot)
    }
}
