//! Procurement (FPDS) derivation pipeline
//!
//! Shares the agency, geography, recipient and business-category resolvers
//! with the assistance pipeline. Procurement rows carry no record type and
//! no delete indicator, so every row takes the same path.

use super::Derivation;
use crate::models::fields::present;
use crate::models::{AtomType, FpdsRecord, RecordContext};
use crate::resolvers::agency::{resolve_agency, AgencyFieldsMut, AgencyRole};
use crate::resolvers::business_categories::fpds_business_categories;
use crate::resolvers::geo::{
    is_usa, normalize_us_territory_country, resolve_zip, split_zip, LocationFieldsMut,
};
use crate::resolvers::recipient::{recipient_id, resolve_exec_comp, resolve_ultimate_parent};
use crate::resolvers::unique_keys::{fpds_award_key, fpds_transaction_key};
use crate::sink::DerivationSink;
use crate::snapshot::ReferenceSnapshot;
use broker_common::Clock;
use std::sync::Arc;

/// Record-identifier column in procurement feeds
pub const FPDS_RECORD_ID_KEY: &str = "detached_award_procurement_id";

/// Mutable view of one location block (recipient or place of performance)
struct LocationMut<'a> {
    country_code: &'a mut Option<String>,
    country_name: &'a mut Option<String>,
    state_code: &'a mut Option<String>,
    state_name: &'a mut Option<String>,
    county_code: &'a mut Option<String>,
    county_name: &'a mut Option<String>,
    zip_source: &'a Option<String>,
    zip5: &'a mut Option<String>,
    zip_last4: &'a mut Option<String>,
}

fn resolve_location(snapshot: &ReferenceSnapshot, location: LocationMut<'_>) {
    let LocationMut {
        country_code,
        country_name,
        state_code,
        state_name,
        county_code,
        county_name,
        zip_source,
        zip5,
        zip_last4,
    } = location;

    normalize_us_territory_country(
        snapshot,
        LocationFieldsMut {
            country_code: &mut *country_code,
            country_name,
            state_code: &mut *state_code,
            state_name: &mut *state_name,
        },
    );

    split_zip(zip_source, zip5, zip_last4);

    let country = present(country_code);
    if country.is_some() && !is_usa(country) {
        return;
    }

    if present(state_code).is_none() {
        *state_code = present(state_name)
            .and_then(|name| snapshot.state_by_name(name))
            .map(str::to_string);
    }
    if let Some(name) = present(state_code).and_then(|s| snapshot.state_name(s)) {
        *state_name = Some(name.to_string());
    }

    let Some(state) = present(state_code).map(str::to_uppercase) else {
        return;
    };

    if present(county_code).is_none() {
        if let Some(hit) = present(zip5)
            .and_then(|z| resolve_zip(snapshot, z, present(zip_last4)))
            .filter(|hit| hit.state == state)
        {
            *county_code = Some(hit.county);
        }
    }

    match present(county_code).map(str::to_string) {
        Some(code) => {
            if let Some(name) = snapshot.county_name(&state, &code) {
                *county_name = Some(name.to_string());
            }
        }
        None => {
            *county_code = present(county_name)
                .and_then(|name| snapshot.county_by_name(&state, name))
                .map(str::to_string);
        }
    }
}

/// Procurement derivation pipeline for one feed
#[derive(Clone)]
pub struct FpdsDerivation {
    snapshot: Arc<ReferenceSnapshot>,
    sink: Arc<dyn DerivationSink>,
    clock: Arc<dyn Clock>,
    atom: AtomType,
}

impl FpdsDerivation {
    pub fn new(
        snapshot: Arc<ReferenceSnapshot>,
        sink: Arc<dyn DerivationSink>,
        clock: Arc<dyn Clock>,
        atom: AtomType,
    ) -> Self {
        Self {
            snapshot,
            sink,
            clock,
            atom,
        }
    }

    fn agencies(&self, record: &mut FpdsRecord, ctx: &RecordContext) {
        resolve_agency(
            &self.snapshot,
            AgencyRole::Awarding,
            AgencyFieldsMut {
                agency_code: &mut record.awarding_agency_code,
                agency_name: &mut record.awarding_agency_name,
                sub_tier_code: &mut record.awarding_sub_tier_agency_c,
                sub_tier_name: &mut record.awarding_sub_tier_agency_n,
                office_code: &record.awarding_office_code,
                office_name: &mut record.awarding_office_name,
            },
            ctx,
            self.sink.as_ref(),
        );
        resolve_agency(
            &self.snapshot,
            AgencyRole::Funding,
            AgencyFieldsMut {
                agency_code: &mut record.funding_agency_code,
                agency_name: &mut record.funding_agency_name,
                sub_tier_code: &mut record.funding_sub_tier_agency_co,
                sub_tier_name: &mut record.funding_sub_tier_agency_na,
                office_code: &record.funding_office_code,
                office_name: &mut record.funding_office_name,
            },
            ctx,
            self.sink.as_ref(),
        );
    }

    fn locations(&self, record: &mut FpdsRecord) {
        resolve_location(
            &self.snapshot,
            LocationMut {
                country_code: &mut record.legal_entity_country_code,
                country_name: &mut record.legal_entity_country_name,
                state_code: &mut record.legal_entity_state_code,
                state_name: &mut record.legal_entity_state_descrip,
                county_code: &mut record.legal_entity_county_code,
                county_name: &mut record.legal_entity_county_name,
                zip_source: &record.legal_entity_zip4,
                zip5: &mut record.legal_entity_zip5,
                zip_last4: &mut record.legal_entity_zip_last4,
            },
        );
        resolve_location(
            &self.snapshot,
            LocationMut {
                country_code: &mut record.place_of_perform_country_c,
                country_name: &mut record.place_of_perf_country_desc,
                state_code: &mut record.place_of_performance_state,
                state_name: &mut record.place_of_perfor_state_desc,
                county_code: &mut record.place_of_perform_county_co,
                county_name: &mut record.place_of_perform_county_na,
                zip_source: &record.place_of_performance_zip4a,
                zip5: &mut record.place_of_performance_zip5,
                zip_last4: &mut record.place_of_perform_zip_last4,
            },
        );
    }

    fn recipient(&self, record: &mut FpdsRecord) {
        let id = recipient_id(
            &record.awardee_or_recipient_uei,
            &record.awardee_or_recipient_uniqu,
        );
        let (parent_id, parent_name) = resolve_ultimate_parent(&self.snapshot, id.as_deref());
        record.ultimate_parent_unique_ide = parent_id;
        record.ultimate_parent_legal_enti = parent_name;
        record.officers = resolve_exec_comp(&self.snapshot, id.as_deref());
    }
}

impl Derivation for FpdsDerivation {
    type Record = FpdsRecord;

    fn name(&self) -> &'static str {
        "FpdsDerivation"
    }

    fn record_id_key(&self) -> &'static str {
        FPDS_RECORD_ID_KEY
    }

    fn derive(&self, record: &mut FpdsRecord, ctx: &RecordContext) {
        self.agencies(record, ctx);
        self.locations(record);
        self.recipient(record);

        record.business_categories = Some(fpds_business_categories(&record.flags));
        record.detached_award_proc_unique = Some(fpds_transaction_key(record, self.atom));
        record.unique_award_key = Some(fpds_award_key(record, self.atom));
        record.updated_at = Some(self.clock.now());
    }
}
