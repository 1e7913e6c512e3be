//! Assistance (FABS) derivation pipeline
//!
//! # Step order
//! 1. Null every purely derived field
//! 2. Deletions skip straight to the row-state step
//! 3. Total funding, CFDA title, awarding and funding agency
//! 4. Place-of-performance state and location
//! 5. Recipient location (reads the place-of-performance district)
//! 6. Office back-fill, re-resolving any role that received an office
//! 7. Recipient city code, country names, PII-redacted copy, ZIP split, scope
//! 8. Ultimate parent and executive compensation
//! 9. Labels, business categories, unique keys
//! 10. `is_active` and `modified_at`

use super::Derivation;
use crate::models::fields::present;
use crate::models::{FabsRecord, RecordContext, RecordType};
use crate::resolvers::agency::{resolve_agency, AgencyFieldsMut, AgencyRole};
use crate::resolvers::business_categories::fabs_business_categories;
use crate::resolvers::cfda::resolve_cfda_title;
use crate::resolvers::geo::{country_name, split_zip};
use crate::resolvers::labels::apply_labels;
use crate::resolvers::legal_entity::{resolve_legal_entity_city_code, resolve_legal_entity_location};
use crate::resolvers::office::backfill_offices;
use crate::resolvers::pii::copy_recipient_location;
use crate::resolvers::ppop::{derive_scope, resolve_ppop_location, PlaceCode, MULTI_STATE_NAME};
use crate::resolvers::recipient::{recipient_id, resolve_exec_comp, resolve_ultimate_parent};
use crate::resolvers::unique_keys::{fabs_award_key, fabs_transaction_key};
use crate::sink::DerivationSink;
use crate::snapshot::ReferenceSnapshot;
use broker_common::Clock;
use std::sync::Arc;
use tracing::trace;

/// Record-identifier column in assistance submissions
pub const FABS_RECORD_ID_KEY: &str = "row_number";

/// Assistance derivation pipeline
#[derive(Clone)]
pub struct FabsDerivation {
    snapshot: Arc<ReferenceSnapshot>,
    sink: Arc<dyn DerivationSink>,
    clock: Arc<dyn Clock>,
}

impl FabsDerivation {
    pub fn new(
        snapshot: Arc<ReferenceSnapshot>,
        sink: Arc<dyn DerivationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            snapshot,
            sink,
            clock,
        }
    }

    fn resolve_role(&self, record: &mut FabsRecord, role: AgencyRole, ctx: &RecordContext) {
        let fields = match role {
            AgencyRole::Awarding => AgencyFieldsMut {
                agency_code: &mut record.awarding_agency_code,
                agency_name: &mut record.awarding_agency_name,
                sub_tier_code: &mut record.awarding_sub_tier_agency_c,
                sub_tier_name: &mut record.awarding_sub_tier_agency_n,
                office_code: &record.awarding_office_code,
                office_name: &mut record.awarding_office_name,
            },
            AgencyRole::Funding => AgencyFieldsMut {
                agency_code: &mut record.funding_agency_code,
                agency_name: &mut record.funding_agency_name,
                sub_tier_code: &mut record.funding_sub_tier_agency_co,
                sub_tier_name: &mut record.funding_sub_tier_agency_na,
                office_code: &record.funding_office_code,
                office_name: &mut record.funding_office_name,
            },
        };
        resolve_agency(&self.snapshot, role, fields, ctx, self.sink.as_ref());
    }

    fn place_of_performance_state(&self, record: &mut FabsRecord, place: Option<&PlaceCode>) {
        match place {
            Some(PlaceCode::MultiState { .. }) => {
                record.place_of_perform_state_nam = Some(MULTI_STATE_NAME.to_string());
            }
            Some(code) => {
                if let Some(state) = code.state() {
                    if let Some(name) = self.snapshot.state_name(state) {
                        record.place_of_perfor_state_code = Some(state.to_string());
                        record.place_of_perform_state_nam = Some(name.to_string());
                    }
                }
            }
            None => {}
        }
    }

    fn place_of_performance_location(&self, record: &mut FabsRecord, place: Option<&PlaceCode>) {
        let location = resolve_ppop_location(
            &self.snapshot,
            place,
            present(&record.place_of_performance_zip4a),
            present(&record.place_of_performance_congr),
        );
        record.place_of_performance_city = location.city_name;
        record.place_of_perform_county_co = location.county_code;
        record.place_of_perform_county_na = location.county_name;
        if location.congressional_district.is_some() {
            record.place_of_performance_congr = location.congressional_district;
        }
    }

    fn country_names(&self, record: &mut FabsRecord) {
        if present(&record.legal_entity_country_name).is_none() {
            record.legal_entity_country_name = present(&record.legal_entity_country_code)
                .and_then(|code| country_name(&self.snapshot, code));
        }
        record.place_of_perform_country_n = present(&record.place_of_perform_country_c)
            .and_then(|code| country_name(&self.snapshot, code));
    }

    fn recipient(&self, record: &mut FabsRecord) {
        let id = recipient_id(&record.uei, &record.awardee_or_recipient_uniqu);
        let (parent_id, parent_name) = resolve_ultimate_parent(&self.snapshot, id.as_deref());
        record.ultimate_parent_unique_ide = parent_id;
        record.ultimate_parent_legal_enti = parent_name;
        record.officers = resolve_exec_comp(&self.snapshot, id.as_deref());
    }

    fn derive_active(&self, record: &mut FabsRecord, ctx: &RecordContext) {
        record.total_funding_amount = Some(
            record.federal_action_obligation.unwrap_or(0.0)
                + record.non_federal_funding_amount.unwrap_or(0.0),
        );
        record.cfda_title =
            resolve_cfda_title(&self.snapshot, &record.cfda_number, ctx, self.sink.as_ref());

        self.resolve_role(record, AgencyRole::Awarding, ctx);
        self.resolve_role(record, AgencyRole::Funding, ctx);

        let place = present(&record.place_of_performance_code).and_then(PlaceCode::parse);
        self.place_of_performance_state(record, place.as_ref());
        self.place_of_performance_location(record, place.as_ref());

        resolve_legal_entity_location(&self.snapshot, record, place.as_ref());

        let filled = backfill_offices(&self.snapshot, record);
        if filled.any() {
            trace!(record_id = %ctx.record_id, "Office codes back-filled from first published transaction");
        }
        if filled.awarding {
            self.resolve_role(record, AgencyRole::Awarding, ctx);
        }
        if filled.funding {
            self.resolve_role(record, AgencyRole::Funding, ctx);
        }

        resolve_legal_entity_city_code(&self.snapshot, record);
        self.country_names(record);
        if record.record_type() == Some(RecordType::PiiRedacted) {
            copy_recipient_location(record);
        }
        split_zip(
            &record.place_of_performance_zip4a,
            &mut record.place_of_performance_zip5,
            &mut record.place_of_perform_zip_last4,
        );

        let final_place = present(&record.place_of_performance_code).and_then(PlaceCode::parse);
        record.place_of_performance_scope = derive_scope(
            final_place.as_ref(),
            present(&record.place_of_performance_zip4a),
            present(&record.place_of_performance_zip5).is_some(),
        )
        .map(str::to_string);

        self.recipient(record);

        apply_labels(record);
        record.business_categories = Some(fabs_business_categories(&record.business_types));
        record.afa_generated_unique = Some(fabs_transaction_key(record));
        record.unique_award_key = Some(fabs_award_key(record));
    }
}

impl Derivation for FabsDerivation {
    type Record = FabsRecord;

    fn name(&self) -> &'static str {
        "FabsDerivation"
    }

    fn record_id_key(&self) -> &'static str {
        FABS_RECORD_ID_KEY
    }

    fn derive(&self, record: &mut FabsRecord, ctx: &RecordContext) {
        record.clear_derived();

        let deleted = record.is_delete();
        if deleted {
            trace!(record_id = %ctx.record_id, "Delete record, skipping derivations");
        } else {
            self.derive_active(record, ctx);
        }

        record.is_active = !deleted;
        record.modified_at = Some(self.clock.now());
    }
}
