//! Assistance listing (CFDA) titles

use crate::models::fields::present;
use crate::models::RecordContext;
use crate::sink::{DerivationEvent, DerivationSink, EventLevel};
use crate::snapshot::ReferenceSnapshot;

/// Title for a CFDA number; an unknown number is reported to the sink
pub fn resolve_cfda_title(
    snapshot: &ReferenceSnapshot,
    cfda_number: &Option<String>,
    ctx: &RecordContext,
    sink: &dyn DerivationSink,
) -> Option<String> {
    let number = present(cfda_number)?;
    match snapshot.cfda_title(number) {
        Some(title) => Some(title.to_string()),
        None => {
            sink.emit(DerivationEvent::new(
                EventLevel::Error,
                format!("CFDA title not found for CFDA number {}", number),
                ctx,
            ));
            None
        }
    }
}
