use sha1::{Digest, Sha1};

use crate::constants::FINGERPRINT_SEPARATOR;
use crate::record::MatchRecord;

/// Content hash over every externally visible field of `record`.
///
/// Field order is fixed; changing it invalidates every stored fingerprint
/// and causes one full rewrite on the next run.
pub fn fingerprint(record: &MatchRecord) -> String {
    let start = record.start.to_rfc3339();
    let end = record.end.map(|e| e.to_rfc3339()).unwrap_or_default();

    let fields = [
        record.uid.as_str(),
        record.display_title.as_str(),
        record.summary.as_str(),
        record.venue.as_str(),
        start.as_str(),
        end.as_str(),
        record.tournament.as_str(),
        record.round.as_str(),
        record.status_kind.label(),
        record.status_certainty.label(),
        record.home.as_str(),
        record.away.as_str(),
        record.matchup.as_str(),
        record.score.as_str(),
        record.source_url.as_str(),
        record.match_type.as_str(),
    ];

    hex::encode(Sha1::digest(fields.join(FINGERPRINT_SEPARATOR).as_bytes()))
}
