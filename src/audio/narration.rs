//! Narration text building.

use crate::i18n::{keys, Phrasebook};
use crate::poi::RankedPoi;

/// Separator placed between narrated sentences.
pub const SENTENCE_SEPARATOR: &str = ". ";

/// Distance for speech: whole meters below 1 km, kilometers with one decimal above.
pub fn format_distance(distance_meters: f64, phrases: &Phrasebook) -> String {
    let distance_meters = distance_meters.max(0.0);
    if distance_meters < 1000.0 {
        let value = (distance_meters as u64).to_string();
        phrases.phrase_with_args(keys::METERS, &[("value", &value)])
    } else {
        let value = format!("{:.1}", distance_meters / 1000.0);
        phrases.phrase_with_args(keys::KILOMETERS, &[("value", &value)])
    }
}

/// Short distance label for displays ("27m", "1.2km").
pub fn format_compact_distance(distance_meters: f64) -> String {
    let distance_meters = distance_meters.max(0.0);
    if distance_meters < 1000.0 {
        format!("{}m", distance_meters as u64)
    } else {
        format!("{:.1}km", distance_meters / 1000.0)
    }
}

/// One clause: "<category> <name> at <distance>".
pub fn describe_poi(poi: &RankedPoi, phrases: &Phrasebook) -> String {
    let language = phrases.language();
    let distance = format_distance(poi.distance_meters, phrases);
    phrases.phrase_with_args(
        keys::CLAUSE,
        &[
            ("category", poi.category().label(language)),
            ("name", poi.candidate.display_name(language)),
            ("distance", &distance),
        ],
    )
}

/// Full utterance for a ranked list, in ranked order.
///
/// An empty list yields the fixed "nothing nearby" phrase.
pub fn compose_announcement(pois: &[RankedPoi], phrases: &Phrasebook) -> String {
    if pois.is_empty() {
        return phrases.phrase(keys::NOTHING_NEARBY);
    }

    std::iter::once(phrases.phrase(keys::LEAD_IN))
        .chain(pois.iter().map(|poi| describe_poi(poi, phrases)))
        .collect::<Vec<_>>()
        .join(SENTENCE_SEPARATOR)
}
