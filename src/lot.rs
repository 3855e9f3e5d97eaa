//! Parking lots and the grouping of observations into per-lot series.
use crate::id::define_id_type;
use crate::observation::Observation;
use indexmap::IndexMap;

define_id_type! {LotID}

/// Observations for each lot, with lots in ascending order of ID.
///
/// Each series is sorted by timestamp.
pub type LotSeriesMap = IndexMap<LotID, Vec<Observation>>;

/// Group observations by lot and sort each lot's series by timestamp.
///
/// Lots are sorted by ID. The timestamp sort is stable, so observations with the same timestamp
/// keep their input order.
pub fn group_by_lot<I>(observations: I) -> LotSeriesMap
where
    I: IntoIterator<Item = Observation>,
{
    let mut map = LotSeriesMap::new();
    for observation in observations {
        map.entry(observation.lot_id.clone())
            .or_default()
            .push(observation);
    }

    map.sort_unstable_keys();
    for series in map.values_mut() {
        series.sort_by_key(|observation| observation.timestamp);
    }

    map
}
