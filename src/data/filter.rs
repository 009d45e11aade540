use super::model::EmissionsDataset;

// ---------------------------------------------------------------------------
// Country view: which observations are shown for a selection
// ---------------------------------------------------------------------------

/// Return indices of observations shown for `country`.
///
/// An observation passes when:
/// * its country equals `country` exactly (no trimming, case-sensitive)
/// * its emissions value is not zero (`NaN` is not zero, so it passes)
pub fn country_view(dataset: &EmissionsDataset, country: &str) -> Vec<usize> {
    dataset
        .observations()
        .iter()
        .enumerate()
        .filter(|(_, obs)| obs.country == country && obs.greenhouse_gas_emissions != 0.0)
        .map(|(i, _)| i)
        .collect()
}
