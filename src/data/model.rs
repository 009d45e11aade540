use std::collections::HashSet;

use crate::scale;

// ---------------------------------------------------------------------------
// Numeric coercion of text cells
// ---------------------------------------------------------------------------

/// Coerce a text cell to a number.
///
/// Blank text becomes `0.0`; anything that is not a number becomes `NaN`.
/// A `NaN` never fails the load, it only drops out of extents and drawing.
pub fn coerce_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Coerce a text cell to a calendar year. Blank and non-integral values are rejected.
pub fn coerce_year(s: &str) -> Option<i32> {
    if s.trim().is_empty() {
        return None;
    }
    year_from_f64(coerce_number(s))
}

pub fn year_from_f64(v: f64) -> Option<i32> {
    if v.is_finite() && v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the input table
// ---------------------------------------------------------------------------

/// A single (country, year, emissions) record.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    /// `None` when the year cell was not an integer.
    pub year: Option<i32>,
    /// `NaN` when the emissions cell was not numeric.
    pub greenhouse_gas_emissions: f64,
}

impl Observation {
    pub fn new(country: impl Into<String>, year: Option<i32>, emissions: f64) -> Self {
        Self {
            country: country.into(),
            year,
            greenhouse_gas_emissions: emissions,
        }
    }

    /// Plot coordinates, if both fields are drawable.
    pub fn point(&self) -> Option<[f64; 2]> {
        let year = self.year?;
        self.greenhouse_gas_emissions
            .is_finite()
            .then(|| [year as f64, self.greenhouse_gas_emissions])
    }
}

// ---------------------------------------------------------------------------
// EmissionsDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Built once at load time and never mutated.
#[derive(Debug, Clone, Default)]
pub struct EmissionsDataset {
    observations: Vec<Observation>,
    /// Distinct country names in first-seen order.
    countries: Vec<String>,
}

impl EmissionsDataset {
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut countries = Vec::new();
        for obs in &observations {
            if seen.insert(obs.country.as_str()) {
                countries.push(obs.country.clone());
            }
        }
        EmissionsDataset {
            observations,
            countries,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn get(&self, idx: usize) -> Option<&Observation> {
        self.observations.get(idx)
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Min/max year over every observation.
    pub fn year_extent(&self) -> Option<(f64, f64)> {
        scale::extent(self.observations.iter().filter_map(|o| o.year.map(f64::from)))
    }

    /// Largest emissions value over every observation.
    pub fn emissions_max(&self) -> Option<f64> {
        scale::extent(self.observations.iter().map(|o| o.greenhouse_gas_emissions))
            .map(|(_, max)| max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(country: &str, year: i32, v: f64) -> Observation {
        Observation::new(country, Some(year), v)
    }

    #[test]
    fn coerce_number_mirrors_text_coercion() {
        assert_eq!(coerce_number("12.5"), 12.5);
        assert_eq!(coerce_number("  7 "), 7.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("   "), 0.0);
        assert!(coerce_number("n/a").is_nan());
    }

    #[test]
    fn coerce_year_rejects_fractional_and_garbage() {
        assert_eq!(coerce_year("1990"), Some(1990));
        assert_eq!(coerce_year("1990.0"), Some(1990));
        assert_eq!(coerce_year("1990.5"), None);
        assert_eq!(coerce_year("abc"), None);
        assert_eq!(coerce_year(""), None);
    }

    #[test]
    fn countries_are_unique_in_first_seen_order() {
        let ds = EmissionsDataset::from_observations(vec![
            obs("Peru", 2000, 1.0),
            obs("Chad", 2000, 2.0),
            obs("Peru", 2001, 3.0),
            obs("Albania", 2000, 4.0),
            obs("Chad", 2001, 5.0),
        ]);
        assert_eq!(ds.countries(), ["Peru", "Chad", "Albania"]);
        assert_eq!(ds.len(), 5);
    }

    #[test]
    fn extents_skip_non_numeric_cells() {
        let ds = EmissionsDataset::from_observations(vec![
            obs("A", 1990, 4.0),
            Observation::new("A", None, f64::NAN),
            obs("B", 2010, 9.5),
        ]);
        assert_eq!(ds.year_extent(), Some((1990.0, 2010.0)));
        assert_eq!(ds.emissions_max(), Some(9.5));
    }

    #[test]
    fn point_requires_year_and_finite_value() {
        assert_eq!(obs("A", 2000, 3.0).point(), Some([2000.0, 3.0]));
        assert_eq!(obs("A", 2000, f64::NAN).point(), None);
        assert_eq!(Observation::new("A", None, 3.0).point(), None);
    }
}
