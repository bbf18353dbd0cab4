use std::collections::HashMap;

/// Per-country reference data consumed by the hard filter and scorer.
#[derive(Debug, Clone)]
pub struct CountryProfile {
    /// Expected round-trip price in USD; deals at or above this are not deals.
    pub threshold: f64,
    /// Destination appeal, 1 (most desirable) through 4 (default/niche)
    pub appeal_tier: u8,
    /// Months (1-12) where demand peaks for this destination
    pub peak_months: Vec<u32>,
}

impl CountryProfile {
    pub fn new(threshold: f64, appeal_tier: u8, peak_months: &[u32]) -> Self {
        Self {
            threshold,
            appeal_tier,
            peak_months: peak_months.to_vec(),
        }
    }
}

/// Static expected-price / appeal / seasonality tables.
/// Plain data so tests can swap in their own.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    countries: HashMap<String, CountryProfile>,
}

pub const DEFAULT_APPEAL_TIER: u8 = 4;

impl ReferenceTables {
    pub fn new(countries: HashMap<String, CountryProfile>) -> Self {
        Self { countries }
    }

    /// The table shipped with the pipeline. Thresholds are round-trip USD
    /// from US departure cities; peak months follow tourist seasons.
    pub fn builtin() -> Self {
        let mut countries = HashMap::new();
        let mut add = |name: &str, profile: CountryProfile| {
            countries.insert(name.to_string(), profile);
        };

        add("Japan", CountryProfile::new(900.0, 1, &[3, 4, 10, 11]));
        add("Italy", CountryProfile::new(780.0, 1, &[5, 6, 9, 10]));
        add("France", CountryProfile::new(750.0, 1, &[5, 6, 9]));
        add("Greece", CountryProfile::new(800.0, 1, &[5, 6, 9]));
        add("Spain", CountryProfile::new(700.0, 2, &[5, 6, 9, 10]));
        add("Portugal", CountryProfile::new(700.0, 2, &[6, 7, 9]));
        add("Iceland", CountryProfile::new(600.0, 2, &[6, 7, 8]));
        add("Ireland", CountryProfile::new(650.0, 2, &[5, 6, 7, 8, 9]));
        add("United Kingdom", CountryProfile::new(700.0, 2, &[5, 6, 7, 8, 9]));
        add("Thailand", CountryProfile::new(850.0, 2, &[11, 12, 1, 2]));
        add("Mexico", CountryProfile::new(450.0, 2, &[11, 12, 1, 2, 3]));
        add("Costa Rica", CountryProfile::new(550.0, 2, &[12, 1, 2, 3]));
        add("Netherlands", CountryProfile::new(700.0, 3, &[4, 5, 6, 7]));
        add("Germany", CountryProfile::new(700.0, 3, &[6, 7, 9, 12]));
        add("Croatia", CountryProfile::new(750.0, 3, &[6, 7, 8]));
        add("Morocco", CountryProfile::new(750.0, 3, &[3, 4, 10]));
        add("Vietnam", CountryProfile::new(900.0, 3, &[11, 12, 1, 2, 3]));
        add("Colombia", CountryProfile::new(550.0, 3, &[12, 1, 6, 7]));
        add("Peru", CountryProfile::new(700.0, 3, &[5, 6, 7, 8]));
        add("Brazil", CountryProfile::new(800.0, 3, &[12, 1, 2]));
        add("Canada", CountryProfile::new(400.0, 4, &[6, 7, 8]));

        Self { countries }
    }

    pub fn profile(&self, country: &str) -> Option<&CountryProfile> {
        self.countries.get(country)
    }

    pub fn threshold(&self, country: &str) -> Option<f64> {
        self.countries.get(country).map(|p| p.threshold)
    }

    /// Unknown countries fall back to the least desirable tier.
    pub fn appeal_tier(&self, country: &str) -> u8 {
        self.countries
            .get(country)
            .map(|p| p.appeal_tier)
            .unwrap_or(DEFAULT_APPEAL_TIER)
    }

    pub fn is_peak_month(&self, country: &str, month: u32) -> bool {
        self.countries
            .get(country)
            .map(|p| p.peak_months.contains(&month))
            .unwrap_or(false)
    }
}
