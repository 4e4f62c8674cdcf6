//! Country/continent graph used by the continent fallback tier.

use std::collections::{BTreeMap, HashMap, HashSet};

/// Country → continent mapping plus its inverse, continent → countries.
///
/// Built once per snapshot; the redirect map overrides entries of the base
/// table (and may introduce countries the table does not know).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContinentGraph {
    country_continent: HashMap<String, String>,
    continent_countries: HashMap<String, Vec<String>>,
}

impl ContinentGraph {
    /// Builds the graph from `table`, applying `redirects` on top.
    ///
    /// Country order within a continent follows the table, with countries
    /// only present in the redirect map appended in key order.
    pub fn build(table: &[(String, String)], redirects: &BTreeMap<String, String>) -> Self {
        let mut order: Vec<String> = Vec::with_capacity(table.len());
        let mut country_continent: HashMap<String, String> = HashMap::with_capacity(table.len());

        for (country, continent) in table {
            let country = country.to_uppercase();
            if country_continent
                .insert(country.clone(), continent.to_uppercase())
                .is_none()
            {
                order.push(country);
            }
        }
        for (country, continent) in redirects {
            let country = country.to_uppercase();
            if country_continent
                .insert(country.clone(), continent.to_uppercase())
                .is_none()
            {
                order.push(country);
            }
        }

        let mut continent_countries: HashMap<String, Vec<String>> = HashMap::new();
        for country in order {
            if let Some(continent) = country_continent.get(&country) {
                continent_countries
                    .entry(continent.clone())
                    .or_default()
                    .push(country);
            }
        }

        Self {
            country_continent,
            continent_countries,
        }
    }

    /// Continent code for `country`.
    pub fn continent_of(&self, country: &str) -> Option<&str> {
        self.country_continent
            .get(&country.to_uppercase())
            .map(String::as_str)
    }

    /// Countries on `continent`, in table order.
    pub fn countries_on(&self, continent: &str) -> &[String] {
        self.continent_countries
            .get(continent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of countries known to the graph.
    pub fn len(&self) -> usize {
        self.country_continent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.country_continent.is_empty()
    }

    /// For each requested country, every country on its continent except the
    /// client's own, concatenated and deduplicated in first-seen order.
    ///
    /// Unknown requested countries contribute nothing.
    pub fn same_continent_countries(
        &self,
        client_country: Option<&str>,
        requested: &[String],
    ) -> Vec<String> {
        let client_country = client_country.map(str::to_uppercase);
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for requested_country in requested {
            let Some(continent) = self.continent_of(requested_country) else {
                continue;
            };
            for country in self.countries_on(continent) {
                if client_country.as_deref() == Some(country.as_str()) {
                    continue;
                }
                if seen.insert(country.clone()) {
                    result.push(country.clone());
                }
            }
        }
        result
    }
}
