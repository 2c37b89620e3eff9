use crate::config::AppConfig;
use crate::model::{Observation, PriceRecord};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Normalized input for the fit engine plus the authority → region lookup.
pub struct Normalized {
    pub observations: Vec<Observation>,
    pub regions: HashMap<String, String>,
}

pub fn normalize_all(records: &[PriceRecord], cfg: &AppConfig) -> Normalized {
    let mut observations = Vec::with_capacity(records.len());
    let mut regions: HashMap<String, String> = HashMap::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(obs) = normalize_record(record, cfg) else {
            dropped += 1;
            continue;
        };

        let region = record.region.trim();
        if let Some(known) = regions.get(&obs.group_key) {
            if known != region {
                warn!(
                    "{} listed under both '{}' and '{}', keeping the first",
                    obs.group_key, known, region
                );
            }
        } else {
            regions.insert(obs.group_key.clone(), region.to_string());
        }
        observations.push(obs);
    }

    debug!(
        "Normalized {} records, dropped {} outside the year window",
        observations.len(),
        dropped
    );
    Normalized {
        observations,
        regions,
    }
}

fn normalize_record(record: &PriceRecord, cfg: &AppConfig) -> Option<Observation> {
    let group_key = record.local_authority.trim();
    if group_key.is_empty() || !cfg.in_window(record.year) {
        return None;
    }
    Some(Observation {
        group_key: group_key.to_string(),
        time: record.year - cfg.base_year,
        value: record.median_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn record(region: &str, la: &str, year: i32, price: f64) -> PriceRecord {
        PriceRecord {
            region: region.to_string(),
            local_authority: la.to_string(),
            year,
            median_price: price,
        }
    }

    #[test]
    fn test_window_and_offsets() {
        let cfg = parse_config(r#"{ "source": "x", "base_year": 2008, "min_year": 2008, "max_year": 2018 }"#)
            .unwrap();
        let records = vec![
            record("London", " Camden ", 2007, 1.0),
            record("London", "Camden", 2008, 2.0),
            record("London", "Camden", 2013, 3.0),
            record("London", "Camden", 2019, 4.0),
        ];
        let normalized = normalize_all(&records, &cfg);
        let times: Vec<i32> = normalized.observations.iter().map(|o| o.time).collect();
        assert_eq!(times, vec![0, 5]);
        assert!(normalized.observations.iter().all(|o| o.group_key == "Camden"));
        assert_eq!(normalized.regions["Camden"], "London");
    }

    #[test]
    fn test_keeps_non_positive_prices_for_the_fit_engine() {
        let cfg = parse_config(r#"{ "source": "x" }"#).unwrap();
        let records = vec![record("Wales", "Cardiff", 2010, 0.0)];
        let normalized = normalize_all(&records, &cfg);
        assert_eq!(normalized.observations.len(), 1);
        assert_eq!(normalized.observations[0].value, 0.0);
    }

    #[test]
    fn test_blank_authority_dropped() {
        let cfg = parse_config(r#"{ "source": "x" }"#).unwrap();
        let normalized = normalize_all(&[record("Wales", "  ", 2010, 1.0)], &cfg);
        assert!(normalized.observations.is_empty());
    }
}
