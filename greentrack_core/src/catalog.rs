//! Display catalog for the built-in metric types.
//!
//! Labels and units match what the backend's metric choices are called in
//! the product.

use crate::types::MetricType;
use once_cell::sync::Lazy;

/// Display metadata for one metric type
#[derive(Clone, Debug)]
pub struct MetricInfo {
    pub metric: MetricType,
    pub label: &'static str,
    pub unit: &'static str,
    pub icon: &'static str,
}

/// Cached catalog - built once and reused across all operations
static CATALOG: Lazy<Vec<MetricInfo>> = Lazy::new(build_catalog);

fn build_catalog() -> Vec<MetricInfo> {
    vec![
        MetricInfo {
            metric: MetricType::Carbon,
            label: "Carbon Footprint",
            unit: "kg CO2",
            icon: "🌱",
        },
        MetricInfo {
            metric: MetricType::Water,
            label: "Water Usage",
            unit: "L",
            icon: "💧",
        },
        MetricInfo {
            metric: MetricType::Energy,
            label: "Energy Consumption",
            unit: "kWh",
            icon: "⚡",
        },
        MetricInfo {
            metric: MetricType::Digital,
            label: "Digital Usage",
            unit: "hours",
            icon: "💻",
        },
    ]
}

/// All metrics, in display order
pub fn all_metrics() -> &'static [MetricInfo] {
    &CATALOG
}

/// Display metadata for a single metric
pub fn metric_info(metric: MetricType) -> &'static MetricInfo {
    CATALOG
        .iter()
        .find(|info| info.metric == metric)
        .expect("every metric type has catalog metadata")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_metric() {
        for metric in MetricType::ALL {
            let info = metric_info(metric);
            assert_eq!(info.metric, metric);
            assert!(!info.label.is_empty());
            assert!(!info.unit.is_empty());
        }
        assert_eq!(all_metrics().len(), MetricType::ALL.len());
    }

    #[test]
    fn test_carbon_label_and_unit() {
        let info = metric_info(MetricType::Carbon);
        assert_eq!(info.label, "Carbon Footprint");
        assert_eq!(info.unit, "kg CO2");
    }
}
