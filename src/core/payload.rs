/// Collector payload parsing
///
/// The remote agent prints a single line:
///
/// ```text
/// name|cpu|ram|temp|disk|vm_count|ct_count|uptime[|...]
/// ```
///
/// `cpu` may use a decimal comma and is reported in tenths of the displayed
/// percentage. Extra trailing fields are ignored.

use serde::Serialize;
use std::str::FromStr;

use crate::core::error::ParseError;
use crate::utils::{CPU_SCALE, PAYLOAD_DELIMITER, PAYLOAD_MIN_FIELDS};

/// Metrics of one successful poll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMetrics {
    pub name: String,
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub temp_celsius: i64,
    pub disk_percent: i64,
    pub vm_count: i64,
    pub ct_count: i64,
    pub uptime: String,
}

pub fn parse_payload(raw: &str) -> Result<NodeMetrics, ParseError> {
    let fields: Vec<&str> = raw.split(PAYLOAD_DELIMITER).collect();
    if fields.len() < PAYLOAD_MIN_FIELDS {
        return Err(ParseError::TooFewFields {
            expected: PAYLOAD_MIN_FIELDS,
            found: fields.len(),
        });
    }

    let cpu_raw = fields[1].replace(',', ".");
    let cpu: f64 = parse_number("cpu", &cpu_raw)?;

    Ok(NodeMetrics {
        name: fields[0].to_string(),
        cpu_percent: cpu * CPU_SCALE,
        ram_percent: parse_number("ram", fields[2])?,
        temp_celsius: parse_number("temp", fields[3])?,
        disk_percent: parse_number("disk", fields[4])?,
        vm_count: parse_number("vm_count", fields[5])?,
        ct_count: parse_number("ct_count", fields[6])?,
        uptime: fields[7].to_string(),
    })
}

fn parse_number<T: FromStr>(field: &'static str, value: &str) -> Result<T, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_comma_and_cpu_scaling() {
        let metrics = parse_payload("web1|4,5|62|55|40|2|3|14d 3h").unwrap();

        assert_eq!(metrics.name, "web1");
        assert!((metrics.cpu_percent - 45.0).abs() < 1e-9);
        assert_eq!(metrics.ram_percent, 62.0);
        assert_eq!(metrics.temp_celsius, 55);
        assert_eq!(metrics.disk_percent, 40);
        assert_eq!(metrics.vm_count, 2);
        assert_eq!(metrics.ct_count, 3);
        assert_eq!(metrics.uptime, "14d 3h");
    }

    #[test]
    fn test_parse_decimal_point() {
        let metrics = parse_payload("pve2|0.37|41.5|48|12|0|7|2d 1h").unwrap();
        assert!((metrics.cpu_percent - 3.7).abs() < 1e-9);
        assert_eq!(metrics.ram_percent, 41.5);
    }

    #[test]
    fn test_scaled_cpu_may_exceed_hundred() {
        let metrics = parse_payload("busy|13|10|40|10|0|0|1h").unwrap();
        assert_eq!(metrics.cpu_percent, 130.0);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let metrics = parse_payload("web1|1|2|3|4|5|6|up 3 days|extra|more").unwrap();
        assert_eq!(metrics.uptime, "up 3 days");
        assert_eq!(metrics.ct_count, 6);
    }

    #[test]
    fn test_too_few_fields() {
        let err = parse_payload("web1|4,5|62").unwrap_err();
        assert_eq!(err, ParseError::TooFewFields { expected: 8, found: 3 });

        assert!(parse_payload("").is_err());
    }

    #[test]
    fn test_non_numeric_fields() {
        let err = parse_payload("web1|high|62|55|40|2|3|1d").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { field: "cpu", .. }));

        // Only cpu accepts a decimal comma
        let err = parse_payload("web1|4|62,5|55|40|2|3|1d").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { field: "ram", .. }));

        let err = parse_payload("web1|4|62|55.5|40|2|3|1d").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { field: "temp", .. }));

        let err = parse_payload("web1|4|62|55|40|two|3|1d").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { field: "vm_count", .. }));
    }
}
