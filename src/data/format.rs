/// Display magnitude tiers, applied after zero, one and two divisions by 1000.
const UNITS: [&str; 2] = ["", "mil"];
const LAST_UNIT: &str = "milhões";

/// Shorten a metric for display: `1500 → "1.50 mil"`, `999 → "999.00"`,
/// `2_500_000` with prefix `"R$"` → `"R$ 2.50 milhões"`.
pub fn format_number(value: f64, prefix: &str) -> String {
    let mut value = value;
    for unit in UNITS {
        if value < 1000.0 {
            return compose(prefix, value, unit);
        }
        value /= 1000.0;
    }
    compose(prefix, value, LAST_UNIT)
}

fn compose(prefix: &str, value: f64, unit: &str) -> String {
    let number = format!("{value:.2}");
    [prefix, number.as_str(), unit]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Round to cents, as revenue metrics are shown.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_tier_is_not_divided() {
        assert_eq!(format_number(999.0, ""), "999.00");
        assert_eq!(format_number(0.0, ""), "0.00");
    }

    #[test]
    fn thousand_tier() {
        assert_eq!(format_number(1500.0, ""), "1.50 mil");
        assert_eq!(format_number(1000.0, ""), "1.00 mil");
    }

    #[test]
    fn million_tier_with_prefix() {
        assert_eq!(format_number(2_500_000.0, "R$"), "R$ 2.50 milhões");
        assert_eq!(format_number(1_234_567_890.0, "R$"), "R$ 1234.57 milhões");
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round2(1234.5678), 1234.57);
        assert_eq!(format_number(round2(12.345_1), "R$"), "R$ 12.35");
    }
}
