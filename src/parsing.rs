// Kubernetes resource quantities, converted to base units (cores, bytes).

const BINARY_UNITS: &[(&str, f64)] = &[
    ("Ki", 1024.0),
    ("Mi", 1_048_576.0),
    ("Gi", 1_073_741_824.0),
    ("Ti", 1_099_511_627_776.0),
    ("Pi", 1_125_899_906_842_624.0),
    ("Ei", 1_152_921_504_606_846_976.0),
];

// Divisors, so that e.g. 250m lands exactly on 0.25
const SUBUNITS: &[(&str, f64)] = &[("n", 1e9), ("u", 1e6), ("m", 1e3)];

const DECIMAL_UNITS: &[(&str, f64)] = &[
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

/// Parses a quantity such as `250m`, `1.5Gi`, `2` or `12e3` into a plain number.
/// Returns `None` when the string is not a valid quantity.
pub fn parse_quantity(q: &str) -> Option<f64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }

    let split = q
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-'))
        .unwrap_or(q.len());
    let (number, suffix) = q.split_at(split);
    let value = parse_number(number)?;

    scale(number, value, suffix).filter(|v| v.is_finite())
}

fn scale(number: &str, value: f64, suffix: &str) -> Option<f64> {
    if suffix.is_empty() {
        return Some(value);
    }

    for (suf, div) in SUBUNITS {
        if suffix == *suf {
            return Some(value / div);
        }
    }
    for (suf, mul) in BINARY_UNITS.iter().chain(DECIMAL_UNITS) {
        if suffix == *suf {
            return Some(value * mul);
        }
    }

    // Decimal exponent form, e.g. 1e3 or 5E-2. The float parser handles
    // exponents of any magnitude; overflow comes back as infinity.
    let exp = suffix.strip_prefix(['e', 'E'])?;
    exp.parse::<i32>().ok()?;
    format!("{}e{}", number, exp).parse::<f64>().ok()
}

fn parse_number(s: &str) -> Option<f64> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if digits.contains(['+', '-']) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Like [`parse_quantity`] but treats an unset quantity as zero.
pub fn quantity_or_zero(q: Option<&str>) -> Option<f64> {
    match q {
        Some(q) => parse_quantity(q),
        None => Some(0.0),
    }
}
