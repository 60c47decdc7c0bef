/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use insight_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Handle the sign separately so the thousands grouping works on the
    // absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Round to the requested decimal places.
    // Add a tiny epsilon (half ULP at the target precision) before rounding
    // to avoid IEEE 754 binary-representation issues at exact midpoints.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    // Build the thousands-separated integer portion.
    let int_str = integer_part.to_string();
    let grouped = group_thousands(&int_str);

    let result = if decimals == 0 {
        grouped
    } else {
        // Format the fractional part to the exact number of decimals.
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50". Strip the leading "0".
        let decimal_digits = &frac_str[1..]; // ".50"
        format!("{}{}", grouped, decimal_digits)
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a count with thousands separators.
///
/// # Examples
///
/// ```
/// use insight_core::formatting::format_count;
///
/// assert_eq!(format_count(64000), "64,000");
/// assert_eq!(format_count(42), "42");
/// ```
pub fn format_count(count: u64) -> String {
    group_thousands(&count.to_string())
}

/// Format a monetary amount as a USD string with two decimal places and
/// thousands separators. Non-finite amounts (an average over zero values)
/// render as `"n/a"`.
///
/// # Examples
///
/// ```
/// use insight_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1234.56),  "$1,234.56");
/// assert_eq!(format_currency(0.0),      "$0.00");
/// assert_eq!(format_currency(-9.99),    "$-9.99");
/// assert_eq!(format_currency(f64::NAN), "n/a");
/// ```
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "n/a".to_string();
    }
    if amount < 0.0 {
        format!("$-{}", format_number(amount.abs(), 2))
    } else {
        format!("${}", format_number(amount, 2))
    }
}

/// Format a rate in `[0, 1]` as a percentage with two decimal places.
/// Non-finite rates render as `"n/a"`.
///
/// # Examples
///
/// ```
/// use insight_core::formatting::format_percent;
///
/// assert_eq!(format_percent(0.2),      "20.00%");
/// assert_eq!(format_percent(0.09031),  "9.03%");
/// assert_eq!(format_percent(f64::NAN), "n/a");
/// ```
pub fn format_percent(rate: f64) -> String {
    if !rate.is_finite() {
        return "n/a".to_string();
    }
    format!("{:.2}%", rate * 100.0)
}

/// Format a p-value with four decimal places, the precision the comparison
/// table is read at. Non-finite p-values (undefined tests) render as `"n/a"`.
///
/// # Examples
///
/// ```
/// use insight_core::formatting::format_p_value;
///
/// assert_eq!(format_p_value(0.03174), "0.0317");
/// assert_eq!(format_p_value(1.0),     "1.0000");
/// assert_eq!(format_p_value(f64::NAN), "n/a");
/// ```
pub fn format_p_value(p: f64) -> String {
    if !p.is_finite() {
        return "n/a".to_string();
    }
    format!("{:.4}", p)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
