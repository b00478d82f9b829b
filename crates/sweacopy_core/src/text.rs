/// Collapse every whitespace run into a single space and trim both ends.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Same as [`normalize`] but treats a missing value as empty.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

const MAX_FRACTION_DIGITS: usize = 3;

/// Re-render a numeric string with `,` digit grouping.
///
/// Existing separators are stripped first and blank input counts as zero.
/// Values that do not parse as a finite number are returned unchanged.
/// Fractions keep at most three digits, rounded half away from zero, with
/// trailing zeros dropped.
pub fn format_thousands(text: &str) -> String {
    let cleaned = text.replace(',', "");
    let trimmed = cleaned.trim();
    let value = if trimmed.is_empty() {
        0.0
    } else {
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => return text.to_string(),
        }
    };

    // Shortest round-trip decimal, never in exponent form.
    let shortest = value.to_string();
    let (sign, unsigned) = match shortest.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", shortest.as_str()),
    };
    let (integer, fraction) = round_fraction(unsigned);
    let fraction = fraction.trim_end_matches('0');

    let mut output = String::with_capacity(shortest.len() + integer.len() / 3 + 1);
    output.push_str(sign);
    output.push_str(&group_digits(&integer));
    if !fraction.is_empty() {
        output.push('.');
        output.push_str(fraction);
    }
    output
}

/// Split a plain decimal into integer and fraction digits, rounding the
/// fraction to `MAX_FRACTION_DIGITS` with ties going up.
fn round_fraction(unsigned: &str) -> (String, String) {
    let Some((integer, fraction)) = unsigned.split_once('.') else {
        return (unsigned.to_string(), String::new());
    };
    if fraction.len() <= MAX_FRACTION_DIGITS {
        return (integer.to_string(), fraction.to_string());
    }

    let round_up = fraction.as_bytes()[MAX_FRACTION_DIGITS] >= b'5';
    let mut digits = integer
        .bytes()
        .chain(fraction[..MAX_FRACTION_DIGITS].bytes())
        .collect::<Vec<_>>();
    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - MAX_FRACTION_DIGITS;
    let (integer, fraction) = digits.split_at(split);
    (
        String::from_utf8_lossy(integer).into_owned(),
        String::from_utf8_lossy(fraction).into_owned(),
    )
}

/// Parse the leading integer of `text`, ignoring whatever follows it.
///
/// Accepts an optional sign before the digits; returns `None` when no digit
/// leads the (trimmed) input. Values beyond `i64` saturate.
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .collect::<Vec<_>>();
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.iter().fold(0i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut output = String::with_capacity(len + len / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            output.push(',');
        }
        output.push(ch);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{format_thousands, normalize, normalize_opt, parse_int_prefix};

    #[test]
    fn normalize_collapses_whitespace_runs() {
        assert_eq!(normalize("  Alice \n\t 123  "), "Alice 123");
        assert_eq!(normalize("\u{a0}12,345\u{a0}kb "), "12,345 kb");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some(" a  b ")), "a b");
    }

    #[test]
    fn format_thousands_groups_digits() {
        assert_eq!(format_thousands("1234567"), "1,234,567");
        assert_eq!(format_thousands("12345"), "12,345");
        assert_eq!(format_thousands("678"), "678");
        assert_eq!(format_thousands("0"), "0");
        assert_eq!(format_thousands("1,2,3,4"), "1,234");
        assert_eq!(format_thousands("-9876543"), "-9,876,543");
    }

    #[test]
    fn format_thousands_keeps_up_to_three_fraction_digits() {
        assert_eq!(format_thousands("1234.5"), "1,234.5");
        assert_eq!(format_thousands("1234.56789"), "1,234.568");
        assert_eq!(format_thousands("1000.000"), "1,000");
        assert_eq!(format_thousands("0.0001"), "0");
    }

    #[test]
    fn format_thousands_rounds_ties_away_from_zero() {
        assert_eq!(format_thousands("0.0625"), "0.063");
        assert_eq!(format_thousands("2.0005"), "2.001");
        assert_eq!(format_thousands("-1.2345"), "-1.235");
        assert_eq!(format_thousands("999.9996"), "1,000");
        assert_eq!(format_thousands("999999.9995"), "1,000,000");
    }

    #[test]
    fn format_thousands_treats_blank_as_zero() {
        assert_eq!(format_thousands(""), "0");
        assert_eq!(format_thousands("   "), "0");
        assert_eq!(format_thousands(","), "0");
    }

    #[test]
    fn format_thousands_returns_unparseable_input_unchanged() {
        assert_eq!(format_thousands("abc"), "abc");
        assert_eq!(format_thousands("12kb"), "12kb");
        assert_eq!(format_thousands("inf"), "inf");
        assert_eq!(format_thousands("NaN"), "NaN");
    }

    #[test]
    fn parse_int_prefix_reads_leading_digits() {
        assert_eq!(parse_int_prefix("12"), Some(12));
        assert_eq!(parse_int_prefix(" 7 pages"), Some(7));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("next"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
    }
}
