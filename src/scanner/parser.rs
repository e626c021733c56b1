use crate::models::SignatureData;

/// Minimum tab-separated fields for a scan line to produce a record.
const MIN_FIELDS: usize = 6;

/// Parses one scan line: `id\tcategory\tsubcategory\tname\tsignal\tdistance`.
///
/// Lines with too few fields or a blank identifier yield `None`.
pub fn parse_line(line: &str) -> Option<SignatureData> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < MIN_FIELDS {
        return None;
    }

    let id = parts[0].trim();
    if id.is_empty() {
        return None;
    }

    Some(SignatureData {
        id: id.to_string(),
        category: parts[1].trim().to_string(),
        subcategory: parts[2].trim().to_string(),
        name: parts[3].trim().to_string(),
        signal: parts[4].trim().to_string(),
        distance: parts[5].trim().to_string(),
        signal_strength: leading_number(parts[4]).unwrap_or(0.0),
    })
}

/// Parses a pasted block, keeping input order and skipping unusable lines.
pub fn parse_block(text: &str) -> Vec<SignatureData> {
    text.trim().split('\n').filter_map(parse_line).collect()
}

/// Longest floating-point prefix of `text` after leading whitespace,
/// e.g. `"10.2%"` -> 10.2.
pub fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().ok()
}

/// Numeric value of the first run of digits and dots in a distance, e.g.
/// `"~ 15.77 AU"` -> 15.77. Defaults to zero.
pub fn distance_value(distance: &str) -> f64 {
    let Some(start) = distance.find(|c: char| c.is_ascii_digit() || c == '.') else {
        return 0.0;
    };
    let run = &distance[start..];
    let len = run
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(run.len());

    leading_number(&run[..len]).unwrap_or(0.0)
}
