//! Price strings as rendered by the marketplace (`R$ 1.234,56`) to numbers and back.

/// Parses a Brazilian-formatted price. Anything that does not survive cleanup
/// as a finite number becomes `0.0`.
pub fn parse_price(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let cleaned = text
        .replace("R$", "")
        .replace('$', "")
        .replace('.', "")
        .replace(',', ".");

    match cleaned.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Renders `value` as `R$ 1.234,50`: dot thousands, comma decimals, two digits.
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.2}", value.abs());
    let (int_part, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("R$ {sign}{grouped},{cents}")
}
