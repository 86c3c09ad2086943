/// Dollar amount with thousands separators: $1,234.56, -$500.00
pub fn money(val: f64) -> String {
    let fixed = format!("{:.2}", val.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits = whole.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*d as char);
    }

    let sign = if val < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Hours with two decimals: 80.00
pub fn hours(val: f64) -> String {
    format!("{val:.2}")
}
