//! Presentation formatting for terminal output

/// `$1.23B`, `$4.56M`, `$789K`, `$0.000123`
pub fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.0}K", value / 1e3)
    } else {
        format!("${:.6}", value)
    }
}

/// Like [`format_usd`] with one decimal for list rows and cents below 1K
pub fn format_usd_compact(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    if value >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.0}K", value / 1e3)
    } else {
        format!("${:.2}", value)
    }
}

/// Price string as reported by the API, formatted when it parses
pub fn format_price(price_usd: Option<&str>) -> String {
    match price_usd.and_then(|p| p.trim().parse::<f64>().ok()) {
        Some(price) => format_usd(price),
        None => "N/A".to_string(),
    }
}

/// `+12.50%` / `-3.10%`
pub fn format_pct(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, value)
}

/// `0x1234...abcd`; short input is returned unchanged
pub fn truncate_address(address: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= head + tail + 3 {
        return address.to_string();
    }
    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - tail..].iter().collect();
    format!("{}...{}", start, end)
}
