//! Deterministic text rendering of an [`ExtractedRecord`].
//!
//! The rendered block is sent with every plan and refinement call and replayed
//! across turns, so the same record must always yield the same bytes. Every
//! missing value renders as [`NOT_VISIBLE`].

use crate::record::{BrandMetrics, CompetitorMetrics, ExtractedRecord, PlatformData};
use serde_json::Number;

/// Marker for any value the record does not contain.
pub const NOT_VISIBLE: &str = "Not visible";

/// Platforms rendered first, in this order, with their display labels.
const KNOWN_PLATFORMS: [(&str, &str); 3] = [
    ("shopee", "Shopee"),
    ("lazada", "Lazada"),
    ("tiktok", "TikTok Shop"),
];

/// Renders the record as the data-context block.
///
/// # Examples
///
/// ```
/// use scaleplan_workflow::{parse_extraction, render_data_context};
///
/// let record = parse_extraction(r#"{"brand":{"name":"Acme"},"platform_data":{}}"#).unwrap();
/// let text = render_data_context(&record);
/// assert!(text.contains("BRAND: Acme"));
/// assert!(text.contains("No Shopee data provided."));
/// ```
pub fn render_data_context(record: &ExtractedRecord) -> String {
    let mut out = String::new();
    out.push_str("=== EXTRACTED DATA FROM SCREENSHOTS ===\n\n");

    let brand = record.brand();
    line(&mut out, "BRAND", or_absent(brand.name.as_deref()));
    line(&mut out, "CATEGORY", or_absent(brand.category.as_deref()));
    let competitors: Vec<&str> = record
        .competitors()
        .iter()
        .filter_map(|c| c.name.as_deref())
        .collect();
    if competitors.is_empty() {
        line(&mut out, "COMPETITORS", NOT_VISIBLE);
    } else {
        line(&mut out, "COMPETITORS", &competitors.join(", "));
    }
    if let Some(notes) = brand.visual_notes.as_deref() {
        line(&mut out, "VISUAL NOTES", notes);
    }
    out.push('\n');

    let platforms = record.platform_data();
    for (key, label) in KNOWN_PLATFORMS {
        render_platform(&mut out, label, platforms.get(key));
    }
    for (key, data) in platforms {
        if KNOWN_PLATFORMS.iter().any(|(known, _)| *known == key.as_str()) {
            continue;
        }
        render_platform(&mut out, &key.to_uppercase(), Some(data));
    }

    out.push_str("COMPETITIVE INSIGHTS:\n");
    if record.competitive_insights().is_empty() {
        out.push_str(&format!("- {}\n", NOT_VISIBLE));
    }
    for insight in record.competitive_insights() {
        out.push_str(&format!("- {}\n", insight));
    }
    out.push('\n');

    out.push_str("DATA QUALITY:\n");
    let quality = record.data_quality().as_ref();
    line(
        &mut out,
        "- Completeness",
        or_absent(quality.and_then(|q| q.completeness.as_deref())),
    );
    line(
        &mut out,
        "- Confidence Level",
        or_absent(quality.and_then(|q| q.confidence_level.as_deref())),
    );
    line(
        &mut out,
        "- Notes",
        or_absent(quality.and_then(|q| q.missing_data_notes.as_deref())),
    );
    out.push('\n');

    let pretty = serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string());
    out.push_str(&format!("RAW_JSON_SOURCE:\n```json\n{}\n```\n", pretty));
    out
}

fn render_platform(out: &mut String, label: &str, data: Option<&PlatformData>) {
    out.push_str(&format!("--- {} DATA ---\n", label.to_uppercase()));
    let Some(data) = data else {
        out.push_str(&format!("No {} data provided.\n\n", label));
        return;
    };

    out.push_str("Brand Metrics:\n");
    match data.brand_metrics.as_ref() {
        Some(metrics) => render_brand_metrics(out, metrics),
        None => out.push_str(&format!("- {}\n", NOT_VISIBLE)),
    }

    if let Some(competitor) = data.competitor_metrics.as_ref() {
        let name = or_absent(competitor.competitor_name.as_deref());
        out.push_str(&format!("\nCompetitor Metrics ({}):\n", name));
        render_competitor_metrics(out, competitor);
    }
    out.push('\n');
}

fn render_brand_metrics(out: &mut String, m: &BrandMetrics) {
    line(out, "- Shop Name", or_absent(m.shop_name.as_deref()));
    line(out, "- Followers", &count(m.followers.as_ref()));
    line(out, "- Reviews", &reviews(m.reviews_count.as_ref(), m.avg_rating.as_ref()));
    line(out, "- Shop Badge", or_absent(m.shop_badge.as_deref()));
    line(
        out,
        "- Average Final Price (Top 3 SKUs)",
        &price(m.pricing.as_ref().and_then(|p| p.average_final_price.as_ref())),
    );

    let promotions = m.promotions.as_ref();
    line(
        out,
        "- Active Vouchers",
        &count(promotions.and_then(|p| p.vouchers_active.as_ref())),
    );
    line(
        out,
        "- Voucher Examples",
        &list(promotions.map(|p| p.voucher_examples.as_slice())),
    );
    line(
        out,
        "- Other Promos",
        &list(promotions.map(|p| p.non_voucher_promos.as_slice())),
    );

    let videos = match m.videos() {
        Some(n) => format!("{} videos", group(n)),
        None => NOT_VISIBLE.to_string(),
    };
    line(out, "- Content", &videos);
    line(
        out,
        "- Live Sessions",
        &count(m.content.as_ref().and_then(|c| c.live_sessions_count.as_ref())),
    );
}

fn render_competitor_metrics(out: &mut String, m: &CompetitorMetrics) {
    line(out, "- Followers", &count(m.followers.as_ref()));
    line(out, "- Reviews", &reviews(m.reviews_count.as_ref(), m.avg_rating.as_ref()));
    line(
        out,
        "- Average Final Price",
        &price(m.pricing.as_ref().and_then(|p| p.average_final_price.as_ref())),
    );
    if m.vouchers_active.is_some() {
        line(out, "- Active Vouchers", &count(m.vouchers_active.as_ref()));
    }
    if m.videos_published.is_some() {
        line(out, "- Videos", &count(m.videos_published.as_ref()));
    }
    if m.live_sessions_count.is_some() {
        line(out, "- Live Sessions", &count(m.live_sessions_count.as_ref()));
    }
}

fn line(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("{}: {}\n", label, value));
}

fn or_absent(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(NOT_VISIBLE)
}

fn count(value: Option<&Number>) -> String {
    value.map(group).unwrap_or_else(|| NOT_VISIBLE.to_string())
}

fn reviews(count: Option<&Number>, rating: Option<&Number>) -> String {
    match (count, rating) {
        (Some(count), Some(rating)) => format!("{} ({}★)", group(count), rating),
        (Some(count), None) => group(count),
        (None, Some(rating)) => format!("{} ({}★)", NOT_VISIBLE, rating),
        (None, None) => NOT_VISIBLE.to_string(),
    }
}

fn price(value: Option<&Number>) -> String {
    match value.and_then(Number::as_f64) {
        Some(amount) => {
            let fixed = format!("{:.2}", amount);
            format!("₱{}", group_digits(&fixed))
        }
        None => NOT_VISIBLE.to_string(),
    }
}

fn list(items: Option<&[String]>) -> String {
    match items {
        Some(items) if !items.is_empty() => items.join("; "),
        _ => NOT_VISIBLE.to_string(),
    }
}

/// Formats a number with `,` thousands grouping.
fn group(n: &Number) -> String {
    group_digits(&n.to_string())
}

fn group_digits(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    // Exponent forms are left untouched.
    if !integer.chars().all(|c| c.is_ascii_digit()) {
        return text.to_string();
    }

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::group_digits;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_digits("0"), "0");
        assert_eq!(group_digits("999"), "999");
        assert_eq!(group_digits("19200"), "19,200");
        assert_eq!(group_digits("1234567.50"), "1,234,567.50");
        assert_eq!(group_digits("-1000"), "-1,000");
    }
}
