//! Number and label formatting shared by the terminal and web renderers.
//!
//! The backend's numbers are shown the way a browser prints them: integral
//! floats lose their decimals, `fixed` rounds like `toFixed`, and counts get
//! thousands separators.

use serde::Serialize;

/// Placeholder shown wherever a ratio has no meaningful denominator.
pub const NO_VALUE: &str = "--";

/// Render a float the way a browser stringifies it (`78` not `78.0`).
pub fn plain(v: f64) -> String {
    if v == 0.0 {
        // Also folds -0 into "0".
        return "0".to_string();
    }
    format!("{v}")
}

/// Fixed-point rendering with `digits` decimals, ties away from zero.
pub fn fixed(v: f64, digits: usize) -> String {
    let scale = 10f64.powi(digits as i32);
    let rounded = (v * scale).round() / scale;
    format!("{rounded:.digits$}")
}

/// Group thousands with commas: `1234567` → `1,234,567`.
pub fn grouped(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Currency label with the raw server number: `¥5999.5`.
pub fn yuan(v: f64) -> String {
    format!("¥{}", plain(v))
}

/// Currency label with two decimals: `¥5999.50`.
pub fn yuan_fixed(v: f64) -> String {
    format!("¥{}", fixed(v, 2))
}

/// Clamp a percentage into `[0, 100]` for use as a bar width.
///
/// Non-finite input collapses to 0.
pub fn clamp_pct(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 100.0) } else { 0.0 }
}

/// Share of `part` in `total` in percent; `None` when either side is zero.
pub fn share(part: u64, total: u64) -> Option<f64> {
    if part == 0 || total == 0 {
        return None;
    }
    Some(part as f64 / total as f64 * 100.0)
}

/// Text for [`share`]: `"42.5%"` or `"--"`.
pub fn share_label(part: u64, total: u64) -> String {
    match share(part, total) {
        Some(pct) => format!("{}%", fixed(pct, 1)),
        None => NO_VALUE.to_string(),
    }
}

/// Visual polarity of a signed difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Positive => "diff-positive",
            Self::Negative => "diff-negative",
        }
    }
}

/// A signed percentage difference ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedPct {
    pub text: String,
    pub polarity: Polarity,
    pub class: &'static str,
}

/// `> 0` gets a leading `+` and the positive class; everything else,
/// including zero, keeps its native rendering and the negative class.
pub fn signed_pct(v: f64) -> SignedPct {
    let polarity = if v > 0.0 {
        Polarity::Positive
    } else {
        Polarity::Negative
    };
    let text = match polarity {
        Polarity::Positive => format!("+{}%", plain(v)),
        Polarity::Negative => format!("{}%", plain(v)),
    };
    SignedPct {
        text,
        polarity,
        class: polarity.css_class(),
    }
}

/// One slot of a five-star rating strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Star {
    Full,
    Half,
    Empty,
}

impl Star {
    pub fn glyph(self) -> char {
        match self {
            Self::Full => '★',
            Self::Half => '⯪',
            Self::Empty => '☆',
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Full => "fa fa-star text-yellow-500",
            Self::Half => "fa fa-star-half-alt text-yellow-500",
            Self::Empty => "fa fa-star text-gray-300",
        }
    }
}

pub const STAR_SLOTS: usize = 5;

/// Star strip for a rating already rounded to one decimal.
pub fn stars(rating: f64) -> Vec<Star> {
    let rating = clamp_pct(rating).min(STAR_SLOTS as f64);
    let full = rating.floor() as usize;
    let half = rating - rating.floor() >= 0.5;
    let mut strip = vec![Star::Full; full];
    if half {
        strip.push(Star::Half);
    }
    strip.resize(STAR_SLOTS, Star::Empty);
    strip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_drops_integral_decimals() {
        assert_eq!(plain(78.0), "78");
        assert_eq!(plain(5.2), "5.2");
        assert_eq!(plain(-3.1), "-3.1");
        assert_eq!(plain(-0.0), "0");
    }

    #[test]
    fn fixed_rounds_to_digits() {
        assert_eq!(fixed(5999.5, 2), "5999.50");
        assert_eq!(fixed(42.46, 1), "42.5");
        assert_eq!(fixed(1234.4, 0), "1234");
        assert_eq!(fixed(0.0, 1), "0.0");
    }

    #[test]
    fn grouped_inserts_commas() {
        assert_eq!(grouped(0), "0");
        assert_eq!(grouped(999), "999");
        assert_eq!(grouped(1000), "1,000");
        assert_eq!(grouped(1234567), "1,234,567");
    }

    #[test]
    fn clamp_pct_bounds() {
        assert_eq!(clamp_pct(-4.0), 0.0);
        assert_eq!(clamp_pct(55.5), 55.5);
        assert_eq!(clamp_pct(130.0), 100.0);
        assert_eq!(clamp_pct(f64::NAN), 0.0);
    }

    #[test]
    fn share_label_with_and_without_denominator() {
        assert_eq!(share_label(250, 1000), "25.0%");
        assert_eq!(share_label(1, 3), "33.3%");
        assert_eq!(share_label(0, 1000), NO_VALUE);
        assert_eq!(share_label(10, 0), NO_VALUE);
    }

    #[test]
    fn signed_pct_by_sign() {
        let up = signed_pct(5.2);
        assert_eq!(up.text, "+5.2%");
        assert_eq!(up.class, "diff-positive");

        let down = signed_pct(-3.1);
        assert_eq!(down.text, "-3.1%");
        assert_eq!(down.class, "diff-negative");

        let flat = signed_pct(0.0);
        assert_eq!(flat.text, "0%");
        assert_eq!(flat.polarity, Polarity::Negative);
    }

    #[test]
    fn star_strip_shapes() {
        use Star::*;
        assert_eq!(stars(4.5), vec![Full, Full, Full, Full, Half]);
        assert_eq!(stars(3.2), vec![Full, Full, Full, Empty, Empty]);
        assert_eq!(stars(0.0), vec![Empty; 5]);
        assert_eq!(stars(7.0), vec![Full; 5]);
    }
}
