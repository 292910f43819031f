//! Sentiment results and the adapter over the two wire shapes the
//! `/api/sentiment_analysis` endpoint has shipped.
//!
//! Nested shape:
//!
//! ```json
//! {"sentiment_score": 78, "total_reviews": 1200,
//!  "sentiment_distribution": {"positive": {"count": 936, "percentage": 78.0}, ...},
//!  "keywords": {"positive": [{"keyword": "性能好", "count": 300}], "negative": [...]},
//!  "filter": {"brand": "Lenovo"}}
//! ```
//!
//! Flat shape:
//!
//! ```json
//! {"sentiment_score": 78.4, "total_reviews": 1200,
//!  "positive_percent": 78.4, "neutral_percent": 12.1, "negative_percent": 9.5,
//!  "positive_keywords": [...], "negative_keywords": [...]}
//! ```
//!
//! Both decode into [`Sentiment`]; nothing downstream sees the wire shape.

use serde::{Deserialize, Serialize};

use super::de;

/// Normalized sentiment breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentiment {
    pub brand: Option<String>,
    pub score: f64,
    pub total_reviews: u64,
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
    pub positive_keywords: Vec<Keyword>,
    pub negative_keywords: Vec<Keyword>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    #[serde(deserialize_with = "de::text")]
    pub keyword: String,
    #[serde(default, deserialize_with = "de::count")]
    pub count: u64,
}

impl Sentiment {
    /// Fill in the brand from the request when the payload omits its filter.
    pub fn or_brand(mut self, requested: Option<&str>) -> Self {
        if self.brand.is_none() {
            self.brand = requested.filter(|b| !b.is_empty()).map(str::to_string);
        }
        self
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        SentimentWire::deserialize(d).map(Sentiment::from)
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SentimentWire {
    Nested(NestedSentiment),
    Flat(FlatSentiment),
}

#[derive(Debug, Default, Deserialize)]
struct SentimentFilter {
    #[serde(default)]
    brand: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedSentiment {
    #[serde(default)]
    filter: SentimentFilter,
    #[serde(default, deserialize_with = "de::number")]
    sentiment_score: f64,
    #[serde(default, deserialize_with = "de::count")]
    total_reviews: u64,
    sentiment_distribution: Distribution,
    #[serde(default)]
    keywords: KeywordBuckets,
}

#[derive(Debug, Deserialize)]
struct Distribution {
    positive: Bucket,
    neutral: Bucket,
    negative: Bucket,
}

#[derive(Debug, Deserialize)]
struct Bucket {
    #[serde(default, deserialize_with = "de::number")]
    percentage: f64,
}

#[derive(Debug, Default, Deserialize)]
struct KeywordBuckets {
    #[serde(default)]
    positive: Vec<Keyword>,
    #[serde(default)]
    negative: Vec<Keyword>,
}

#[derive(Debug, Deserialize)]
struct FlatSentiment {
    #[serde(default)]
    filter: SentimentFilter,
    #[serde(default, deserialize_with = "de::number")]
    sentiment_score: f64,
    #[serde(default, deserialize_with = "de::count")]
    total_reviews: u64,
    // Required: an object with neither distribution nor percents is not sentiment data.
    #[serde(deserialize_with = "de::number")]
    positive_percent: f64,
    #[serde(default, deserialize_with = "de::number")]
    neutral_percent: f64,
    #[serde(default, deserialize_with = "de::number")]
    negative_percent: f64,
    #[serde(default)]
    positive_keywords: Vec<Keyword>,
    #[serde(default)]
    negative_keywords: Vec<Keyword>,
}

impl From<SentimentWire> for Sentiment {
    fn from(wire: SentimentWire) -> Self {
        match wire {
            SentimentWire::Nested(n) => Self {
                brand: n.filter.brand,
                score: n.sentiment_score,
                total_reviews: n.total_reviews,
                positive_pct: n.sentiment_distribution.positive.percentage,
                neutral_pct: n.sentiment_distribution.neutral.percentage,
                negative_pct: n.sentiment_distribution.negative.percentage,
                positive_keywords: n.keywords.positive,
                negative_keywords: n.keywords.negative,
            },
            SentimentWire::Flat(f) => Self {
                brand: f.filter.brand,
                score: f.sentiment_score,
                total_reviews: f.total_reviews,
                positive_pct: f.positive_percent,
                neutral_pct: f.neutral_percent,
                negative_pct: f.negative_percent,
                positive_keywords: f.positive_keywords,
                negative_keywords: f.negative_keywords,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"{
        "total_reviews": 1200,
        "sentiment_distribution": {
            "positive": {"count": 936, "percentage": 78.0},
            "neutral": {"count": 144, "percentage": 12.0},
            "negative": {"count": 120, "percentage": 10.0}
        },
        "sentiment_score": 78,
        "keywords": {
            "positive": [{"keyword": "性能好", "count": 300}],
            "negative": [{"keyword": "续航差", "count": 40}]
        },
        "filter": {"brand": "Lenovo"}
    }"#;

    const FLAT: &str = r#"{
        "sentiment_score": 78.0,
        "total_reviews": 1200,
        "positive_percent": 78.0,
        "neutral_percent": 12.0,
        "negative_percent": 10.0,
        "positive_keywords": [{"keyword": "性能好", "count": 300}],
        "negative_keywords": [{"keyword": "续航差", "count": 40}]
    }"#;

    #[test]
    fn both_shapes_normalize_to_the_same_model() {
        let nested: Sentiment = serde_json::from_str(NESTED).unwrap();
        let flat: Sentiment = serde_json::from_str::<Sentiment>(FLAT)
            .unwrap()
            .or_brand(Some("Lenovo"));
        assert_eq!(nested, flat);
        assert_eq!(nested.positive_keywords[0].keyword, "性能好");
    }

    #[test]
    fn nested_shape_without_keywords_has_empty_lists() {
        let json = r#"{
            "total_reviews": 10, "sentiment_score": 50,
            "sentiment_distribution": {
                "positive": {"percentage": 50}, "neutral": {"percentage": 30},
                "negative": {"percentage": 20}
            }
        }"#;
        let s: Sentiment = serde_json::from_str(json).unwrap();
        assert!(s.positive_keywords.is_empty());
        assert!(s.negative_keywords.is_empty());
        assert_eq!(s.brand, None);
    }

    #[test]
    fn or_brand_keeps_payload_brand() {
        let s: Sentiment = serde_json::from_str(NESTED).unwrap();
        assert_eq!(s.or_brand(Some("HP")).brand.as_deref(), Some("Lenovo"));
    }

    #[test]
    fn unrelated_payload_is_rejected() {
        assert!(serde_json::from_str::<Sentiment>(r#"{"best_k": 3}"#).is_err());
    }
}
