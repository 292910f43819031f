//! Review sentiment for one brand, plus an average-rating strip from the
//! brand's listings.

use serde::Serialize;

use crate::api::{ApiError, Endpoint};
use crate::model::{Keyword, Listing, Sentiment};
use crate::view::format::{self, NO_VALUE, Star};

use super::{Alert, PanelState, PanelUpdate, SELECT_BRAND, Sequencer, Session, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Positive,
    Neutral,
    Negative,
}

impl Bucket {
    pub fn label(self) -> &'static str {
        match self {
            Self::Positive => "正面评价",
            Self::Neutral => "中性评价",
            Self::Negative => "负面评价",
        }
    }
}

/// One distribution bar. `text` keeps the server value, `width` is clamped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentBar {
    pub bucket: Bucket,
    pub label: &'static str,
    pub text: String,
    pub width: String,
    pub fraction: f64,
}

impl SentimentBar {
    fn new(bucket: Bucket, pct: f64) -> Self {
        let clamped = format::clamp_pct(pct);
        Self {
            bucket,
            label: bucket.label(),
            text: format!("{}%", format::plain(pct)),
            width: format!("{}%", format::plain(clamped)),
            fraction: clamped / 100.0,
        }
    }
}

/// Average listing rating and its star strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingView {
    /// One decimal, or `--` when nothing was rated.
    pub average: String,
    pub stars: Vec<Star>,
}

impl Default for RatingView {
    fn default() -> Self {
        Self {
            average: NO_VALUE.to_string(),
            stars: Vec::new(),
        }
    }
}

impl RatingView {
    /// Average over listings with a positive rating.
    pub fn from_listings(listings: &[Listing]) -> Self {
        let rated: Vec<f64> = listings
            .iter()
            .filter_map(|l| l.rating)
            .filter(|r| *r > 0.0)
            .collect();
        if rated.is_empty() {
            return Self::default();
        }
        let avg = rated.iter().sum::<f64>() / rated.len() as f64;
        let average = format::fixed(avg, 1);
        // Stars follow the displayed (rounded) value.
        let shown: f64 = average.parse().unwrap_or(avg);
        Self {
            average,
            stars: format::stars(shown),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentView {
    pub filter_info: String,
    pub score: String,
    pub total_reviews: String,
    pub bars: Vec<SentimentBar>,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub rating: RatingView,
}

fn chip(k: &Keyword) -> String {
    format!("{} ({})", k.keyword, k.count)
}

impl SentimentView {
    pub fn build(sentiment: &Sentiment) -> Self {
        Self {
            filter_info: match sentiment.brand.as_deref() {
                Some(brand) if !brand.is_empty() => format!("品牌: {brand}"),
                _ => "全部评价".to_string(),
            },
            score: format::plain(sentiment.score),
            total_reviews: format::grouped(sentiment.total_reviews),
            bars: vec![
                SentimentBar::new(Bucket::Positive, sentiment.positive_pct),
                SentimentBar::new(Bucket::Neutral, sentiment.neutral_pct),
                SentimentBar::new(Bucket::Negative, sentiment.negative_pct),
            ],
            positive_keywords: sentiment.positive_keywords.iter().map(chip).collect(),
            negative_keywords: sentiment.negative_keywords.iter().map(chip).collect(),
            rating: RatingView::default(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct SentimentPanel {
    #[serde(skip)]
    seq: Sequencer,
    #[serde(flatten)]
    pub state: PanelState<SentimentView>,
}

impl SentimentPanel {
    pub const NAME: &'static str = "sentiment";
    const FAILURE_PREFIX: &'static str = "分析失败";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, brand: &str) -> Result<Ticket, Alert> {
        if brand.trim().is_empty() {
            return Err(Alert::new(SELECT_BRAND));
        }
        self.state.start();
        Ok(self.seq.issue())
    }

    pub fn apply(&mut self, ticket: Ticket, result: Result<Sentiment, ApiError>) -> PanelUpdate {
        if !self.seq.is_current(ticket) {
            return PanelUpdate::Stale;
        }
        match result {
            Ok(sentiment) => {
                self.state.show(SentimentView::build(&sentiment));
                PanelUpdate::Rendered
            }
            Err(e) => {
                self.state.fail();
                PanelUpdate::Failed(Alert::from_api(Self::FAILURE_PREFIX, &e))
            }
        }
    }

    /// Attach the rating strip. Failure is soft: logged, rating stays `--`.
    pub fn apply_rating(&mut self, ticket: Ticket, result: Result<Vec<Listing>, ApiError>) -> PanelUpdate {
        if !self.seq.is_current(ticket) {
            return PanelUpdate::Stale;
        }
        match (result, self.state.shown_mut()) {
            (Ok(listings), Some(view)) => {
                view.rating = RatingView::from_listings(&listings);
                PanelUpdate::Rendered
            }
            (Err(e), _) => {
                log::warn!("rating enrichment failed: {e}");
                PanelUpdate::Rendered
            }
            (Ok(_), None) => PanelUpdate::Rendered,
        }
    }

    pub fn run(&mut self, session: &Session, brand: &str) -> PanelUpdate {
        let ticket = match self.begin(brand) {
            Ok(ticket) => ticket,
            Err(alert) => return PanelUpdate::Failed(alert),
        };
        let brand = brand.trim();

        let fetched = session.fetch(Endpoint::SentimentAnalysis, |c| c.sentiment_analysis(brand));
        let meta = fetched.meta();
        let update = self.apply(ticket, fetched.result);
        session.record(Self::NAME, ticket, &meta, &update);
        if !update.is_rendered() {
            return update;
        }

        let listings = session.fetch(Endpoint::Listings, |c| c.listings(brand));
        let meta = listings.meta();
        let rating_update = self.apply_rating(ticket, listings.result);
        session.record(Self::NAME, ticket, &meta, &rating_update);
        update
    }

    pub fn view(&self) -> Option<&SentimentView> {
        self.state.shown()
    }
}
