//! Competitive analysis: one brand against its closest competitors.

use serde::Serialize;

use crate::api::{ApiError, Endpoint};
use crate::model::{CompetitiveResult, Competitor};
use crate::view::format::{self, SignedPct};

use super::{Alert, PanelState, PanelUpdate, SELECT_BRAND, Sequencer, Session, Ticket};

pub const NO_COMPETITORS: &str = "没有找到竞争对手数据";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitiveView {
    pub brand: String,
    pub product_count: u64,
    pub avg_price: String,
    pub total_sales: String,
    /// Share of market sales, `--` when either side is zero.
    pub market_share: String,
    pub competitors: Vec<CompetitorCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorCard {
    pub brand: String,
    pub product_count: u64,
    pub avg_price: String,
    pub price_diff: SignedPct,
    pub total_sales: String,
    pub sales_diff: SignedPct,
}

impl From<&Competitor> for CompetitorCard {
    fn from(c: &Competitor) -> Self {
        Self {
            brand: c.brand.clone(),
            product_count: c.count,
            avg_price: format::yuan(c.avg_price),
            price_diff: format::signed_pct(c.price_diff_percent),
            total_sales: format::grouped(c.total_sales),
            sales_diff: format::signed_pct(c.sales_diff_percent),
        }
    }
}

impl CompetitiveView {
    pub fn build(brand: &str, result: &CompetitiveResult) -> Self {
        let competitors: Vec<CompetitorCard> =
            result.competitors.iter().map(CompetitorCard::from).collect();
        Self {
            brand: result
                .target_brand
                .clone()
                .unwrap_or_else(|| brand.to_string()),
            product_count: result.target_count,
            avg_price: format::yuan(result.target_avg_price),
            total_sales: format::grouped(result.target_total_sales),
            market_share: format::share_label(result.target_total_sales, result.total_market_sales),
            empty_message: competitors.is_empty().then_some(NO_COMPETITORS),
            competitors,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CompetitivePanel {
    #[serde(skip)]
    seq: Sequencer,
    #[serde(skip)]
    pending_brand: String,
    #[serde(flatten)]
    pub state: PanelState<CompetitiveView>,
}

impl CompetitivePanel {
    pub const NAME: &'static str = "competitive";
    const FAILURE_PREFIX: &'static str = "分析失败";

    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the selection and open a request. An empty brand is
    /// rejected before anything goes over the network.
    pub fn begin(&mut self, brand: &str) -> Result<Ticket, Alert> {
        let brand = brand.trim();
        if brand.is_empty() {
            return Err(Alert::new(SELECT_BRAND));
        }
        self.pending_brand = brand.to_string();
        self.state.start();
        Ok(self.seq.issue())
    }

    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: Result<CompetitiveResult, ApiError>,
    ) -> PanelUpdate {
        if !self.seq.is_current(ticket) {
            return PanelUpdate::Stale;
        }
        match result {
            Ok(data) => {
                self.state.show(CompetitiveView::build(&self.pending_brand, &data));
                PanelUpdate::Rendered
            }
            Err(e) => {
                self.state.fail();
                PanelUpdate::Failed(Alert::from_api(Self::FAILURE_PREFIX, &e))
            }
        }
    }

    pub fn run(&mut self, session: &Session, brand: &str) -> PanelUpdate {
        let ticket = match self.begin(brand) {
            Ok(ticket) => ticket,
            Err(alert) => return PanelUpdate::Failed(alert),
        };
        let brand = self.pending_brand.clone();
        let fetched = session.fetch(Endpoint::CompetitiveAnalysis, |c| {
            c.competitive_analysis(&brand)
        });
        let meta = fetched.meta();
        let update = self.apply(ticket, fetched.result);
        session.record(Self::NAME, ticket, &meta, &update);
        update
    }

    pub fn view(&self) -> Option<&CompetitiveView> {
        self.state.shown()
    }
}
