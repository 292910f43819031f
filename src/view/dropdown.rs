//! Filter dropdowns: brand and RAM selectors for the analysis forms.
//!
//! Population is background work. A failed fetch only logs a warning and
//! leaves the affected dropdowns at their placeholder.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::api::{ApiClient, ApiError};
use crate::model::{BrandRamPair, BrandStat, RamStat};

/// First integer in a RAM label: `16GB` → 16.
static RAM_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("RAM size regex must compile"));

/// A select box: a fixed leading placeholder followed by options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dropdown {
    pub placeholder: String,
    pub options: Vec<String>,
}

impl Dropdown {
    pub fn new(placeholder: &str) -> Self {
        Self {
            placeholder: placeholder.to_string(),
            options: Vec::new(),
        }
    }

    /// Replace every non-placeholder option.
    pub fn repopulate<I: IntoIterator<Item = String>>(&mut self, options: I) {
        self.options = options.into_iter().collect();
    }

    /// Number of entries including the placeholder.
    pub fn len(&self) -> usize {
        self.options.len() + 1
    }

    pub fn is_placeholder_only(&self) -> bool {
        self.options.is_empty()
    }
}

/// Sort brands alphabetically, ignoring case, and drop duplicates.
///
/// Names that differ only in case are both kept, ordered by their bytes.
pub fn sort_brands<I: IntoIterator<Item = String>>(brands: I) -> Vec<String> {
    let mut brands: Vec<String> = brands.into_iter().filter(|b| !b.is_empty()).collect();
    brands.sort_by(|a, b| compare_brands(a, b));
    brands.dedup();
    brands
}

fn compare_brands(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Numeric magnitude of a RAM label (its first run of digits), if any.
pub fn ram_magnitude(label: &str) -> Option<u64> {
    RAM_SIZE_RE
        .find(label)
        .and_then(|m| m.as_str().parse().ok())
}

/// Sort RAM labels by magnitude. Labels without digits go last, keeping
/// their relative order.
pub fn sort_rams<I: IntoIterator<Item = String>>(rams: I) -> Vec<String> {
    let mut rams: Vec<String> = rams.into_iter().filter(|r| !r.is_empty()).collect();
    // Stable sort: equal magnitudes keep server order.
    rams.sort_by_key(|r| match ram_magnitude(r) {
        Some(n) => (0, n),
        None => (1, 0),
    });
    let mut seen = std::collections::HashSet::new();
    rams.retain(|r| seen.insert(r.clone()));
    rams
}

/// Brand → RAM cross-reference from `/api/brand_ram_options`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrandRamIndex {
    pairs: Vec<BrandRamPair>,
}

impl BrandRamIndex {
    pub fn new(pairs: Vec<BrandRamPair>) -> Self {
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Distinct brands observed in the cross-reference.
    pub fn brands(&self) -> Vec<String> {
        sort_brands(self.pairs.iter().map(|p| p.brand.clone()))
    }

    /// RAM values observed for `brand`, sorted by size. Empty for the
    /// placeholder (empty brand).
    pub fn rams_for(&self, brand: &str) -> Vec<String> {
        if brand.is_empty() {
            return Vec::new();
        }
        sort_rams(
            self.pairs
                .iter()
                .filter(|p| p.brand == brand)
                .filter_map(|p| p.ram.clone()),
        )
    }
}

/// Every brand/RAM selector of the analysis forms.
#[derive(Debug, Clone, Serialize)]
pub struct FilterDropdowns {
    pub competitive_brand: Dropdown,
    pub trend_brand: Dropdown,
    pub trend_ram: Dropdown,
    pub sentiment_brand: Dropdown,
    #[serde(skip)]
    index: BrandRamIndex,
}

impl Default for FilterDropdowns {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterDropdowns {
    pub fn new() -> Self {
        Self {
            competitive_brand: Dropdown::new("选择品牌"),
            trend_brand: Dropdown::new("全部品牌"),
            trend_ram: Dropdown::new("全部内存"),
            sentiment_brand: Dropdown::new("选择品牌"),
            index: BrandRamIndex::default(),
        }
    }

    /// Fetch all three sources and populate. Never fails; each failed
    /// source is logged and skipped.
    pub fn load(client: &ApiClient) -> Self {
        let mut dropdowns = Self::new();
        dropdowns.apply_brands(client.brand_analysis());
        dropdowns.apply_rams(client.ram_analysis());
        dropdowns.apply_brand_ram(client.brand_ram_options());
        dropdowns
    }

    /// Fill the three brand selectors from `/api/brand_analysis`.
    pub fn apply_brands(&mut self, result: Result<Vec<BrandStat>, ApiError>) {
        match result {
            Ok(stats) => {
                let brands = sort_brands(stats.into_iter().map(|s| s.brand));
                self.competitive_brand.repopulate(brands.clone());
                self.sentiment_brand.repopulate(brands.clone());
                if self.index.is_empty() {
                    self.trend_brand.repopulate(brands);
                }
            }
            Err(e) => log::warn!("failed to load brand options: {e}"),
        }
    }

    /// Fill the trend RAM selector from `/api/ram_analysis`.
    pub fn apply_rams(&mut self, result: Result<Vec<RamStat>, ApiError>) {
        match result {
            Ok(stats) => self
                .trend_ram
                .repopulate(sort_rams(stats.into_iter().map(|s| s.ram))),
            Err(e) => log::warn!("failed to load RAM options: {e}"),
        }
    }

    /// Install the brand → RAM cross-reference and reseed the trend brand
    /// selector with the brands that actually have combinations.
    pub fn apply_brand_ram(&mut self, result: Result<Vec<BrandRamPair>, ApiError>) {
        match result {
            Ok(pairs) => {
                self.index = BrandRamIndex::new(pairs);
                if !self.index.is_empty() {
                    self.trend_brand.repopulate(self.index.brands());
                }
            }
            Err(e) => log::warn!("failed to load brand/RAM combinations: {e}"),
        }
    }

    /// The trend form's brand changed: narrow the RAM selector to what that
    /// brand offers.
    pub fn select_trend_brand(&mut self, brand: &str) {
        self.trend_ram.repopulate(self.index.rams_for(brand));
    }

    pub fn index(&self) -> &BrandRamIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn pair(brand: &str, ram: &str) -> BrandRamPair {
        BrandRamPair {
            brand: brand.to_string(),
            ram: Some(ram.to_string()),
        }
    }

    #[test]
    fn brands_sorted_case_insensitively_and_deduped() {
        let sorted = sort_brands(strings(&["lenovo", "Dell", "ASUS", "Dell", "apple"]));
        assert_eq!(sorted, strings(&["apple", "ASUS", "Dell", "lenovo"]));
    }

    #[test]
    fn rams_sorted_by_magnitude_with_unparsable_last() {
        let sorted = sort_rams(strings(&["32GB", "未知", "8GB", "16GB", "其他", "4GB"]));
        assert_eq!(sorted, strings(&["4GB", "8GB", "16GB", "32GB", "未知", "其他"]));
    }

    #[test]
    fn ram_magnitude_reads_first_digits() {
        assert_eq!(ram_magnitude("16GB"), Some(16));
        assert_eq!(ram_magnitude("LPDDR5 32G"), Some(5));
        assert_eq!(ram_magnitude("无"), None);
    }

    #[test]
    fn repopulate_keeps_placeholder() {
        let mut dd = Dropdown::new("选择品牌");
        dd.repopulate(strings(&["A", "B"]));
        dd.repopulate(strings(&["C"]));
        assert_eq!(dd.placeholder, "选择品牌");
        assert_eq!(dd.options, strings(&["C"]));
        assert_eq!(dd.len(), 2);
    }

    #[test]
    fn dependent_ram_dropdown() {
        let mut dds = FilterDropdowns::new();
        dds.apply_brand_ram(Ok(vec![
            pair("Lenovo", "32GB"),
            pair("Dell", "8GB"),
            pair("Lenovo", "16GB"),
        ]));
        assert_eq!(dds.trend_brand.options, strings(&["Dell", "Lenovo"]));

        dds.select_trend_brand("Lenovo");
        assert_eq!(dds.trend_ram.options, strings(&["16GB", "32GB"]));

        dds.select_trend_brand("");
        assert!(dds.trend_ram.is_placeholder_only());
    }

    #[test]
    fn failed_fetch_leaves_placeholder_only() {
        let mut dds = FilterDropdowns::new();
        dds.apply_brands(Err(ApiError::Transport {
            endpoint: Endpoint::BrandAnalysis,
            message: "connection refused".to_string(),
        }));
        assert!(dds.competitive_brand.is_placeholder_only());
        assert!(dds.trend_brand.is_placeholder_only());
    }
}
