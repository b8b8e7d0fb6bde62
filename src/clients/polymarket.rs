use crate::pipeline::locator::{Role, SelectorStrategy, SingleField, SlotField};
use crate::{AppError, Result};
use url::Url;

pub const SITE_BASE: &str = "https://polymarket.com";
const SEARCH_PATH: &str = "/markets";
const SEARCH_PARAM: &str = "_q";

/// Search front-end of the market site.
#[derive(Debug, Clone)]
pub struct PolymarketSite {
    base: Url,
}

impl PolymarketSite {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid site URL {}: {}", base_url, e)))?;
        Ok(Self { base })
    }

    /// `<site>/markets?_q=<keyword>`, with the keyword percent-encoded.
    pub fn search_url(&self, keyword: &str) -> Result<String> {
        let mut url = self
            .base
            .join(SEARCH_PATH)
            .map_err(|e| AppError::Config(format!("Invalid search URL: {}", e)))?;
        url.query_pairs_mut().append_pair(SEARCH_PARAM, keyword);
        Ok(url.into())
    }
}

// Layout roots of the rendered page. These are structural, so any change to
// the site's DOM nesting breaks them.
const MAIN_ROOT: &str = "body > div:nth-child(1) > div:nth-child(3) > main:nth-child(3) > div:nth-child(1) > div:nth-child(1) > div:nth-child(1)";
const CARD_LIST: &str = "div:nth-child(1) > div:nth-child(3) > main:nth-child(3) > div:nth-child(1) > div:nth-child(1) > div:nth-child(1) > div:nth-child(2) > div:nth-child(2) > div:nth-child(4) > div:nth-child(1) > div";
const CARD_TITLE: &str = "div:nth-child(1) > div:nth-child(2) > a:nth-child(1) > p:nth-child(1)";

const DETAIL_TITLE: &str = ".c-dqzIym.c-gYmnSl.c-dqzIym-fxyRaa-color-normal.c-dqzIym-cTvRMP-spacing-normal.c-dqzIym-dxJWYY-weight-bold";
const DETAIL_VOLUME: &str = ".c-dqzIym.c-dqzIym-fxyRaa-color-normal.c-dqzIym-cTvRMP-spacing-normal.c-dqzIym-jalaKP-weight-normal.c-dqzIym-hzzdKO-size-md.c-dqzIym-iUwoCw-css";
const DETAIL_END_DATE: &str = "p.c-dqzIym.c-dqzIym-fxyRaa-color-normal.c-dqzIym-cTvRMP-spacing-normal.c-dqzIym-jalaKP-weight-normal.c-dqzIym-hzzdKO-size-md.c-dqzIym-idjDWCM-css.c-PJLV span";

const SINGLE_PERCENTAGE: &str = ".c-dqzIym.c-dqzIym-fxyRaa-color-normal.c-dqzIym-cTvRMP-spacing-normal.c-dqzIym-jalaKP-weight-normal.c-dqzIym-idXFcBQ-css";
const SINGLE_TYPE: &str = ".c-dqzIym.c-dqzIym-fxyRaa-color-normal.c-dqzIym-cTvRMP-spacing-normal.c-dqzIym-jalaKP-weight-normal.c-dqzIym-euRFQq-size-sm.c-dqzIym-igYhVgt-css";
const SINGLE_BUY_YES: &str = ".c-gBrBnR.c-dETnmA.c-gBrBnR-iicKxNF-css";
const SINGLE_BUY_NO: &str = ".c-gBrBnR.c-dETnmA.c-gBrBnR-iggWduY-css";

/// Position- and generated-class-based selectors for the current Polymarket
/// layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalSelectors;

impl PositionalSelectors {
    fn outcome_slot(slot: usize, field: SlotField) -> String {
        let base = format!("{} > div:nth-child(1) > div:nth-child(2) > div:nth-child({})", MAIN_ROOT, slot);
        let rest = match field {
            SlotField::Title => "div:nth-child(2) > div:nth-child(1) > div:nth-child(2) > div:nth-child(1) > div:nth-child(1) > p:nth-child(1)",
            SlotField::Volume => "div:nth-child(2) > div:nth-child(1) > div:nth-child(2) > div:nth-child(1) > div:nth-child(2) > p:nth-child(1)",
            SlotField::Percentage => "div:nth-child(2) > div:nth-child(1) > div:nth-child(2) > div:nth-child(2) > p:nth-child(1)",
            SlotField::BuyYes => "div:nth-child(3) > div:nth-child(1)",
            SlotField::BuyNo => "div:nth-child(3) > div:nth-child(2)",
        };
        format!("{} > {}", base, rest)
    }
}

impl SelectorStrategy for PositionalSelectors {
    fn selector(&self, role: Role) -> String {
        match role {
            Role::MarketCards => CARD_LIST.to_string(),
            Role::CardTitle => CARD_TITLE.to_string(),
            Role::CardLink { index } => format!(
                "{} > div:nth-child(2) > div:nth-child(2) > div:nth-child(4) > div:nth-child(1) > div:nth-child({}) > {}",
                MAIN_ROOT, index, CARD_TITLE
            ),
            Role::DetailTitle => DETAIL_TITLE.to_string(),
            Role::DetailVolume => DETAIL_VOLUME.to_string(),
            Role::DetailEndDate => DETAIL_END_DATE.to_string(),
            Role::OutcomeSlot { slot, field } => Self::outcome_slot(slot, field),
            Role::SingleOutcome(field) => match field {
                SingleField::Percentage => SINGLE_PERCENTAGE,
                SingleField::OutcomeType => SINGLE_TYPE,
                SingleField::BuyYes => SINGLE_BUY_YES,
                SingleField::BuyNo => SINGLE_BUY_NO,
            }
            .to_string(),
        }
    }
}
