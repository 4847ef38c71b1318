//! Sign gate configuration.
//!
//! Both product signs are configuration data consumed by the same detector
//! engine, not separate detector types. Regions are normalized rectangles
//! tuned against 2048x1152 captures; thresholds are tunable per gate.

use crate::rect::NormalizedRect;
use serde::{Deserialize, Serialize};

/// One visual feature that must (or, when not required, merely may) match
/// for a sign to be confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub name: String,
    pub rect: NormalizedRect,
    /// Template file name, resolved against the assets directory.
    pub template: String,
    pub threshold: f64,
    pub required: bool,
}

/// Ordered gate list for one sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignConfig {
    pub name: String,
    pub gates: Vec<GateConfig>,
}

// Season-end result screen: bottom confirm button plus the REWARD label bar.
// The reward region is deliberately generous so it still overlaps the label
// when the client window shifts a little.
const ROI_END_CONFIRM: NormalizedRect = NormalizedRect::new(0.44, 0.905, 0.14, 0.07);
const ROI_END_REWARD: NormalizedRect = NormalizedRect::new(0.33, 0.47, 0.34, 0.16);

// League-news lobby screen: title, subtitle and the next button below them.
const ROI_LEAGUE_TITLE: NormalizedRect = NormalizedRect::new(0.42, 0.17, 0.26, 0.12);
const ROI_LEAGUE_SUBTITLE: NormalizedRect = NormalizedRect::new(0.40, 0.23, 0.30, 0.10);
const ROI_LEAGUE_NEXT: NormalizedRect = NormalizedRect::new(0.44, 0.70, 0.18, 0.12);

impl SignConfig {
    /// Season-end sign: confirm button and reward label, both required.
    pub fn end_sign() -> Self {
        Self {
            name: "end".to_string(),
            gates: vec![
                GateConfig {
                    name: "confirm".to_string(),
                    rect: ROI_END_CONFIRM,
                    template: "tpl_end_confirm_gray.png".to_string(),
                    threshold: 0.93,
                    required: true,
                },
                GateConfig {
                    name: "reward".to_string(),
                    rect: ROI_END_REWARD,
                    template: "tpl_end_reward_gray.png".to_string(),
                    threshold: 0.88,
                    required: true,
                },
            ],
        }
    }

    /// League-news sign: title and subtitle required, the next button scored
    /// for observability and only gating when `require_next` is set.
    pub fn league_news(require_next: bool) -> Self {
        Self {
            name: "league_news".to_string(),
            gates: vec![
                GateConfig {
                    name: "title".to_string(),
                    rect: ROI_LEAGUE_TITLE,
                    template: "tpl_lobby_title_gray.png".to_string(),
                    threshold: 0.93,
                    required: true,
                },
                GateConfig {
                    name: "subtitle".to_string(),
                    rect: ROI_LEAGUE_SUBTITLE,
                    template: "tpl_lobby_subtitle_gray.png".to_string(),
                    threshold: 0.93,
                    required: true,
                },
                GateConfig {
                    name: "next".to_string(),
                    rect: ROI_LEAGUE_NEXT,
                    template: "tpl_lobby_next_gray.png".to_string(),
                    threshold: 0.90,
                    required: require_next,
                },
            ],
        }
    }
}
