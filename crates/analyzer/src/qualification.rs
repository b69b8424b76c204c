use crate::types::WalletProfile;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualificationFloors {
    pub min_position_usd: f64,
    pub min_profit_usd: f64,
}

impl Default for QualificationFloors {
    fn default() -> Self {
        Self {
            min_position_usd: 100.0,
            min_profit_usd: 1000.0,
        }
    }
}

impl From<&common::config::Analysis> for QualificationFloors {
    fn from(cfg: &common::config::Analysis) -> Self {
        Self {
            min_position_usd: cfg.min_position_usd,
            min_profit_usd: cfg.min_profit_usd,
        }
    }
}

/// A wallet counts if it has real money on this market or a real track record.
pub fn qualifies(p: &WalletProfile, floors: &QualificationFloors) -> bool {
    p.current_position_size >= floors.min_position_usd || p.total_profit >= floors.min_profit_usd
}

/// Split off qualifying profiles, preserving order. Returns them with the number dropped.
pub fn filter_qualified(
    profiles: Vec<WalletProfile>,
    floors: &QualificationFloors,
) -> (Vec<WalletProfile>, usize) {
    let before = profiles.len();
    let kept: Vec<WalletProfile> = profiles.into_iter().filter(|p| qualifies(p, floors)).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
