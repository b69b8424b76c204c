use crate::types::{Position, ScoredWallet, Signal, SignalData, TradingSignal, WalletSummary};

pub const MIN_WALLETS: usize = 3;
/// A single wallet above this share of weighted value is a whale.
pub const WHALE_SHARE: f64 = 0.40;
pub const WHALE_PENALTY: u8 = 3;
pub const COUNT_AGREEMENT: f64 = 0.80;
pub const COUNT_AGREEMENT_MIN_WALLETS: usize = 5;
pub const DIRECTIONAL_SHARE: f64 = 0.65;
pub const MIN_CONFIDENCE: u8 = 5;
pub const DIVIDED_DOMINANCE: f64 = 0.60;
pub const MAX_CONFIDENCE: u8 = 10;

pub fn base_confidence(dominance: f64) -> u8 {
    if dominance > 0.80 {
        9
    } else if dominance > 0.70 {
        7
    } else if dominance > 0.60 {
        5
    } else {
        3
    }
}

pub fn decide(yes_share: f64, confidence: u8) -> Signal {
    if confidence < MIN_CONFIDENCE {
        Signal::Inconclusive
    } else if yes_share >= DIRECTIONAL_SHARE {
        Signal::BuyYes
    } else if yes_share <= 1.0 - DIRECTIONAL_SHARE {
        Signal::BuyNo
    } else {
        Signal::Inconclusive
    }
}

#[derive(Debug, Default)]
struct SideTotals {
    count: usize,
    raw: f64,
    weighted: f64,
}

/// Aggregate ranked wallets (best first) into a directional call.
pub fn generate_signal(ranked: &[ScoredWallet]) -> TradingSignal {
    let total = ranked.len();
    if total < MIN_WALLETS {
        return TradingSignal::inconclusive(format!(
            "Only {total} qualified wallet(s) hold this market; at least {MIN_WALLETS} are needed for a signal."
        ));
    }

    let mut yes = SideTotals::default();
    let mut no = SideTotals::default();
    for w in ranked {
        let side = match w.profile.current_position {
            Position::Yes => &mut yes,
            Position::No => &mut no,
        };
        side.count += 1;
        side.raw += w.profile.current_position_size;
        side.weighted += w.weighted_value();
    }

    let weighted_total = yes.weighted + no.weighted;
    if weighted_total.is_nan() || weighted_total <= 0.0 {
        return TradingSignal::inconclusive(format!(
            "The top {total} wallets carry no credibility-weighted value; nothing to aggregate."
        ));
    }

    let yes_share = yes.weighted / weighted_total;
    let dominance = yes_share.max(1.0 - yes_share);
    let mut confidence = base_confidence(dominance);

    let whale = ranked
        .iter()
        .map(|w| (w, w.weighted_value() / weighted_total))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|(_, share)| *share > WHALE_SHARE);
    if whale.is_some() {
        confidence = confidence.saturating_sub(WHALE_PENALTY).max(1);
    }

    let larger_count = yes.count.max(no.count);
    if total >= COUNT_AGREEMENT_MIN_WALLETS && larger_count as f64 >= COUNT_AGREEMENT * total as f64 {
        confidence = (confidence + 1).min(MAX_CONFIDENCE);
    }

    let signal = decide(yes_share, confidence);

    let mut reasoning = format!(
        "{} of {total} top wallets ({:.0}%) hold YES. Raw exposure: {} on YES vs {} on NO.",
        yes.count,
        yes.count as f64 / total as f64 * 100.0,
        fmt_usd(yes.raw),
        fmt_usd(no.raw),
    );
    if let Some((w, share)) = whale {
        reasoning.push_str(&format!(
            " Whale concentration: {} holds {:.0}% of credibility-weighted value; confidence reduced by {WHALE_PENALTY}.",
            w.profile.address,
            share * 100.0
        ));
    }
    let leading = if yes_share >= 0.5 { Position::Yes } else { Position::No };
    match signal {
        Signal::BuyYes | Signal::BuyNo => reasoning.push_str(&format!(
            " Credibility-weighted money favours {leading} at {:.0}% (confidence {confidence}/10).",
            dominance * 100.0
        )),
        Signal::Inconclusive if dominance < DIVIDED_DOMINANCE => reasoning.push_str(&format!(
            " Smart money is divided: the leading side ({leading}) holds only {:.0}% of weighted value.",
            dominance * 100.0
        )),
        Signal::Inconclusive => reasoning.push_str(&format!(
            " Weighted value leans {leading} at {:.0}%, but falls short of a call (needs {:.0}% and confidence {MIN_CONFIDENCE}/10; got {confidence}/10).",
            dominance * 100.0,
            DIRECTIONAL_SHARE * 100.0
        )),
    }

    TradingSignal {
        signal,
        confidence,
        reasoning,
        data: Some(SignalData {
            total_wallets: total,
            yes_count: yes.count,
            no_count: no.count,
            yes_raw_usd: yes.raw,
            no_raw_usd: no.raw,
            yes_weighted_usd: yes.weighted,
            no_weighted_usd: no.weighted,
            yes_share,
            whale_detected: whale.is_some(),
            whale_address: whale.map(|(w, _)| w.profile.address.clone()),
            top_wallets: ranked.iter().map(WalletSummary::from).collect(),
        }),
    }
}

/// Whole dollars with thousands separators, e.g. `$1,234,567`.
pub fn fmt_usd(amount: f64) -> String {
    let rounded = amount.abs().round();
    let digits = format!("{rounded:.0}");
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && rounded > 0.0 { "-" } else { "" };
    format!("{sign}${grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScoreBreakdown, WalletProfile};
    use chrono::{DateTime, Utc};

    fn wallet(addr: &str, position: Position, size: f64, score: f64) -> ScoredWallet {
        ScoredWallet {
            profile: WalletProfile {
                address: addr.into(),
                name: None,
                total_profit: 0.0,
                total_markets: 0,
                win_rate: 0.0,
                sampled_position_count: 0,
                last_trade: DateTime::<Utc>::default(),
                avg_position_size: 0.0,
                current_position: position,
                current_position_size: size,
                current_share_count: size * 2.0,
            },
            breakdown: ScoreBreakdown::default(),
            score,
        }
    }

    fn yes(addr: &str, weighted: f64) -> ScoredWallet {
        wallet(addr, Position::Yes, weighted, 100.0)
    }

    fn no(addr: &str, weighted: f64) -> ScoredWallet {
        wallet(addr, Position::No, weighted, 100.0)
    }

    #[test]
    fn test_fewer_than_three_wallets_is_inconclusive() {
        let s = generate_signal(&[yes("a", 1000.0), yes("b", 1000.0)]);
        assert_eq!(s.signal, Signal::Inconclusive);
        assert_eq!(s.confidence, 0);
        assert!(s.reasoning.contains("Only 2"));
        assert!(s.data.is_none());
    }

    #[test]
    fn test_zero_weighted_total_is_inconclusive() {
        let ranked = vec![
            wallet("a", Position::Yes, 1000.0, 0.0),
            wallet("b", Position::No, 1000.0, 0.0),
            wallet("c", Position::Yes, 0.0, 80.0),
        ];
        let s = generate_signal(&ranked);
        assert_eq!(s.signal, Signal::Inconclusive);
        assert_eq!(s.confidence, 0);
    }

    #[test]
    fn test_whale_at_exactly_forty_percent_does_not_fire() {
        let ranked = vec![
            yes("a", 400.0),
            yes("b", 200.0),
            yes("c", 150.0),
            yes("d", 150.0),
            yes("e", 100.0),
        ];
        let s = generate_signal(&ranked);
        let data = s.data.unwrap();
        assert!(!data.whale_detected);
        // 9 base + 1 for unanimous count.
        assert_eq!(s.confidence, 10);
        assert_eq!(s.signal, Signal::BuyYes);
    }

    #[test]
    fn test_whale_above_forty_percent_costs_three() {
        let ranked = vec![
            yes("a", 401.0),
            yes("b", 200.0),
            yes("c", 150.0),
            yes("d", 150.0),
            yes("e", 99.0),
        ];
        let s = generate_signal(&ranked);
        let data = s.data.unwrap();
        assert!(data.whale_detected);
        assert_eq!(data.whale_address.as_deref(), Some("a"));
        assert_eq!(s.confidence, 9 - 3 + 1);
        assert!(s.reasoning.contains("Whale concentration"));
    }

    #[test]
    fn test_three_yes_two_no_example() {
        let ranked = vec![
            yes("a", 400.0),
            yes("b", 200.0),
            yes("c", 150.0),
            no("d", 150.0),
            no("e", 100.0),
        ];
        let s = generate_signal(&ranked);
        let data = s.data.unwrap();
        assert!((data.yes_share - 0.75).abs() < 1e-9);
        assert!(!data.whale_detected);
        // 0.75 falls in the >0.70 bracket; 3 of 5 is short of the count boost.
        assert_eq!(s.confidence, 7);
        assert_eq!(s.signal, Signal::BuyYes);

        let mut heavier = ranked;
        heavier[0] = yes("a", 450.0);
        let s = generate_signal(&heavier);
        assert!(s.data.unwrap().whale_detected);
        assert_eq!(s.confidence, 4);
        assert_eq!(s.signal, Signal::Inconclusive);
        assert!(s.reasoning.contains("falls short"));
    }

    #[test]
    fn test_count_boost_needs_five_wallets() {
        let four = vec![yes("a", 250.0), yes("b", 250.0), yes("c", 250.0), no("d", 250.0)];
        // Dominance 0.75 => base 7, no boost with four wallets.
        assert_eq!(generate_signal(&four).confidence, 7);

        let five = vec![
            yes("a", 200.0),
            yes("b", 200.0),
            yes("c", 200.0),
            yes("d", 150.0),
            no("e", 250.0),
        ];
        // Same dominance, four of five agree => +1.
        assert_eq!(generate_signal(&five).confidence, 8);
    }

    #[test]
    fn test_base_confidence_brackets() {
        assert_eq!(base_confidence(0.81), 9);
        assert_eq!(base_confidence(0.80), 7);
        assert_eq!(base_confidence(0.75), 7);
        assert_eq!(base_confidence(0.70), 5);
        assert_eq!(base_confidence(0.61), 5);
        assert_eq!(base_confidence(0.60), 3);
    }

    #[test]
    fn test_decision_thresholds() {
        assert_eq!(decide(0.70, 5), Signal::BuyYes);
        assert_eq!(decide(0.70, 4), Signal::Inconclusive);
        assert_eq!(decide(0.65, 5), Signal::BuyYes);
        assert_eq!(decide(0.30, 5), Signal::BuyNo);
        assert_eq!(decide(0.50, 9), Signal::Inconclusive);
    }

    #[test]
    fn test_divided_market_reasoning() {
        let ranked = vec![yes("a", 300.0), no("b", 300.0), yes("c", 250.0), no("d", 250.0)];
        let s = generate_signal(&ranked);
        assert_eq!(s.signal, Signal::Inconclusive);
        assert_eq!(s.confidence, 3);
        assert!(s.reasoning.contains("divided"));
        assert!(s.reasoning.starts_with("2 of 4 top wallets (50%) hold YES."));
    }

    #[test]
    fn test_buy_no_and_summaries() {
        let ranked = vec![no("a", 500.0), no("b", 300.0), no("c", 100.0), yes("d", 100.0)];
        let s = generate_signal(&ranked);
        assert_eq!(s.signal, Signal::BuyNo);
        let data = s.data.unwrap();
        assert_eq!(data.top_wallets.len(), 4);
        assert_eq!(data.top_wallets[0].address, "a");
        assert_eq!(data.no_count, 3);
        assert!((data.yes_share - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_fmt_usd() {
        assert_eq!(fmt_usd(0.0), "$0");
        assert_eq!(fmt_usd(999.4), "$999");
        assert_eq!(fmt_usd(1234.5), "$1,235");
        assert_eq!(fmt_usd(1_234_567.0), "$1,234,567");
        assert_eq!(fmt_usd(-2500.0), "-$2,500");
    }
}
