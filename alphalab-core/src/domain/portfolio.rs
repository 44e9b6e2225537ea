//! Portfolio state — cash plus share counts over a fixed ticker axis.

/// Mutable state of the single portfolio a simulation run owns.
///
/// `shares[i]` is the share count for ticker index `i` on the run's ticker
/// axis. The vector length is fixed at construction; tickers without data
/// yet simply hold 0.0 shares. Exactly one instance lives per run and it is
/// never aliased — the engine mutates it once per date.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub shares: Vec<f64>,
}

impl PortfolioState {
    /// Fresh state: all capital in cash, zero shares for every ticker.
    pub fn new(initial_capital: f64, n_tickers: usize) -> Self {
        Self {
            cash: initial_capital,
            shares: vec![0.0; n_tickers],
        }
    }

    /// Mark-to-market value of held positions at the given prices.
    ///
    /// A ticker whose price is missing or non-positive contributes 0
    /// regardless of held shares: a position with an unknown current price
    /// is valued at nothing rather than at its last known price.
    pub fn holdings_value(&self, prices: &[f64]) -> f64 {
        debug_assert_eq!(prices.len(), self.shares.len());
        self.shares
            .iter()
            .zip(prices)
            .map(|(&qty, &px)| if px > 0.0 { qty * px } else { 0.0 })
            .sum()
    }

    /// Total portfolio value: cash + marked holdings.
    pub fn value(&self, prices: &[f64]) -> f64 {
        self.cash + self.holdings_value(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_all_cash() {
        let state = PortfolioState::new(100_000.0, 3);
        assert_eq!(state.cash, 100_000.0);
        assert_eq!(state.shares, vec![0.0, 0.0, 0.0]);
        assert_eq!(state.value(&[10.0, 20.0, 30.0]), 100_000.0);
    }

    #[test]
    fn holdings_marked_at_given_prices() {
        let mut state = PortfolioState::new(1_000.0, 2);
        state.shares = vec![10.0, 5.0];
        // 10 * 50 + 5 * 20 = 600
        assert_eq!(state.holdings_value(&[50.0, 20.0]), 600.0);
        assert_eq!(state.value(&[50.0, 20.0]), 1_600.0);
    }

    #[test]
    fn missing_price_values_position_at_zero() {
        let mut state = PortfolioState::new(0.0, 2);
        state.shares = vec![10.0, 5.0];
        assert_eq!(state.holdings_value(&[f64::NAN, 20.0]), 100.0);
        assert_eq!(state.holdings_value(&[0.0, 20.0]), 100.0);
        assert_eq!(state.holdings_value(&[-1.0, 20.0]), 100.0);
    }
}
