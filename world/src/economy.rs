//! Credit ledger with fractional passive income accrual.

use std::time::Duration;

use ridgeline_defence_core::Event;

/// Lifetime totals kept alongside the spendable balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EconomyStats {
    /// Every credit ever granted, from any source.
    pub total_earned: u64,
    /// Every credit ever spent on placements and upgrades.
    pub total_spent: u64,
    /// Credits granted by kill rewards, refunds and other one-off grants.
    pub total_from_kills: u64,
    /// Credits granted by the passive income trickle.
    pub total_from_passive: u64,
}

#[derive(Debug)]
pub(crate) struct Economy {
    credits: u32,
    fractional: f64,
    stats: EconomyStats,
}

impl Economy {
    pub(crate) fn new(starting_credits: u32) -> Self {
        Self {
            credits: starting_credits,
            fractional: 0.0,
            stats: EconomyStats::default(),
        }
    }

    pub(crate) fn credits(&self) -> u32 {
        self.credits
    }

    pub(crate) fn stats(&self) -> EconomyStats {
        self.stats
    }

    /// Grants a one-off sum (kill reward, sale refund). Emits the new
    /// balance so observers never have to track deltas themselves.
    pub(crate) fn add_credits(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if amount == 0 {
            return;
        }
        self.credits = self.credits.saturating_add(amount);
        self.stats.total_earned += u64::from(amount);
        self.stats.total_from_kills += u64::from(amount);
        out_events.push(Event::CreditsChanged {
            balance: self.credits,
        });
    }

    /// Attempts an atomic spend. A zero cost always succeeds and emits
    /// nothing; an unaffordable cost changes nothing.
    pub(crate) fn spend_credits(&mut self, amount: u32, out_events: &mut Vec<Event>) -> bool {
        if amount == 0 {
            return true;
        }
        let Some(remaining) = self.credits.checked_sub(amount) else {
            return false;
        };
        self.credits = remaining;
        self.stats.total_spent += u64::from(amount);
        out_events.push(Event::CreditsChanged {
            balance: self.credits,
        });
        true
    }

    /// Accrues passive income. Sub-credit remainders persist in a
    /// fractional accumulator so slow trickles are never lost to rounding.
    pub(crate) fn update(&mut self, rate: f64, dt: Duration, out_events: &mut Vec<Event>) {
        if rate <= 0.0 {
            return;
        }
        self.fractional += rate * dt.as_secs_f64();
        let whole = self.fractional.floor();
        if whole < 1.0 {
            return;
        }
        self.fractional -= whole;
        let granted = whole as u32;
        self.credits = self.credits.saturating_add(granted);
        self.stats.total_earned += u64::from(granted);
        self.stats.total_from_passive += u64::from(granted);
        out_events.push(Event::CreditsChanged {
            balance: self.credits,
        });
    }
}
