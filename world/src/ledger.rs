//! Running money total for the round.

use art_critic_core::Money;

#[derive(Clone, Debug, Default)]
pub(crate) struct ScoreLedger {
    balance: Money,
}

impl ScoreLedger {
    pub(crate) fn add(&mut self, amount: Money) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub(crate) fn current(&self) -> Money {
        self.balance
    }
}
