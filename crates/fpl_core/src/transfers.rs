//! Cross-gameweek ownership and money.
//!
//! [`TransferState`] is the only value carried from one gameweek to the
//! next. [`TransferStateTracker::advance`] applies one gameweek's buys and
//! sells and returns the successor state, leaving the input untouched.
//!
//! Prices are integers in tenths of a currency unit. Selling locks half of
//! any profit (rounded up in the seller's favour); a loss is taken in full.

use crate::config::{RulesConfig, TransferRules};
use crate::error::{DataIntegrityError, StateTransitionError};
use crate::models::{GameweekSnapshot, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Credit received for selling a player bought at `purchase` and now worth
/// `current`.
pub fn selling_price(purchase: i32, current: i32) -> i32 {
    if current > purchase {
        let profit = current - purchase;
        purchase + (profit + 1) / 2
    } else {
        current
    }
}

/// Players transferred in and out between two squads, each sorted by id.
pub fn detect_transfers(
    previous: &[PlayerId],
    current: &[PlayerId],
) -> (Vec<PlayerId>, Vec<PlayerId>) {
    let previous: BTreeSet<PlayerId> = previous.iter().copied().collect();
    let current: BTreeSet<PlayerId> = current.iter().copied().collect();
    (
        current.difference(&previous).copied().collect(),
        previous.difference(&current).copied().collect(),
    )
}

/// Transfers beyond the free allowance.
pub fn extra_transfers(made: usize, free: u32) -> u32 {
    u32::try_from(made).unwrap_or(u32::MAX).saturating_sub(free)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferState {
    owned: Vec<PlayerId>,
    purchase_prices: BTreeMap<PlayerId, i32>,
    bank: i32,
    free_transfers: u32,
}

impl TransferState {
    pub fn new(
        owned: Vec<PlayerId>,
        purchase_prices: BTreeMap<PlayerId, i32>,
        bank: i32,
        free_transfers: u32,
    ) -> Self {
        Self { owned, purchase_prices, bank, free_transfers }
    }

    /// Season-start state: every squad player bought at today's price.
    pub fn initial(
        squad: &[PlayerId],
        snapshot: &GameweekSnapshot,
        rules: &TransferRules,
    ) -> Result<Self, DataIntegrityError> {
        let players = snapshot.resolve(squad, "squad")?;
        let purchase_prices: BTreeMap<PlayerId, i32> =
            players.iter().map(|p| (p.id, p.cost)).collect();
        let spent: i32 = purchase_prices.values().sum();

        Ok(Self {
            owned: squad.to_vec(),
            purchase_prices,
            bank: rules.budget - spent,
            free_transfers: rules.initial_free_transfers,
        })
    }

    pub fn owned(&self) -> &[PlayerId] {
        &self.owned
    }

    pub fn owns(&self, player: PlayerId) -> bool {
        self.owned.contains(&player)
    }

    /// Price paid for `player`; zero when not owned.
    pub fn purchase_price(&self, player: PlayerId) -> i32 {
        self.purchase_prices.get(&player).copied().unwrap_or(0)
    }

    pub fn bank(&self) -> i32 {
        self.bank
    }

    pub fn free_transfers(&self) -> u32 {
        self.free_transfers
    }

    /// Bank plus the selling price of every owned player.
    pub fn squad_value(&self, costs: &HashMap<PlayerId, i32>) -> Result<i32, StateTransitionError> {
        self.owned.iter().try_fold(self.bank, |total, &player| {
            let current =
                costs.get(&player).copied().ok_or(StateTransitionError::MissingCost { player })?;
            let price = selling_price(self.purchase_price(player), current);
            Ok::<_, StateTransitionError>(total + price)
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransferStateTracker {
    rules: TransferRules,
}

impl TransferStateTracker {
    pub fn new(rules: &RulesConfig) -> Self {
        Self { rules: rules.transfers.clone() }
    }

    pub fn rules(&self) -> &TransferRules {
        &self.rules
    }

    pub fn initial_state(
        &self,
        squad: &[PlayerId],
        snapshot: &GameweekSnapshot,
    ) -> Result<TransferState, DataIntegrityError> {
        TransferState::initial(squad, snapshot, &self.rules)
    }

    /// Free transfers available next gameweek after `made` transfers with
    /// `free` available.
    pub fn next_free_transfers(&self, free: u32, made: usize) -> u32 {
        let made = u32::try_from(made).unwrap_or(u32::MAX);
        if made > free {
            return 1;
        }
        match free - made {
            0 => 1,
            remaining => self.rules.max_free_transfers.min(1 + remaining),
        }
    }

    /// Points penalty for `made` transfers with `free` available.
    pub fn transfer_hit_points(&self, made: usize, free: u32) -> i32 {
        let extra = i32::try_from(extra_transfers(made, free)).unwrap_or(i32::MAX);
        extra.saturating_mul(self.rules.hit_cost)
    }

    pub fn advance(
        &self,
        state: &TransferState,
        bought: &[PlayerId],
        sold: &[PlayerId],
        costs: &HashMap<PlayerId, i32>,
    ) -> Result<TransferState, StateTransitionError> {
        if bought.len() != sold.len() {
            return Err(StateTransitionError::MismatchedTransferCounts {
                bought: bought.len(),
                sold: sold.len(),
            });
        }

        let mut seen = HashSet::with_capacity(bought.len() + sold.len());
        for &player in bought.iter().chain(sold) {
            if !seen.insert(player) {
                return Err(StateTransitionError::DuplicateTransfer { player });
            }
        }

        for &player in sold {
            if !state.owns(player) {
                return Err(StateTransitionError::SellingUnowned { player });
            }
        }
        for &player in bought {
            if state.owns(player) {
                return Err(StateTransitionError::BuyingOwned { player });
            }
        }

        let cost_of = |player: PlayerId| {
            costs.get(&player).copied().ok_or(StateTransitionError::MissingCost { player })
        };

        for &player in &state.owned {
            if !state.purchase_prices.contains_key(&player) {
                return Err(StateTransitionError::MissingPurchasePrice { player });
            }
            cost_of(player)?;
        }

        let proceeds = sold.iter().try_fold(0, |sum, &player| {
            Ok::<_, StateTransitionError>(
                sum + selling_price(state.purchase_price(player), cost_of(player)?),
            )
        })?;
        let spent = bought.iter().try_fold(0, |sum, &player| {
            Ok::<_, StateTransitionError>(sum + cost_of(player)?)
        })?;

        let mut purchase_prices = state.purchase_prices.clone();
        for player in sold {
            purchase_prices.remove(player);
        }
        for &player in bought {
            purchase_prices.insert(player, cost_of(player)?);
        }

        let mut owned: Vec<PlayerId> =
            state.owned.iter().copied().filter(|id| !sold.contains(id)).collect();
        owned.extend_from_slice(bought);

        let next = TransferState {
            owned,
            purchase_prices,
            bank: state.bank + proceeds - spent,
            free_transfers: self.next_free_transfers(state.free_transfers, bought.len()),
        };

        log::debug!(
            "transfers: {} made, bank {} -> {}, free {} -> {}",
            bought.len(),
            state.bank,
            next.bank,
            state.free_transfers,
            next.free_transfers
        );

        Ok(next)
    }
}
