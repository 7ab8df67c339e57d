//! Finance collaborator.
//!
//! The dispatcher books the cost of every successful top-level Execute through
//! the [`Finance`] trait. Actions never touch the ledger themselves.

/// Signed amount of park currency. Negative deltas are expenses.
pub type Money = i64;

/// Category an expense or refund is booked under.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum ExpenditureType {
    RideConstruction = 0,
    Landscaping = 1,
    LandPurchase = 2,
    #[default]
    Other = 3,
}

/// Read/write access to the park ledger.
pub trait Finance {
    /// Cash currently available.
    fn funds(&self) -> Money;

    /// Outstanding loan.
    fn loan(&self) -> Money;

    /// Applies a signed delta to the available cash and books it under `category`.
    fn apply(&mut self, delta: Money, category: ExpenditureType);

    /// Returns true if an expense of `cost` (a negative delta) can be paid.
    fn can_afford(&self, cost: Money) -> bool {
        cost >= 0 || self.funds() >= -cost
    }
}

/// Ledger owned by the world state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParkFinance {
    cash: Money,
    loan: Money,
    max_loan: Money,
    /// Running totals per [`ExpenditureType`], indexed by discriminant.
    expenditure: [Money; <ExpenditureType as strum::EnumCount>::COUNT],
}

impl ParkFinance {
    pub fn new(cash: Money, max_loan: Money) -> Self {
        Self {
            cash,
            loan: 0,
            max_loan,
            expenditure: [0; <ExpenditureType as strum::EnumCount>::COUNT],
        }
    }

    pub fn max_loan(&self) -> Money {
        self.max_loan
    }

    /// Total booked under `category` since the ledger was created.
    pub fn expenditure(&self, category: ExpenditureType) -> Money {
        self.expenditure[category as usize]
    }

    /// Sets cash directly. Used by cheats and scenario setup, never by the dispatcher.
    pub fn set_cash(&mut self, cash: Money) {
        self.cash = cash;
    }
}

impl Default for ParkFinance {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Finance for ParkFinance {
    fn funds(&self) -> Money {
        self.cash
    }

    fn loan(&self) -> Money {
        self.loan
    }

    fn apply(&mut self, delta: Money, category: ExpenditureType) {
        self.cash = self.cash.saturating_add(delta);
        let slot = &mut self.expenditure[category as usize];
        *slot = slot.saturating_add(delta);
    }
}
