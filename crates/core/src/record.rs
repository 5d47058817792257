use core::fmt::{Display, Formatter};

use chrono::{DateTime, Duration, Local};

/// The five TPC-C transaction profiles.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransactionKind {
    NewOrder,
    Payment,
    Delivery,
    OrderStatus,
    StockLevel,
}

impl TransactionKind {
    /// All kinds in report order.
    pub const ALL: [Self; 5] = [
        Self::NewOrder,
        Self::Payment,
        Self::Delivery,
        Self::OrderStatus,
        Self::StockLevel,
    ];

    /// Position of this kind in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::NewOrder => 0,
            Self::Payment => 1,
            Self::Delivery => 2,
            Self::OrderStatus => 3,
            Self::StockLevel => 4,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NewOrder => "NewOrder",
            Self::Payment => "Payment",
            Self::Delivery => "Delivery",
            Self::OrderStatus => "OrderStatus",
            Self::StockLevel => "StockLevel",
        }
    }

    /// `true` for the kinds that never write.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::OrderStatus | Self::StockLevel)
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One attempted transaction, successful or not.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub kind: TransactionKind,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub succeeded: bool,
}

impl TransactionRecord {
    #[must_use]
    pub const fn new(
        kind: TransactionKind,
        start: DateTime<Local>,
        end: DateTime<Local>,
        succeeded: bool,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            succeeded,
        }
    }

    #[must_use]
    pub fn latency(&self) -> Duration {
        self.end - self.start
    }
}
