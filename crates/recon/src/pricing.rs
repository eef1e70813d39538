//! Expected-price calculation contract.
//!
//! The engine finds the standard-price row for a bid; what the bid *should*
//! have been is a business rule supplied by the caller.

use crate::model::RowView;

/// Matched pair handed to a [`PriceCalculator`].
#[derive(Debug, Clone, Copy)]
pub struct PriceContext<'a> {
    /// The matched table A (standard price) row.
    pub standard: RowView<'a>,
    /// The table B (bid) row being checked.
    pub bid: RowView<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub expected_price: f64,
    pub delta: f64,
}

/// Computes the expected price and delta for a matched row.
///
/// Returning `None` leaves the row as `needs_review`.
pub trait PriceCalculator {
    fn quote(&self, ctx: &PriceContext<'_>) -> Option<PriceQuote>;
}

/// No pricing rules: every matched row needs review.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingPrice;

impl PriceCalculator for PendingPrice {
    fn quote(&self, _ctx: &PriceContext<'_>) -> Option<PriceQuote> {
        None
    }
}

impl<F> PriceCalculator for F
where
    F: Fn(&PriceContext<'_>) -> Option<PriceQuote>,
{
    fn quote(&self, ctx: &PriceContext<'_>) -> Option<PriceQuote> {
        self(ctx)
    }
}
