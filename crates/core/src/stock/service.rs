//! Stock ledger service.
//!
//! Each operation validates every line against the current positions before
//! producing a plan, so a batch either applies completely or not at all.
//! Lines naming the same product are summed first.

use std::collections::{BTreeMap, BTreeSet};

use haulbook_shared::types::{LocationId, ProductId};
use rust_decimal::Decimal;

use crate::stock::error::StockError;
use crate::stock::types::{
    AdjustmentLine, DamageLine, MovementKind, StockKey, StockMovement, StockPlan, StockPosition,
    TransferLine,
};

/// Stateless service computing stock changes.
pub struct StockService;

impl StockService {
    /// Raise good quantities at a location.
    ///
    /// Used for purchase receipts and free-issue claim conversions.
    pub fn receive(
        location_id: LocationId,
        items: &[(ProductId, Decimal)],
        positions: &[StockPosition],
        kind: MovementKind,
        note: Option<&str>,
    ) -> Result<StockPlan, StockError> {
        let totals = Self::sum_positive(items.iter().copied())?;
        let mut plan = StockPlan::default();
        for (product_id, quantity) in totals {
            let current = Self::current(positions, (location_id, product_id));
            Self::push(&mut plan, current, kind, quantity, Decimal::ZERO, note);
        }
        Ok(plan)
    }

    /// Move good stock to damaged.
    ///
    /// The movement note lists the distinct damage types of the product's
    /// lines, followed by the optional batch reason.
    ///
    /// # Errors
    /// * `StockError::InsufficientStock` naming the first product whose good
    ///   quantity cannot cover the summed damage
    pub fn damage(
        location_id: LocationId,
        lines: &[DamageLine],
        positions: &[StockPosition],
        reason: Option<&str>,
    ) -> Result<StockPlan, StockError> {
        let totals = Self::sum_positive(lines.iter().map(|l| (l.product_id, l.quantity)))?;
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());

        let mut plan = StockPlan::default();
        for (product_id, quantity) in totals {
            let current = Self::current(positions, (location_id, product_id));
            Self::ensure_available(&current, quantity)?;

            let types: BTreeSet<&str> = lines
                .iter()
                .filter(|l| l.product_id == product_id)
                .map(|l| l.damage_type.trim())
                .filter(|t| !t.is_empty())
                .collect();
            let types = types.into_iter().collect::<Vec<_>>().join(", ");
            let note = match (types.is_empty(), reason) {
                (false, Some(reason)) => Some(format!("{types}: {reason}")),
                (false, None) => Some(types),
                (true, reason) => reason.map(ToString::to_string),
            };

            Self::push(
                &mut plan,
                current,
                MovementKind::Damage,
                -quantity,
                quantity,
                note.as_deref(),
            );
        }
        Ok(plan)
    }

    /// Set good quantities to counted values.
    ///
    /// Products whose count matches the books are left alone.
    pub fn adjust(
        location_id: LocationId,
        lines: &[AdjustmentLine],
        positions: &[StockPosition],
        reason: Option<&str>,
    ) -> Result<StockPlan, StockError> {
        if lines.is_empty() {
            return Err(StockError::Validation(
                "At least one line is required".to_string(),
            ));
        }
        let mut counted = BTreeMap::new();
        for (index, line) in lines.iter().enumerate() {
            if line.new_quantity < Decimal::ZERO {
                return Err(StockError::Validation(format!(
                    "Line {index}: quantity must not be negative"
                )));
            }
            if counted.insert(line.product_id, line.new_quantity).is_some() {
                return Err(StockError::Validation(format!(
                    "Line {index}: product {} is counted twice",
                    line.product_id
                )));
            }
        }

        let mut plan = StockPlan::default();
        for (product_id, new_quantity) in counted {
            let current = Self::current(positions, (location_id, product_id));
            let delta = new_quantity - current.good_quantity;
            if !delta.is_zero() {
                Self::push(
                    &mut plan,
                    current,
                    MovementKind::Adjustment,
                    delta,
                    Decimal::ZERO,
                    reason,
                );
            }
        }
        Ok(plan)
    }

    /// Move good stock between two locations.
    pub fn transfer(
        from: LocationId,
        to: LocationId,
        lines: &[TransferLine],
        positions: &[StockPosition],
    ) -> Result<StockPlan, StockError> {
        if from == to {
            return Err(StockError::Validation(
                "Source and destination locations must differ".to_string(),
            ));
        }
        let totals = Self::sum_positive(lines.iter().map(|l| (l.product_id, l.quantity)))?;

        let mut plan = StockPlan::default();
        for (product_id, quantity) in totals {
            let source = Self::current(positions, (from, product_id));
            Self::ensure_available(&source, quantity)?;
            let destination = Self::current(positions, (to, product_id));

            Self::push(
                &mut plan,
                source,
                MovementKind::TransferOut,
                -quantity,
                Decimal::ZERO,
                None,
            );
            Self::push(
                &mut plan,
                destination,
                MovementKind::TransferIn,
                quantity,
                Decimal::ZERO,
                None,
            );
        }
        Ok(plan)
    }

    /// Order in which positions must be locked.
    #[must_use]
    pub fn lock_order(mut keys: Vec<StockKey>) -> Vec<StockKey> {
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    fn sum_positive(
        items: impl Iterator<Item = (ProductId, Decimal)>,
    ) -> Result<BTreeMap<ProductId, Decimal>, StockError> {
        let mut totals = BTreeMap::new();
        for (index, (product_id, quantity)) in items.enumerate() {
            if quantity <= Decimal::ZERO {
                return Err(StockError::Validation(format!(
                    "Line {index}: quantity must be positive"
                )));
            }
            *totals.entry(product_id).or_insert(Decimal::ZERO) += quantity;
        }
        if totals.is_empty() {
            return Err(StockError::Validation(
                "At least one line is required".to_string(),
            ));
        }
        Ok(totals)
    }

    fn ensure_available(position: &StockPosition, requested: Decimal) -> Result<(), StockError> {
        if position.good_quantity < requested {
            return Err(StockError::InsufficientStock {
                location_id: position.location_id,
                product_id: position.product_id,
                available: position.good_quantity,
                requested,
            });
        }
        Ok(())
    }

    fn current(positions: &[StockPosition], key: StockKey) -> StockPosition {
        positions
            .iter()
            .find(|p| p.key() == key)
            .copied()
            .unwrap_or_else(|| StockPosition::empty(key.0, key.1))
    }

    fn push(
        plan: &mut StockPlan,
        current: StockPosition,
        kind: MovementKind,
        good_delta: Decimal,
        damaged_delta: Decimal,
        note: Option<&str>,
    ) {
        let updated = StockPosition {
            good_quantity: current.good_quantity + good_delta,
            damaged_quantity: current.damaged_quantity + damaged_delta,
            ..current
        };
        plan.movements.push(StockMovement {
            location_id: current.location_id,
            product_id: current.product_id,
            kind,
            good_delta,
            damaged_delta,
            good_after: updated.good_quantity,
            damaged_after: updated.damaged_quantity,
            note: note.map(ToString::to_string),
        });
        plan.positions.push(updated);
    }
}
