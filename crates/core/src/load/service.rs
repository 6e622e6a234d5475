//! Load sheet service.
//!
//! Building a load is all-or-nothing: the whole selection is validated
//! before a single assignment is returned, so a half-loaded manifest can
//! never be persisted.

use std::collections::HashSet;

use chrono::Utc;
use haulbook_shared::types::{LoadId, OrderId, UserId};

use crate::load::error::LoadError;
use crate::load::types::{LoadPlan, LoadState, LoadTransition};
use crate::order::{OrderError, OrderService, OrderSnapshot, OrderStatus};

/// Stateless service for load sheet operations.
pub struct LoadService;

impl LoadService {
    /// Validate a selection of orders and plan their assignment to a new load.
    ///
    /// `orders` holds the snapshots found for the selection; a selected id
    /// missing from it is reported as not found.
    ///
    /// # Errors
    /// * `LoadError::EmptySelection` / `DuplicateOrder` / `MixedBusinessUnits`
    /// * `LoadError::Order(NotFound | InvalidTransition | AlreadyLoaded)` naming
    ///   the first offending order
    pub fn plan(
        load_id: LoadId,
        selection: &[OrderId],
        orders: &[OrderSnapshot],
        actor: UserId,
    ) -> Result<LoadPlan, LoadError> {
        if selection.is_empty() {
            return Err(LoadError::EmptySelection);
        }

        let mut seen = HashSet::with_capacity(selection.len());
        let mut business_unit = None;
        let mut assignments = Vec::with_capacity(selection.len());

        for order_id in selection {
            if !seen.insert(*order_id) {
                return Err(LoadError::DuplicateOrder(*order_id));
            }

            let order = orders
                .iter()
                .find(|o| o.id == *order_id)
                .ok_or(OrderError::NotFound(*order_id))?;

            if let Some(open_load) = order.open_load {
                return Err(OrderError::AlreadyLoaded {
                    order_id: order.id,
                    load_id: open_load,
                }
                .into());
            }
            if order.status != OrderStatus::Loading {
                return Err(OrderError::InvalidTransition {
                    order_id: order.id,
                    from: order.status,
                    to: OrderStatus::InTransit,
                }
                .into());
            }

            match business_unit {
                None => business_unit = Some(order.business_unit_id),
                Some(unit) if unit != order.business_unit_id => {
                    return Err(LoadError::MixedBusinessUnits(order.id));
                }
                Some(_) => {}
            }

            assignments.push(OrderService::assign_to_load(order, load_id, actor)?);
        }

        let business_unit_id = business_unit.ok_or(LoadError::EmptySelection)?;

        Ok(LoadPlan {
            load_id,
            business_unit_id,
            assignments,
        })
    }

    /// Format a human-readable load number, e.g. `LD-000042`.
    #[must_use]
    pub fn format_load_number(prefix: &str, width: usize, sequence: i64) -> String {
        format!("{prefix}-{sequence:0width$}")
    }

    /// Close an open load.
    ///
    /// # Errors
    /// * `LoadError::LoadClosed` if the load is already closed
    pub fn close(load: &LoadState, actor: UserId) -> Result<LoadTransition, LoadError> {
        Self::ensure_open(load)?;
        Ok(LoadTransition {
            load_id: load.id,
            actor,
            occurred_at: Utc::now(),
        })
    }

    /// Fail if the load no longer accepts changes.
    pub fn ensure_open(load: &LoadState) -> Result<(), LoadError> {
        if load.is_open {
            Ok(())
        } else {
            Err(LoadError::LoadClosed(load.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulbook_shared::types::BusinessUnitId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn loading_order(unit: BusinessUnitId, total: Decimal) -> OrderSnapshot {
        OrderSnapshot {
            id: OrderId::new(),
            business_unit_id: unit,
            status: OrderStatus::Loading,
            total_amount: total,
            dispatched_amount: None,
            open_load: None,
        }
    }

    #[test]
    fn test_plan_snapshots_every_order() {
        let unit = BusinessUnitId::new();
        let a = loading_order(unit, dec!(10000));
        let b = loading_order(unit, dec!(5000));
        let load_id = LoadId::new();

        let plan = LoadService::plan(load_id, &[a.id, b.id], &[b.clone(), a.clone()], UserId::new())
            .unwrap();

        assert_eq!(plan.business_unit_id, unit);
        assert_eq!(plan.assignments.len(), 2);
        assert_eq!(plan.assignments[0].transition.order_id, a.id);
        assert_eq!(plan.assignments[0].dispatched_amount, dec!(10000));
        assert_eq!(plan.assignments[1].dispatched_amount, dec!(5000));
        assert!(plan.assignments.iter().all(|x| x.load_id == load_id));
    }

    #[test]
    fn test_plan_rejects_empty_selection() {
        let result = LoadService::plan(LoadId::new(), &[], &[], UserId::new());
        assert_eq!(result, Err(LoadError::EmptySelection));
    }

    #[test]
    fn test_plan_rejects_duplicates() {
        let order = loading_order(BusinessUnitId::new(), dec!(1));
        let result = LoadService::plan(
            LoadId::new(),
            &[order.id, order.id],
            &[order.clone()],
            UserId::new(),
        );
        assert_eq!(result, Err(LoadError::DuplicateOrder(order.id)));
    }

    #[test]
    fn test_plan_names_missing_order() {
        let missing = OrderId::new();
        let result = LoadService::plan(LoadId::new(), &[missing], &[], UserId::new());
        assert_eq!(result, Err(LoadError::Order(OrderError::NotFound(missing))));
    }

    #[test]
    fn test_plan_fails_whole_batch_on_one_bad_order() {
        let unit = BusinessUnitId::new();
        let good = loading_order(unit, dec!(1));
        let mut checking = loading_order(unit, dec!(1));
        checking.status = OrderStatus::Checking;

        let result = LoadService::plan(
            LoadId::new(),
            &[good.id, checking.id],
            &[good, checking.clone()],
            UserId::new(),
        );
        assert!(matches!(
            result,
            Err(LoadError::Order(OrderError::InvalidTransition { order_id, .. })) if order_id == checking.id
        ));
    }

    #[test]
    fn test_plan_rejects_order_on_open_load() {
        let mut order = loading_order(BusinessUnitId::new(), dec!(1));
        order.open_load = Some(LoadId::new());
        let result = LoadService::plan(LoadId::new(), &[order.id], &[order.clone()], UserId::new());
        assert!(matches!(
            result,
            Err(LoadError::Order(OrderError::AlreadyLoaded { .. }))
        ));
    }

    #[test]
    fn test_plan_rejects_mixed_business_units() {
        let a = loading_order(BusinessUnitId::new(), dec!(1));
        let b = loading_order(BusinessUnitId::new(), dec!(1));
        let result = LoadService::plan(
            LoadId::new(),
            &[a.id, b.id],
            &[a, b.clone()],
            UserId::new(),
        );
        assert_eq!(result, Err(LoadError::MixedBusinessUnits(b.id)));
    }

    #[test]
    fn test_format_load_number() {
        assert_eq!(LoadService::format_load_number("LD", 6, 42), "LD-000042");
        assert_eq!(LoadService::format_load_number("TRK", 2, 1234), "TRK-1234");
    }

    #[test]
    fn test_close_once() {
        let load = LoadState {
            id: LoadId::new(),
            is_open: true,
        };
        let transition = LoadService::close(&load, UserId::new()).unwrap();
        assert_eq!(transition.history().new_state, "closed");

        let closed = LoadState {
            is_open: false,
            ..load
        };
        assert_eq!(
            LoadService::close(&closed, UserId::new()),
            Err(LoadError::LoadClosed(load.id))
        );
    }
}
