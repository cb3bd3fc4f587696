use std::sync::RwLock;

use rust_decimal::Decimal;
use tracing::info;

use crate::models::{AppliedCoupon, AppliedOffer};

#[derive(Debug, Clone, Default)]
struct OffersState {
    coupon: Option<AppliedCoupon>,
    offer: Option<AppliedOffer>,
}

/// Holds at most one applied coupon and one applied cart-level offer,
/// computed by server-side validation before being committed here. Pure
/// in-memory state: no persistence, no network calls, nothing survives a
/// restart.
///
/// Mutual exclusion between coupon and offer is a caller-side business
/// rule; the store accepts both slots being occupied at once.
#[derive(Debug, Default)]
pub struct OffersStore {
    state: RwLock<OffersState>,
}

impl OffersStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_applied_coupon(&self, coupon: AppliedCoupon) {
        info!(code = %coupon.code, discount = %coupon.discount, "coupon applied");
        self.state.write().unwrap().coupon = Some(coupon);
    }

    pub fn remove_applied_coupon(&self) {
        if self.state.write().unwrap().coupon.take().is_some() {
            info!("coupon removed");
        }
    }

    pub fn set_applied_offer(&self, offer: AppliedOffer) {
        info!(offer_id = %offer.offer_id, discount = %offer.discount, "offer applied");
        self.state.write().unwrap().offer = Some(offer);
    }

    pub fn remove_applied_offer(&self) {
        if self.state.write().unwrap().offer.take().is_some() {
            info!("offer removed");
        }
    }

    pub fn clear_all(&self) {
        *self.state.write().unwrap() = OffersState::default();
    }

    pub fn applied_coupon(&self) -> Option<AppliedCoupon> {
        self.state.read().unwrap().coupon.clone()
    }

    pub fn applied_offer(&self) -> Option<AppliedOffer> {
        self.state.read().unwrap().offer.clone()
    }

    /// Sum of whichever discounts are present.
    pub fn total_discount(&self) -> Decimal {
        let state = self.state.read().unwrap();
        state
            .coupon
            .as_ref()
            .map(|c| c.discount)
            .unwrap_or_default()
            + state.offer.as_ref().map(|o| o.discount).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscountType;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn coupon(discount: Decimal) -> AppliedCoupon {
        AppliedCoupon {
            code: "SAVE10".to_string(),
            discount_type: DiscountType::Fixed,
            discount,
        }
    }

    fn offer(discount: Decimal) -> AppliedOffer {
        AppliedOffer {
            offer_id: Uuid::from_u128(1),
            name: "Bundle deal".to_string(),
            discount_type: DiscountType::Percentage,
            discount,
        }
    }

    #[test]
    fn total_discount_sums_present_slots() {
        let store = OffersStore::new();
        assert_eq!(store.total_discount(), Decimal::ZERO);

        store.set_applied_coupon(coupon(dec!(10)));
        assert_eq!(store.total_discount(), dec!(10));

        store.set_applied_offer(offer(dec!(5.50)));
        assert_eq!(store.total_discount(), dec!(15.50));
    }

    #[test]
    fn coupon_and_offer_may_coexist() {
        // Mutual exclusion is enforced by callers, not here.
        let store = OffersStore::new();
        store.set_applied_coupon(coupon(dec!(10)));
        store.set_applied_offer(offer(dec!(5)));

        assert!(store.applied_coupon().is_some());
        assert!(store.applied_offer().is_some());
    }

    #[test]
    fn clear_all_resets_both_slots() {
        let store = OffersStore::new();
        store.set_applied_coupon(coupon(dec!(10)));
        store.set_applied_offer(offer(dec!(5)));
        store.clear_all();

        assert!(store.applied_coupon().is_none());
        assert!(store.applied_offer().is_none());
        assert_eq!(store.total_discount(), Decimal::ZERO);
    }

    #[test]
    fn removing_replaces_only_the_named_slot() {
        let store = OffersStore::new();
        store.set_applied_coupon(coupon(dec!(10)));
        store.set_applied_offer(offer(dec!(5)));

        store.remove_applied_coupon();
        assert!(store.applied_coupon().is_none());
        assert_eq!(store.total_discount(), dec!(5));
    }
}
