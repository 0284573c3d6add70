//! The status annotator: derives the `status` column from `total_price`.

use crate::event::{AnnotatedEvent, PurchaseEvent, Status};

/// Adds the derived `status` field to an already-validated event.
///
/// Total and deterministic: every input yields exactly one output, and the
/// status is a pure function of the sign of `total_price`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Annotator;

impl Annotator {
    pub fn new() -> Self {
        Self
    }

    /// A positive total is a success; zero and negative totals are failures.
    pub fn annotate(&self, event: PurchaseEvent) -> AnnotatedEvent {
        let status = if event.total_price > 0.0 {
            Status::Success
        } else {
            Status::Failed
        };

        AnnotatedEvent { event, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with_total(total_price: f64) -> PurchaseEvent {
        PurchaseEvent {
            event_id: "abc".into(),
            customer_id: 7,
            product_id: 3,
            quantity: 2,
            unit_price: 10.5,
            total_price,
            created_at: "2024-01-01T10:00:00Z".into(),
        }
    }

    #[test]
    fn positive_total_is_success() {
        let annotated = Annotator::new().annotate(event_with_total(21.0));
        assert_eq!(annotated.status, Status::Success);
    }

    #[test]
    fn zero_total_is_failed() {
        let annotated = Annotator::new().annotate(event_with_total(0.0));
        assert_eq!(annotated.status, Status::Failed);
    }

    #[test]
    fn negative_total_is_failed() {
        let annotated = Annotator::new().annotate(event_with_total(-5.0));
        assert_eq!(annotated.status, Status::Failed);
    }

    #[test]
    fn annotation_preserves_the_record() {
        let event = event_with_total(21.0);
        let annotated = Annotator::new().annotate(event.clone());
        assert_eq!(annotated.event, event);
    }
}
