//! Wire types for the provider's orders API.
//!
//! These mirror the provider's JSON shapes and never leave the adapter.

use serde::{Deserialize, Serialize};

use crate::domain::ports::{OrderRequest, ProviderOrder};

/// Request body for `POST /orders`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateOrderDto<'a> {
    /// Amount in minor currency units, per the provider wire convention.
    pub amount: i64,
    pub currency: &'a str,
    pub receipt: &'a str,
    pub notes: OrderNotesDto<'a>,
}

/// Audit metadata attached to the order.
#[derive(Debug, Serialize)]
pub(crate) struct OrderNotesDto<'a> {
    pub user_id: &'a str,
    pub course_id: &'a str,
    /// Amount in major units, kept readable for back-office inspection.
    pub amount: u32,
}

impl<'a> CreateOrderDto<'a> {
    pub fn from_request(request: &'a OrderRequest) -> Self {
        Self {
            amount: request.amount_minor,
            currency: &request.currency,
            receipt: &request.receipt,
            notes: OrderNotesDto {
                user_id: request.notes.user_id.as_ref(),
                course_id: request.notes.course_id.as_ref(),
                amount: request.notes.amount,
            },
        }
    }
}

/// Order representation returned by the provider.
#[derive(Debug, Deserialize)]
pub(crate) struct OrderDto {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

impl From<OrderDto> for ProviderOrder {
    fn from(dto: OrderDto) -> Self {
        Self {
            id: dto.id,
            amount_minor: dto.amount,
            currency: dto.currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::OrderNotes;
    use crate::domain::{CourseId, UserId};

    #[test]
    fn order_request_serialises_to_provider_shape() {
        let request = OrderRequest {
            amount_minor: 49_900,
            currency: "INR".into(),
            receipt: "rcpt_abc".into(),
            notes: OrderNotes {
                user_id: UserId::random(),
                course_id: CourseId::random(),
                amount: 499,
            },
        };
        let json =
            serde_json::to_value(CreateOrderDto::from_request(&request)).expect("serializes");
        assert_eq!(json["amount"], 49_900);
        assert_eq!(json["currency"], "INR");
        assert_eq!(json["receipt"], "rcpt_abc");
        assert_eq!(json["notes"]["amount"], 499);
    }

    #[test]
    fn order_dto_decodes_provider_payload() {
        let body = r#"{
            "id": "order_MhVZ7LNyFs",
            "entity": "order",
            "amount": 49900,
            "amount_paid": 0,
            "currency": "INR",
            "status": "created"
        }"#;
        let dto: OrderDto = serde_json::from_str(body).expect("decodes");
        let order = ProviderOrder::from(dto);
        assert_eq!(order.id, "order_MhVZ7LNyFs");
        assert_eq!(order.amount_minor, 49_900);
    }
}
