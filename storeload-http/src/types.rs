use std::time::Duration;

use serde::Serialize;
use storeload_core::PurchaseRequest;

pub const DEFAULT_BASE_PATH: &str = "store_a2_server_war";

/// Socket-level timeouts, set once when the transport is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportTimeouts {
    pub connect: Duration,
    /// Bounds the whole exchange: write, wait for the status, drain the body.
    pub request: Duration,
}

impl Default for TransportTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(60),
            request: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PurchaseBody {
    items: Vec<PurchaseBodyItem>,
}

#[derive(Debug, Serialize)]
struct PurchaseBodyItem {
    #[serde(rename = "itemID")]
    item_id: String,
    #[serde(rename = "numberOfItems")]
    number_of_items: u32,
}

impl From<&PurchaseRequest> for PurchaseBody {
    fn from(p: &PurchaseRequest) -> Self {
        Self {
            items: p
                .items
                .iter()
                .map(|i| PurchaseBodyItem {
                    item_id: i.item_id.to_string(),
                    number_of_items: i.quantity,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use storeload_core::PurchaseItem;

    #[test]
    fn body_uses_service_field_names() {
        let p = PurchaseRequest {
            store_id: 1,
            customer_id: 1001,
            date: storeload_core::default_date(),
            items: vec![
                PurchaseItem {
                    item_id: 17,
                    quantity: 1,
                },
                PurchaseItem {
                    item_id: 99,
                    quantity: 1,
                },
            ],
        };

        let json = serde_json::to_string(&PurchaseBody::from(&p)).unwrap();
        assert_eq!(
            json,
            r#"{"items":[{"itemID":"17","numberOfItems":1},{"itemID":"99","numberOfItems":1}]}"#
        );
    }
}
