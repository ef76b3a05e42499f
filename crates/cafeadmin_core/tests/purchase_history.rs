use cafeadmin_core::{
    ApiEnvelope, ApiRequest, ApiTransport, Endpoints, ManualClock, Method, PurchaseHistoryService,
    RecordClient, RecordId, TransportError,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

struct SalesBackend {
    replies: HashMap<String, Result<Value, TransportError>>,
}

impl ApiTransport for SalesBackend {
    fn send(&self, request: &ApiRequest) -> Result<ApiEnvelope, TransportError> {
        assert_eq!(request.method, Method::Get);
        match self.replies.get(&request.path) {
            Some(Ok(data)) => Ok(ApiEnvelope::ok(data.clone())),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(ApiEnvelope::failure("sale not found")),
        }
    }
}

fn client(replies: Vec<(&str, Result<Value, TransportError>)>) -> RecordClient<SalesBackend> {
    let backend = SalesBackend {
        replies: replies
            .into_iter()
            .map(|(path, reply)| (path.to_string(), reply))
            .collect(),
    };
    RecordClient::new(backend, Endpoints::default(), Arc::new(ManualClock::new(0)))
}

#[test]
fn history_joins_headers_with_line_items() {
    let client = client(vec![
        (
            "/sales",
            Ok(json!([
                {"id": 1, "customer_id": 7, "total": 9.5},
                {"id": 2, "customer_id": 8, "total": 3.0},
                {"id": 1, "customer_id": 7, "total": 9.5},
            ])),
        ),
        (
            "/sales/1",
            Ok(json!({"id": 1, "customer_id": 7, "total": 9.5, "items": [
                {"product_name": "Empanada", "quantity": 2, "unit_price": 2.5, "subtotal": 5.0},
                {"product_name": "Jugo", "quantity": 1, "unit_price": 4.5, "subtotal": 4.5}
            ]})),
        ),
    ]);

    let history = PurchaseHistoryService::new(&client)
        .customer_history(&RecordId::from(7))
        .unwrap();

    assert_eq!(history.len(), 1);
    assert!(history[0].detail_loaded);
    assert_eq!(history[0].item_count(), 2);
    assert_eq!(history[0].items[0].product_name, "Empanada");
}

#[test]
fn missing_detail_falls_back_to_header_only() {
    let client = client(vec![
        (
            "/sales",
            Ok(json!([
                {"id": 3, "customer_id": "7", "total": 12.0},
                {"_id": 4, "customer_id": 7, "total": 1.0},
            ])),
        ),
        ("/sales/4", Err(TransportError::new("Network Error"))),
    ]);

    let history = PurchaseHistoryService::new(&client)
        .customer_history(&RecordId::from(7))
        .unwrap();

    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|entry| !entry.detail_loaded));
    assert!(history.iter().all(|entry| entry.items.is_empty()));
    assert_eq!(history[1].sale.total, 1.0);
}

#[test]
fn failing_sales_list_is_an_error() {
    let client = client(vec![("/sales", Err(TransportError::new("Network Error")))]);
    let err = PurchaseHistoryService::new(&client)
        .customer_history(&RecordId::from(7))
        .unwrap_err();
    assert_eq!(err.user_message(), "Network Error");
}
