//! Provider webhook endpoints, one per subscription event kind.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    middleware,
    routing::post,
};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::{
    adapters::http::{app_state::AppState, middleware::verify_signature_middleware},
    app_error::AppResult,
    application::{
        helpers::event_parsing::parse_subscription_event,
        use_cases::notification::Notification,
    },
    domain::entities::subscription_event::SubscriptionEventKind,
};

pub fn router(app_state: AppState) -> Router<AppState> {
    let mut router = Router::new();
    for &kind in SubscriptionEventKind::all() {
        router = router.route(
            &format!("/{}", kind.route_segment()),
            post(move |state: State<AppState>, body: Bytes| handle_event(state, kind, body)),
        );
    }
    router.route_layer(middleware::from_fn_with_state(
        app_state,
        verify_signature_middleware,
    ))
}

/// POST /subscription/{kind}
///
/// Acknowledges anything that authenticated, except transient store failures,
/// which return 503 so the provider redelivers.
async fn handle_event(
    State(app_state): State<AppState>,
    kind: SubscriptionEventKind,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let event = match parse_subscription_event(&body, kind) {
        Ok(event) => event,
        Err(e) => {
            warn!(kind = %kind, field = e.field(), error = %e, "Malformed subscription event");
            app_state
                .dispatcher
                .dispatch(Notification::parse_failure(kind, &e));
            return Ok(received());
        }
    };

    match app_state.sync_use_cases.reconcile(&event).await {
        Ok(outcome) => {
            info!(
                kind = %kind,
                subscription_id = %event.subscription_id,
                payment_id = outcome.id(),
                "Subscription event reconciled"
            );
            app_state
                .dispatcher
                .dispatch(Notification::success(&event, outcome));
            Ok(received())
        }
        Err(e) if e.is_retryable() => {
            error!(
                kind = %kind,
                subscription_id = %event.subscription_id,
                error = %e,
                retryable = true,
                "Subscription event failed, asking provider to retry"
            );
            app_state
                .dispatcher
                .dispatch(Notification::failure(&event, &e));
            Err(e)
        }
        Err(e) => {
            warn!(
                kind = %kind,
                subscription_id = %event.subscription_id,
                error = %e,
                retryable = false,
                "Subscription event rejected"
            );
            app_state
                .dispatcher
                .dispatch(Notification::failure(&event, &e));
            Ok(received())
        }
    }
}

fn received() -> Json<Value> {
    Json(json!({ "status": "received" }))
}
