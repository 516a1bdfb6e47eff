//! Notification emails
//!
//! SES senders for the two domain events, plus the listener task that
//! bridges the event dispatcher to them. Send failures are logged and
//! contained here; they never reach the order-processing path.

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use tokio::sync::broadcast::error::RecvError;

use crate::events::{DomainEvent, EntryCreditAddedEvent, OrderPendingReviewEvent};
use crate::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub async fn send_credits_added(
    ses: &SesClient,
    from: &str,
    event: &EntryCreditAddedEvent,
) -> Result<(), BoxError> {
    let subject = Content::builder()
        .data("Your competition entries are ready")
        .build()?;

    let greeting = event.entrant_name.as_deref().unwrap_or("entrant");
    let body_text = format!(
        "Hi {greeting},\n\n\
         Your purchase has been confirmed: {} entry credit(s) have been\n\
         added to your account and are ready to use.\n\n\
         See you at the competition!",
        event.quantity
    );

    let body = Body::builder()
        .text(Content::builder().data(body_text).build()?)
        .build();

    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(&event.entrant_email).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;

    tracing::info!(to = %event.entrant_email, credit_id = %event.credit_id, "Credit-added email sent");
    Ok(())
}

pub async fn send_order_pending_review(
    ses: &SesClient,
    from: &str,
    review_inbox: &str,
    event: &OrderPendingReviewEvent,
) -> Result<(), BoxError> {
    let subject = Content::builder()
        .data("Order needs review before entry credits can be granted")
        .build()?;

    let body_text = format!(
        "An incoming order could not be resolved automatically.\n\n\
         Order:       {} ({})\n\
         Entrant:     {}\n\
         Competition: {}\n\
         Quantity:    {}\n\
         Reason:      {}\n\n\
         It is waiting in the review queue as pending order {}.",
        event.external_order_id,
        event.external_source,
        event.entrant_email,
        event.competition_id,
        event.quantity,
        reason_text(&event.reason),
        event.pending_order_id,
    );

    let body = Body::builder()
        .text(Content::builder().data(body_text).build()?)
        .build();

    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(review_inbox).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;

    tracing::info!(
        to = review_inbox,
        pending_order_id = %event.pending_order_id,
        "Pending-review email sent"
    );
    Ok(())
}

/// Map an enumerated reason code to human-readable text
fn reason_text(reason: &str) -> &str {
    match reason {
        crate::orders::REASON_COMPETITION_EXCLUSIVITY => {
            "entrant already holds credits for a different competition type in this event"
        }
        other => other,
    }
}

/// Subscribe to the dispatcher and send one email per event. Runs until the
/// dispatcher is dropped.
pub fn spawn_listener(state: &AppState) -> tokio::task::JoinHandle<()> {
    let mut rx = state.dispatcher.subscribe();
    let ses = state.ses.clone();
    let from = state.ses_from_email.clone();
    let review_inbox = state.review_notify_email.clone();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(DomainEvent::EntryCreditAdded(ev)) => {
                    if let Err(e) = send_credits_added(&ses, &from, &ev).await {
                        tracing::error!(
                            error = %e,
                            credit_id = %ev.credit_id,
                            to = %ev.entrant_email,
                            "Failed to send credit-added email"
                        );
                    }
                }
                Ok(DomainEvent::OrderPendingReview(ev)) => {
                    if let Err(e) =
                        send_order_pending_review(&ses, &from, &review_inbox, &ev).await
                    {
                        tracing::error!(
                            error = %e,
                            pending_order_id = %ev.pending_order_id,
                            "Failed to send pending-review email"
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Email listener lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
