// SDK <-> domain conversions and error mapping

use aws_sdk_sqs::error::{DisplayErrorContext, SdkError};
use aws_sdk_sqs::operation::delete_message::DeleteMessageError;
use aws_sdk_sqs::types::Message as SqsMessage;
use sqs_listener_core::domain::Message;
use sqs_listener_core::ListenerError;
use tracing::warn;

/// Convert an SDK message into a domain message
///
/// A delivery without a receipt handle cannot be deleted, so it is skipped.
/// A missing body becomes an empty string (the handler rejects it).
pub(crate) fn into_domain(message: SqsMessage) -> Option<Message> {
    let SqsMessage {
        message_id,
        receipt_handle,
        body,
        ..
    } = message;

    let Some(receipt_handle) = receipt_handle else {
        warn!(message_id = ?message_id, "Skipping message without receipt handle");
        return None;
    };

    Some(Message {
        receipt_handle,
        message_id,
        body: body.unwrap_or_default(),
    })
}

/// The receipt handle no longer refers to a live delivery
///
/// Treated as success by delete: the message is gone either way.
pub(crate) fn is_already_gone(err: &DeleteMessageError) -> bool {
    err.is_receipt_handle_is_invalid()
}

pub(crate) fn transient<E, R>(context: &str, err: SdkError<E, R>) -> ListenerError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    ListenerError::Transient(format!("{}: {}", context, DisplayErrorContext(&err)))
}

pub(crate) fn connectivity<E, R>(context: &str, err: SdkError<E, R>) -> ListenerError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    ListenerError::Connectivity(format!("{}: {}", context, DisplayErrorContext(&err)))
}
