use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{field, info, Span};

use crate::{
    mailing_list,
    web::{
        types::{ApiMessage, DataParsingError, SubscribeBody, ValidEmail},
        WebResult,
    },
    AppState,
};

pub const SUBSCRIBED_MSG: &str = "Subscribed";

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),

    #[error("the mailing list returned no subscriber id")]
    MissingSubscriberId,
    #[error("mailing list error: {0}")]
    MailingList(#[from] mailing_list::Error),
}

// ###################################
// ->   API
// ###################################
/// Creates (or re-activates) the subscriber with the mailing list provider,
/// then assigns them to the configured group.
#[tracing::instrument(
    name = "Relaying a new subscriber to the mailing list",
    skip_all,
    fields(subscriber_email = field::Empty, subscriber_id = field::Empty)
)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    payload: Result<Json<SubscribeBody>, JsonRejection>,
) -> WebResult<Json<ApiMessage>> {
    let Json(body) = payload.map_err(SubscribeError::Body)?;
    let email = ValidEmail::try_from(body).map_err(SubscribeError::DataParsing)?;
    Span::current().record("subscriber_email", email.as_ref());

    let client = &app_state.mailing_list_client;

    let record = client
        .create_or_update_subscriber(&email)
        .await
        .map_err(SubscribeError::MailingList)?;
    // Without an id there is nothing to put into the group.
    let subscriber_id = record.id().ok_or(SubscribeError::MissingSubscriberId)?;
    Span::current().record("subscriber_id", field::display(&subscriber_id));

    client
        .assign_subscriber_to_group(&subscriber_id, &app_state.group_id)
        .await
        .map_err(SubscribeError::MailingList)?;
    info!("SUCCESS");

    Ok(Json(ApiMessage::new(SUBSCRIBED_MSG)))
}
