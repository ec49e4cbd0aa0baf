use std::sync::Arc;

use axum::{
    http::{Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::web::{log, types::ApiMessage, Error, REQUEST_ID_HEADER};

/// Turns a `web::Error` stashed in the response extensions into the JSON body the client sees,
/// and writes a log line for every request.
pub async fn response_mapper(req_method: Method, uri: Uri, resp: Response) -> Response {
    let request_id = resp.headers().get(REQUEST_ID_HEADER).cloned();
    let req_id = request_id
        .as_ref()
        .and_then(|id| id.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let web_error = resp.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    if let Some(er) = web_error {
        tracing::error!("SERVER ERROR: {er:?} ID: {req_id}");
    }
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let mut res = (*status, Json(ApiMessage::new(cl_err.to_string()))).into_response();
        if let Some(id) = request_id.clone() {
            res.headers_mut().insert(REQUEST_ID_HEADER, id);
        }
        res
    });

    log::log_request(
        &req_id,
        &req_method,
        &uri,
        resp.status(),
        web_error,
        client_status_and_error.as_ref(),
    );

    err_resp.unwrap_or(resp)
}
