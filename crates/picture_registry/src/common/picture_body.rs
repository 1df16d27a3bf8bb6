use axum::{
    body::Bytes,
    extract::{
        FromRequest, Request,
        rejection::{BytesRejection, FailedToBufferBody},
    },
    http::header,
};
use mime::Mime;
use serde_json::Value;

use super::error::ApiError;
use crate::db::Fields;

/// Client fields of a picture to create, pulled from a JSON request body.
#[derive(Debug)]
pub struct PictureBody(pub Fields);

impl<S> FromRequest<S> for PictureBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(&req) {
            return Err(ApiError::MissingJson);
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| match e {
                BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_)) => {
                    ApiError::PayloadTooLarge
                }
                e => {
                    tracing::warn!("cannot read request body: {e}");
                    ApiError::MissingJson
                }
            })?;
        if bytes.is_empty() {
            return Err(ApiError::MissingJson);
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!("malformed JSON body: {e}");
            ApiError::MissingJson
        })?;

        match value {
            Value::Object(fields) if !fields.is_empty() => Ok(PictureBody(fields)),
            _ => Err(ApiError::InvalidPicture),
        }
    }
}

fn has_json_content_type(req: &Request) -> bool {
    let Some(ct) = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.parse::<Mime>().ok())
    else {
        return false;
    };

    ct.type_() == mime::APPLICATION
        && (ct.subtype() == mime::JSON || ct.suffix() == Some(mime::JSON))
}
