//! Car entry and listing models

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use carlot::{ListingQuery, SubmissionError, SubmissionErrorKind, Submitted};
use serde::{Deserialize, Serialize};

/// Query parameters of the listing
///
/// Values are kept as text so that junk falls back to the defaults instead of
/// failing the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ListingParams {
    pub fn to_query(&self, default_page_size: u64, max_page_size: u64) -> ListingQuery {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        ListingQuery::from_params(
            parse(&self.page),
            parse(&self.page_size),
            default_page_size,
            max_page_size,
        )
    }
}

/// JSON reply to a car entry submission
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,

    /// Failure classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<SubmissionErrorKind>,

    /// Form field the message belongs next to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// A submission outcome paired with its HTTP status
#[derive(Debug)]
pub struct SubmitReply {
    pub status: StatusCode,
    pub body: SubmitResponse,
}

impl From<Submitted> for SubmitReply {
    fn from(submitted: Submitted) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: SubmitResponse {
                success: true,
                message: submitted.message.to_string(),
                code: None,
                field: None,
            },
        }
    }
}

impl From<SubmissionError> for SubmitReply {
    fn from(error: SubmissionError) -> Self {
        let kind = error.kind();
        let status = match kind {
            SubmissionErrorKind::InvalidToken => StatusCode::FORBIDDEN,
            SubmissionErrorKind::MissingFields => StatusCode::BAD_REQUEST,
            SubmissionErrorKind::DuplicateName => StatusCode::CONFLICT,
            SubmissionErrorKind::InsertFailed | SubmissionErrorKind::UploadFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self {
            status,
            body: SubmitResponse {
                success: false,
                message: error.to_string(),
                code: Some(kind),
                field: error.field().map(str::to_string),
            },
        }
    }
}

impl IntoResponse for SubmitReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carlot::RecordId;

    #[test]
    fn test_listing_params_tolerate_junk() {
        let params = ListingParams {
            page: Some("abc".to_string()),
            page_size: Some(" 5 ".to_string()),
        };
        let query = params.to_query(10, 100);
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 5);
    }

    #[test]
    fn test_duplicate_reply_routes_to_name_field() {
        let reply = SubmitReply::from(SubmissionError::DuplicateName("Ford Car".to_string()));
        assert_eq!(reply.status, StatusCode::CONFLICT);
        assert_eq!(reply.body.field.as_deref(), Some("carName"));
        assert_eq!(reply.body.message, "Car name already exists.");

        let json = serde_json::to_value(&reply.body).unwrap();
        assert_eq!(json["code"], "duplicate_name");
        assert_eq!(json["success"], false);
    }

    #[test]
    fn test_success_reply_omits_error_fields() {
        let reply = SubmitReply::from(Submitted {
            record: RecordId(1),
            message: "Car added successfully.",
        });
        assert_eq!(reply.status, StatusCode::CREATED);

        let json = serde_json::to_value(&reply.body).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("code").is_none());
        assert!(json.get("field").is_none());
    }
}
