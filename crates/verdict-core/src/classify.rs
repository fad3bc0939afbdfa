use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{Failure, FieldError};

/// What the client is told about a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: StatusCode,
    pub message: String,
    pub fields: Vec<FieldError>,
}

impl Classification {
    #[must_use]
    pub fn into_envelope(self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: self.message,
            fields: (!self.fields.is_empty()).then_some(self.fields),
        }
    }
}

/// Error body sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

/// Decide the status, message and field list for a failure
///
/// Annotation layers are ignored. An [`ApplicationError`](crate::ApplicationError)
/// at the root keeps its status and fields; anything else is a 500. Below
/// 500 the root error's own text is shown, otherwise only the generic
/// phrase for the status.
#[must_use]
pub fn classify(failure: &Failure) -> Classification {
    let Some(application) = failure.as_application() else {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        return Classification {
            status,
            message: generic_message(status),
            fields: Vec::new(),
        };
    };

    let status = application.status();
    let message = if status.as_u16() < 500 {
        application.to_string()
    } else {
        generic_message(status)
    };

    Classification {
        status,
        message,
        fields: application.fields().to_vec(),
    }
}

/// Fixed client-facing phrase for a status code
#[must_use]
pub fn generic_message(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Internal Server Error").to_owned()
}
