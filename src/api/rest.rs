use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

use crate::encoding::code::CodeError;
use crate::error::RxError;
use crate::log::API;
use crate::prescription::draft::PrescriptionDraft;
use crate::prescription::Prescription;
use crate::service::PrescriptionService;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    fn success(message: &str, data: impl Serialize) -> Self {
        ApiResponse {
            status: "success".to_string(),
            message: message.to_string(),
            data: serde_json::to_value(data).ok(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        ApiResponse {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QrPayloadResponse {
    payload: String,
}

fn reply(response: ApiResponse, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&response), status)
}

fn error_reply(err: RxError) -> WithStatus<Json> {
    let status = match &err {
        RxError::Draft(_) | RxError::Code(CodeError::Invalid(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(target: API, error = %err, "Request failed");
    } else {
        warn!(target: API, error = %err, "Request rejected");
    }
    reply(ApiResponse::error(err.to_string()), status)
}

pub struct RestApi {
    service: Arc<PrescriptionService>,
}

impl RestApi {
    pub fn new(service: Arc<PrescriptionService>) -> Self {
        RestApi { service }
    }

    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        self.create_prescription()
            .or(self.get_prescription())
            .or(self.get_dashboard())
            .or(self.post_qr_payload())
            .recover(handle_rejection)
    }

    fn create_prescription(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let service = Arc::clone(&self.service);

        warp::path!("prescriptions")
            .and(warp::post())
            .and(warp::body::json())
            .map(move |draft: PrescriptionDraft| match service.create(draft) {
                Ok(view) => reply(
                    ApiResponse::success("Prescription created", view),
                    StatusCode::CREATED,
                ),
                Err(err) => error_reply(err),
            })
    }

    fn get_prescription(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let service = Arc::clone(&self.service);

        warp::path!("prescriptions" / String)
            .and(warp::get())
            .map(move |code: String| match service.lookup(&code) {
                Ok(Some(view)) => {
                    reply(ApiResponse::success("Prescription found", view), StatusCode::OK)
                }
                Ok(None) => reply(
                    ApiResponse::error("No prescription found with this code"),
                    StatusCode::NOT_FOUND,
                ),
                Err(err) => error_reply(err),
            })
    }

    fn get_dashboard(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let service = Arc::clone(&self.service);

        warp::path!("doctors" / String / "dashboard")
            .and(warp::get())
            .map(move |doctor_id: String| match service.dashboard(&doctor_id) {
                Ok(summary) => reply(ApiResponse::success("Dashboard", summary), StatusCode::OK),
                Err(err) => error_reply(err),
            })
    }

    fn post_qr_payload(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let service = Arc::clone(&self.service);

        warp::path!("qr-payload")
            .and(warp::post())
            .and(warp::body::json())
            .map(move |prescription: Prescription| {
                let payload = QrPayloadResponse {
                    payload: service.qr_payload(&prescription),
                };
                reply(ApiResponse::success("QR payload", payload), StatusCode::OK)
            })
    }
}

async fn handle_rejection(rejection: Rejection) -> Result<WithStatus<Json>, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", err))
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        warn!(target: API, ?rejection, "Unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
    };
    Ok(reply(ApiResponse::error(message), status))
}
