use crate::error::ReceivingError;
use crate::models::{CreateReceiptRequest, EditReceiptRequest, ReceiptEntry, Report, ReportFormat};
use crate::service::ReceivingService;
use axum::{
    extract::{rejection::JsonRejection, Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 新增 / 编辑响应体
#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub success: bool,
    pub message: String,
    pub entry: ReceiptEntry,
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// 导出参数: ?format=xlsx|csv
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<ReportFormat>,
}

fn error_response(e: ReceivingError) -> Response {
    let status = e.status_code();
    if status.is_server_error() {
        tracing::error!("请求失败: {}", e);
    } else {
        tracing::warn!("请求被拒绝: {}", e);
    }
    let response = ErrorResponse {
        success: false,
        message: e.to_string(),
    };
    (status, Json(response)).into_response()
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ReceivingError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ReceivingError::Validation(format!("invalid JSON body: {}", e.body_text())))
}

fn download(report: Report) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", report.filename);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, report.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 查询物料信息 (含该 shipment 的预期数量)
pub async fn lookup_item(
    State(service): State<Arc<ReceivingService>>,
    Path((item_code, shipment_ref)): Path<(String, String)>,
) -> Response {
    match service.lookup_item(&item_code, &shipment_ref).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 收货记录列表, 最新在前
pub async fn list_receipts(State(service): State<Arc<ReceivingService>>) -> Response {
    match service.list_receipts().await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 新增收货记录
pub async fn create_receipt(
    State(service): State<Arc<ReceivingService>>,
    payload: Result<Json<CreateReceiptRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    match service.create_receipt(request).await {
        Ok(entry) => {
            let response = ReceiptResponse {
                success: true,
                message: format!("Receipt {} recorded", entry.id),
                entry,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// 编辑收货记录
pub async fn edit_receipt(
    State(service): State<Arc<ReceivingService>>,
    Path(id): Path<i64>,
    payload: Result<Json<EditReceiptRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    match service.edit_receipt(id, request).await {
        Ok(entry) => {
            let response = ReceiptResponse {
                success: true,
                message: format!("Receipt {} updated", entry.id),
                entry,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// 导出明细报表
pub async fn export_detail_report(
    State(service): State<Arc<ReceivingService>>,
    Query(query): Query<ExportQuery>,
) -> Response {
    match service
        .export_detail_report(query.format.unwrap_or_default())
        .await
    {
        Ok(report) => download(report),
        Err(e) => error_response(e),
    }
}

/// 导出汇总报表
pub async fn export_summary_report(
    State(service): State<Arc<ReceivingService>>,
    Query(query): Query<ExportQuery>,
) -> Response {
    match service
        .export_summary_report(query.format.unwrap_or_default())
        .await
    {
        Ok(report) => download(report),
        Err(e) => error_response(e),
    }
}
