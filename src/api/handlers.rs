use crate::error::BillError;
use crate::models::{Bill, BillDraft, ItemEdit};
use crate::db::queries::export_bills_csv;
use crate::service::{BillDesk, BillSummary};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// 列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// 删除确认参数
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

/// 请求体: 明细行 (金额由服务端计算)
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    #[serde(default)]
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: Option<String>,
    pub rate: BigDecimal,
}

/// 请求体: 单据
#[derive(Debug, Deserialize)]
pub struct BillRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub client_address: String,
    pub bill_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub items: Vec<ItemRequest>,
}

impl BillRequest {
    /// 通过编辑操作把请求写入草稿, 明细整体替换
    pub fn apply_to(self, draft: &mut BillDraft) -> Result<(), BillError> {
        draft.reset_items();
        draft.client_name = self.client_name;
        draft.client_phone = self.client_phone;
        draft.client_address = self.client_address;
        draft.notes = self.notes;
        if let Some(date) = self.bill_date {
            draft.bill_date = date;
        }

        while draft.items.len() < self.items.len() {
            draft.add_item();
        }
        while draft.items.len() > self.items.len() {
            if !draft.remove_item(draft.items.len() - 1) {
                break;
            }
        }

        for (idx, item) in self.items.into_iter().enumerate() {
            draft.update_item(idx, ItemEdit::Description(item.description))?;
            draft.update_item(idx, ItemEdit::Quantity(item.quantity))?;
            if let Some(unit) = item.unit {
                draft.update_item(idx, ItemEdit::Unit(unit))?;
            }
            draft.update_item(idx, ItemEdit::Rate(item.rate))?;
        }
        Ok(())
    }
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub success: bool,
    pub message: String,
    pub bill: Option<Bill>,
}

/// 列表响应体
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub bills: Vec<BillSummary>,
}

/// 编辑页响应体
#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub success: bool,
    pub total: BigDecimal,
    pub draft: BillDraft,
}

impl From<BillDraft> for DraftResponse {
    fn from(draft: BillDraft) -> Self {
        Self {
            success: true,
            total: draft.total(),
            draft,
        }
    }
}

fn message_response(status: StatusCode, message: String) -> Response {
    let response = BillResponse {
        success: false,
        message,
        bill: None,
    };
    (status, Json(response)).into_response()
}

/// 错误映射; 远程错误只返回通用提示
fn error_response(e: &BillError, generic: &str) -> Response {
    match e {
        BillError::Validation(v) => message_response(StatusCode::BAD_REQUEST, v.to_string()),
        BillError::ItemIndex { .. } => message_response(StatusCode::BAD_REQUEST, e.to_string()),
        BillError::NotFound(_) => message_response(StatusCode::NOT_FOUND, "Bill not found".to_string()),
        BillError::DeleteNotConfirmed(_) => message_response(
            StatusCode::CONFLICT,
            "Delete must be confirmed with ?confirm=true".to_string(),
        ),
        BillError::Database(_) | BillError::Render(_) | BillError::Csv(_) => {
            message_response(StatusCode::INTERNAL_SERVER_ERROR, generic.to_string())
        }
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

async fn refreshed_search(desk: &BillDesk, query: &str) -> Vec<Bill> {
    // 刷新失败时沿用上次的列表
    if let Err(e) = desk.refresh().await {
        tracing::warn!("serving cached bill list: {}", e);
    }
    desk.search(query).await
}

/// 单据列表 (支持搜索)
pub async fn list_bills(
    State(desk): State<Arc<BillDesk>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let bills = refreshed_search(&desk, &params.q).await;
    let response = ListResponse {
        success: true,
        count: bills.len(),
        bills: bills.into_iter().map(BillSummary::from).collect(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 导出 CSV
pub async fn export_csv(
    State(desk): State<Arc<BillDesk>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let bills = refreshed_search(&desk, &params.q).await;

    let mut body = Vec::new();
    if let Err(e) = export_bills_csv(&bills, &mut body) {
        tracing::error!("Error exporting bills: {}", e);
        return error_response(&BillError::Csv(e), "Failed to export bills");
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"bills.csv\""),
        ],
        body,
    )
        .into_response()
}

/// 新建单据的初始草稿
pub async fn new_bill(State(desk): State<Arc<BillDesk>>) -> Response {
    (StatusCode::OK, Json(DraftResponse::from(desk.new_draft()))).into_response()
}

/// 打开已有单据
pub async fn open_bill(State(desk): State<Arc<BillDesk>>, Path(bill_id): Path<Uuid>) -> Response {
    match desk.open(bill_id).await {
        Ok(draft) => (StatusCode::OK, Json(DraftResponse::from(draft))).into_response(),
        Err(e) => error_response(&e, "Failed to load bill"),
    }
}

async fn save_draft(desk: &BillDesk, mut draft: BillDraft, req: BillRequest) -> Response {
    if let Err(e) = req.apply_to(&mut draft) {
        return error_response(&e, "Failed to save bill");
    }

    match desk.save(&mut draft).await {
        Ok(outcome) => {
            let status = if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            let response = BillResponse {
                success: true,
                message: outcome.message().to_string(),
                bill: Some(outcome.bill),
            };
            (status, Json(response)).into_response()
        }
        Err(e) => error_response(&e, "Failed to save bill"),
    }
}

/// 新增单据
pub async fn create_bill(
    State(desk): State<Arc<BillDesk>>,
    Json(req): Json<BillRequest>,
) -> Response {
    let draft = desk.new_draft();
    save_draft(&desk, draft, req).await
}

/// 更新单据 (明细整体替换)
pub async fn update_bill(
    State(desk): State<Arc<BillDesk>>,
    Path(bill_id): Path<Uuid>,
    Json(req): Json<BillRequest>,
) -> Response {
    let draft = match desk.open_for_replace(bill_id).await {
        Ok(draft) => draft,
        Err(e) => return error_response(&e, "Failed to save bill"),
    };
    save_draft(&desk, draft, req).await
}

/// 删除单据 (需 ?confirm=true)
pub async fn delete_bill(
    State(desk): State<Arc<BillDesk>>,
    Path(bill_id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Response {
    match desk.delete(bill_id, params.confirm).await {
        Ok(()) => {
            let response = BillResponse {
                success: true,
                message: "Bill deleted".to_string(),
                bill: None,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(&e, "Failed to delete bill"),
    }
}

/// 打印页 (浏览器打印 / 另存为 PDF)
pub async fn print_bill(State(desk): State<Arc<BillDesk>>, Path(bill_id): Path<Uuid>) -> Response {
    match desk.print(bill_id).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Error printing bill {}: {}", bill_id, e);
            error_response(&e, "Failed to print bill")
        }
    }
}
