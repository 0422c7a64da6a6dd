use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 单据主表 (bills)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub bill_number: String,
    pub client_name: String,
    pub client_phone: String,   // 空串表示未填
    pub client_address: String, // 同上
    pub bill_date: NaiveDate,
    pub notes: String,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 单据明细表 (bill_items)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BillItem {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub rate: BigDecimal,
    pub amount: BigDecimal,
    pub item_order: i32,
    pub created_at: DateTime<Utc>,
}

/// 单据可编辑字段 (新增/更新共用)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillFields {
    pub client_name: String,
    pub client_phone: String,
    pub client_address: String,
    pub bill_date: NaiveDate,
    pub notes: String,
    pub total_amount: BigDecimal,
}

/// 待写入的明细行, item_order 为当前数组下标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBillItem {
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub rate: BigDecimal,
    pub amount: BigDecimal,
    pub item_order: i32,
}
