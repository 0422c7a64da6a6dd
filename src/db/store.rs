use crate::db::queries;
use crate::error::BillError;
use crate::models::{Bill, BillFields, BillItem, NewBillItem};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// 单据存储接口 (bills + bill_items + 编号函数)
#[async_trait]
pub trait BillStore: Send + Sync {
    /// 全部单据, 开单日期降序
    async fn list_bills(&self) -> Result<Vec<Bill>, BillError>;

    async fn get_bill(&self, bill_id: Uuid) -> Result<Option<Bill>, BillError>;

    /// 单据明细, 按 item_order 升序
    async fn fetch_items(&self, bill_id: Uuid) -> Result<Vec<BillItem>, BillError>;

    /// 服务端编号; 失败或空值由调用方兜底
    async fn generate_bill_number(&self) -> Result<Option<String>, BillError>;

    /// 原子地新增单据及其明细
    async fn create_bill_with_items(
        &self,
        bill_number: &str,
        fields: &BillFields,
        items: &[NewBillItem],
    ) -> Result<Bill, BillError>;

    /// 原子地更新主表并整体替换明细
    async fn replace_bill_snapshot(
        &self,
        bill_id: Uuid,
        fields: &BillFields,
        items: &[NewBillItem],
    ) -> Result<Bill, BillError>;

    /// 删除单据及明细, 返回是否存在
    async fn delete_bill(&self, bill_id: Uuid) -> Result<bool, BillError>;
}

/// PostgreSQL 实现
#[derive(Clone)]
pub struct PgBillStore {
    pool: PgPool,
}

impl PgBillStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillStore for PgBillStore {
    async fn list_bills(&self) -> Result<Vec<Bill>, BillError> {
        Ok(queries::list_bills(&self.pool).await?)
    }

    async fn get_bill(&self, bill_id: Uuid) -> Result<Option<Bill>, BillError> {
        Ok(queries::get_bill(&self.pool, bill_id).await?)
    }

    async fn fetch_items(&self, bill_id: Uuid) -> Result<Vec<BillItem>, BillError> {
        Ok(queries::fetch_items(&self.pool, bill_id).await?)
    }

    async fn generate_bill_number(&self) -> Result<Option<String>, BillError> {
        Ok(queries::generate_bill_number(&self.pool).await?)
    }

    async fn create_bill_with_items(
        &self,
        bill_number: &str,
        fields: &BillFields,
        items: &[NewBillItem],
    ) -> Result<Bill, BillError> {
        let mut tx = self.pool.begin().await?;

        let bill = queries::create_bill(&mut *tx, bill_number, fields).await?;
        queries::replace_items(&mut *tx, bill.id, items).await?;

        tx.commit().await?;
        tracing::info!("✓ 新增单据 {} ({} 行明细)", bill.bill_number, items.len());
        Ok(bill)
    }

    async fn replace_bill_snapshot(
        &self,
        bill_id: Uuid,
        fields: &BillFields,
        items: &[NewBillItem],
    ) -> Result<Bill, BillError> {
        let mut tx = self.pool.begin().await?;

        // 未提交的事务在 drop 时回滚
        let Some(bill) = queries::update_bill(&mut *tx, bill_id, fields).await? else {
            return Err(BillError::NotFound(bill_id));
        };
        queries::replace_items(&mut *tx, bill_id, items).await?;

        tx.commit().await?;
        tracing::info!("✓ 更新单据 {} ({} 行明细)", bill.bill_number, items.len());
        Ok(bill)
    }

    async fn delete_bill(&self, bill_id: Uuid) -> Result<bool, BillError> {
        Ok(queries::delete_bill(&self.pool, bill_id).await?)
    }
}
