use crate::config::{AppConfig, BusinessConfig};
use crate::db::BillStore;
use crate::error::BillError;
use crate::models::{Bill, BillDraft, ItemPolicy};
use crate::service::editor::{BillEditor, SaveOutcome};
use crate::service::export::render_printable;
use crate::service::search::filter_bills;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// 当前展示的单据列表 (每次刷新整体替换)
#[derive(Debug, Default)]
struct DisplayList {
    generation: u64,
    bills: Vec<Bill>,
}

/// 单据台: 列表刷新 / 搜索 / 编辑 / 删除 / 打印
pub struct BillDesk {
    store: Arc<dyn BillStore>,
    editor: BillEditor,
    business: BusinessConfig,
    next_generation: AtomicU64,
    display: RwLock<DisplayList>,
}

impl BillDesk {
    pub fn new(store: Arc<dyn BillStore>, config: &AppConfig) -> Self {
        let policy = ItemPolicy {
            min_items: config.billing.min_items,
            default_unit: config.billing.default_unit.clone(),
        };

        Self {
            editor: BillEditor::new(store.clone(), policy),
            store,
            business: config.business.clone(),
            next_generation: AtomicU64::new(0),
            display: RwLock::new(DisplayList::default()),
        }
    }

    pub fn editor(&self) -> &BillEditor {
        &self.editor
    }

    /// 重新拉取列表; 较早发起但较晚返回的结果会被丢弃
    pub async fn refresh(&self) -> Result<usize, BillError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let bills = match self.store.list_bills().await {
            Ok(bills) => bills,
            Err(e) => {
                tracing::error!("Error fetching bills: {}", e);
                return Err(e);
            }
        };

        let mut list = self.display.write().await;
        if generation < list.generation {
            tracing::debug!(
                "discarding stale bill list (generation {} < {})",
                generation,
                list.generation
            );
            return Ok(list.bills.len());
        }

        list.generation = generation;
        list.bills = bills;
        Ok(list.bills.len())
    }

    pub async fn bills(&self) -> Vec<Bill> {
        self.display.read().await.bills.clone()
    }

    pub async fn search(&self, query: &str) -> Vec<Bill> {
        filter_bills(&self.display.read().await.bills, query)
    }

    pub fn new_draft(&self) -> BillDraft {
        self.editor.new_draft()
    }

    pub async fn open(&self, bill_id: Uuid) -> Result<BillDraft, BillError> {
        let bill = self
            .store
            .get_bill(bill_id)
            .await?
            .ok_or(BillError::NotFound(bill_id))?;
        Ok(self.editor.open(&bill).await)
    }

    /// 打开单据用于整体替换: 只取主表字段, 明细从空白行开始
    pub async fn open_for_replace(&self, bill_id: Uuid) -> Result<BillDraft, BillError> {
        let bill = self
            .store
            .get_bill(bill_id)
            .await?
            .ok_or(BillError::NotFound(bill_id))?;
        Ok(BillDraft::from_bill(&bill, self.editor.policy().clone()))
    }

    /// 保存成功后刷新列表
    pub async fn save(&self, draft: &mut BillDraft) -> Result<SaveOutcome, BillError> {
        let outcome = self.editor.save(draft).await?;
        if let Err(e) = self.refresh().await {
            tracing::warn!("bill saved but list refresh failed: {}", e);
        }
        Ok(outcome)
    }

    /// 删除需要确认; 成功后刷新列表
    pub async fn delete(&self, bill_id: Uuid, confirmed: bool) -> Result<(), BillError> {
        if !confirmed {
            return Err(BillError::DeleteNotConfirmed(bill_id));
        }

        match self.store.delete_bill(bill_id).await {
            Ok(true) => {}
            Ok(false) => return Err(BillError::NotFound(bill_id)),
            Err(e) => {
                tracing::error!("Error deleting bill {}: {}", bill_id, e);
                return Err(e);
            }
        }
        tracing::info!("Bill {} deleted", bill_id);

        if let Err(e) = self.refresh().await {
            tracing::warn!("bill deleted but list refresh failed: {}", e);
        }
        Ok(())
    }

    /// 打印已保存的单据
    pub async fn print(&self, bill_id: Uuid) -> Result<String, BillError> {
        let (bill, items) = futures::try_join!(
            self.store.get_bill(bill_id),
            self.store.fetch_items(bill_id)
        )?;
        let bill = bill.ok_or(BillError::NotFound(bill_id))?;

        let mut draft = BillDraft::from_bill(&bill, self.editor.policy().clone());
        draft.load_items(items);
        render_printable(&draft, &self.business)
    }
}
