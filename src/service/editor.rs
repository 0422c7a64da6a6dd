use crate::db::BillStore;
use crate::error::BillError;
use crate::models::{Bill, BillDraft, ItemPolicy};
use crate::service::numbering::next_bill_number;
use chrono::{Local, NaiveDate};
use std::sync::Arc;

/// 保存结果
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub bill: Bill,
    pub created: bool,
}

impl SaveOutcome {
    /// 给用户的提示
    pub fn message(&self) -> &'static str {
        if self.created {
            "Bill created successfully"
        } else {
            "Bill updated successfully"
        }
    }
}

/// 单据编辑服务: 新建 / 打开 / 保存
pub struct BillEditor {
    store: Arc<dyn BillStore>,
    policy: ItemPolicy,
}

impl BillEditor {
    pub fn new(store: Arc<dyn BillStore>, policy: ItemPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &ItemPolicy {
        &self.policy
    }

    pub fn new_draft(&self) -> BillDraft {
        self.new_draft_on(Local::now().date_naive())
    }

    pub fn new_draft_on(&self, today: NaiveDate) -> BillDraft {
        BillDraft::new(today, self.policy.clone())
    }

    /// 打开已有单据; 明细查询失败时保留空白行并记录日志
    pub async fn open(&self, bill: &Bill) -> BillDraft {
        let mut draft = BillDraft::from_bill(bill, self.policy.clone());

        match self.store.fetch_items(bill.id).await {
            Ok(items) => draft.load_items(items),
            Err(e) => tracing::error!("Error fetching items of bill {}: {}", bill.bill_number, e),
        }

        draft
    }

    /// 保存单据. 校验失败时不访问数据库; 远程失败时草稿内容不变
    pub async fn save(&self, draft: &mut BillDraft) -> Result<SaveOutcome, BillError> {
        draft.validate()?;

        draft.saving = true;
        let result = self.persist(draft).await;
        draft.saving = false;

        match &result {
            Ok(outcome) => tracing::info!(
                "Bill {} saved (created: {}, total: {})",
                outcome.bill.bill_number,
                outcome.created,
                outcome.bill.total_amount
            ),
            Err(e) => tracing::error!("Error saving bill: {}", e),
        }
        result
    }

    async fn persist(&self, draft: &BillDraft) -> Result<SaveOutcome, BillError> {
        let fields = draft.fields();
        let items = draft.new_items();

        match draft.bill_id {
            Some(bill_id) => {
                let bill = self
                    .store
                    .replace_bill_snapshot(bill_id, &fields, &items)
                    .await?;
                Ok(SaveOutcome { bill, created: false })
            }
            None => {
                let bill_number = next_bill_number(self.store.as_ref()).await;
                let bill = self
                    .store
                    .create_bill_with_items(&bill_number, &fields, &items)
                    .await?;
                Ok(SaveOutcome { bill, created: true })
            }
        }
    }
}
