use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BillError, ValidationError};
use crate::models::{Bill, BillFields, BillItem, NewBillItem};

/// 明细行规则: 最少行数 + 新行默认单位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPolicy {
    pub min_items: usize,
    pub default_unit: String,
}

impl Default for ItemPolicy {
    fn default() -> Self {
        Self {
            min_items: 1,
            default_unit: "pcs".to_string(),
        }
    }
}

/// 编辑中的明细行, amount = quantity * rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Option<Uuid>,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub rate: BigDecimal,
    pub amount: BigDecimal,
}

impl LineItem {
    /// 空白行: 数量 1, 单价 0
    pub fn blank(unit: &str) -> Self {
        Self {
            id: None,
            description: String::new(),
            quantity: BigDecimal::from(1),
            unit: unit.to_string(),
            rate: BigDecimal::zero(),
            amount: BigDecimal::zero(),
        }
    }

    fn recompute_amount(&mut self) {
        self.amount = &self.quantity * &self.rate;
    }
}

impl From<BillItem> for LineItem {
    fn from(item: BillItem) -> Self {
        Self {
            id: Some(item.id),
            description: item.description,
            quantity: item.quantity,
            unit: item.unit,
            rate: item.rate,
            amount: item.amount,
        }
    }
}

/// 单个字段的修改
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEdit {
    Description(String),
    Quantity(BigDecimal),
    Unit(String),
    Rate(BigDecimal),
}

/// 单据编辑状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDraft {
    /// 编辑已有单据时为 Some
    pub bill_id: Option<Uuid>,
    pub bill_number: Option<String>,
    pub client_name: String,
    pub client_phone: String,
    pub client_address: String,
    pub bill_date: NaiveDate,
    pub notes: String,
    pub items: Vec<LineItem>,
    pub saving: bool,
    #[serde(skip)]
    pub policy: ItemPolicy,
}

impl BillDraft {
    /// 新建单据: 日期为今天, 一行空白明细
    pub fn new(today: NaiveDate, policy: ItemPolicy) -> Self {
        Self {
            bill_id: None,
            bill_number: None,
            client_name: String::new(),
            client_phone: String::new(),
            client_address: String::new(),
            bill_date: today,
            notes: String::new(),
            items: vec![LineItem::blank(&policy.default_unit)],
            saving: false,
            policy,
        }
    }

    /// 编辑已有单据: 只填主表字段, 明细由 load_items 异步替换
    pub fn from_bill(bill: &Bill, policy: ItemPolicy) -> Self {
        let mut draft = Self::new(bill.bill_date, policy);
        draft.bill_id = Some(bill.id);
        draft.bill_number = Some(bill.bill_number.clone());
        draft.client_name = bill.client_name.clone();
        draft.client_phone = bill.client_phone.clone();
        draft.client_address = bill.client_address.clone();
        draft.notes = bill.notes.clone();
        draft
    }

    /// 用查询到的明细替换当前行; 查询为空时保留空白行
    pub fn load_items(&mut self, items: Vec<BillItem>) {
        if items.is_empty() {
            return;
        }
        self.items = items.into_iter().map(LineItem::from).collect();
    }

    /// 明细恢复为一行空白 (整体替换前使用)
    pub fn reset_items(&mut self) {
        self.items = vec![LineItem::blank(&self.policy.default_unit)];
    }

    pub fn is_existing(&self) -> bool {
        self.bill_id.is_some()
    }

    pub fn update_item(&mut self, index: usize, edit: ItemEdit) -> Result<(), BillError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(BillError::ItemIndex { index, len })?;

        match edit {
            ItemEdit::Description(description) => item.description = description,
            ItemEdit::Unit(unit) => item.unit = unit,
            ItemEdit::Quantity(quantity) => {
                item.quantity = quantity;
                item.recompute_amount();
            }
            ItemEdit::Rate(rate) => {
                item.rate = rate;
                item.recompute_amount();
            }
        }
        Ok(())
    }

    pub fn add_item(&mut self) {
        self.items.push(LineItem::blank(&self.policy.default_unit));
    }

    /// 行数不超过下限时不删除, 返回是否删除
    pub fn remove_item(&mut self, index: usize) -> bool {
        if self.items.len() <= self.policy.min_items || index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        true
    }

    pub fn total(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::zero(), |acc, item| acc + &item.amount)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.client_name.trim().is_empty() {
            return Err(ValidationError::MissingClientName);
        }
        if self.items.iter().any(|item| item.description.trim().is_empty()) {
            return Err(ValidationError::MissingItemDescription);
        }
        if let Some(idx) = self
            .items
            .iter()
            .position(|item| item.quantity < BigDecimal::zero())
        {
            return Err(ValidationError::NegativeQuantity(idx + 1));
        }
        if self.items.len() < self.policy.min_items {
            return Err(ValidationError::TooFewItems(self.policy.min_items));
        }
        Ok(())
    }

    /// 主表字段, total_amount 取当前明细合计
    pub fn fields(&self) -> BillFields {
        BillFields {
            client_name: self.client_name.clone(),
            client_phone: self.client_phone.clone(),
            client_address: self.client_address.clone(),
            bill_date: self.bill_date,
            notes: self.notes.clone(),
            total_amount: self.total(),
        }
    }

    pub fn new_items(&self) -> Vec<NewBillItem> {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, item)| NewBillItem {
                description: item.description.clone(),
                quantity: item.quantity.clone(),
                unit: item.unit.clone(),
                rate: item.rate.clone(),
                amount: item.amount.clone(),
                item_order: idx as i32,
            })
            .collect()
    }
}
