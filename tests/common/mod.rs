#![allow(dead_code)]

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use bill_desk::models::{Bill, BillFields, BillItem, NewBillItem};
use bill_desk::{BillError, BillStore};
use chrono::Utc;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Mutex;
use tokio::sync::oneshot;
use uuid::Uuid;

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

/// 挂起一次 list_bills 调用
pub struct ListGate {
    pub started: oneshot::Sender<()>,
    pub release: oneshot::Receiver<()>,
}

#[derive(Default)]
struct State {
    bills: Vec<Bill>,
    items: Vec<BillItem>,
    calls: Vec<&'static str>,
    failing: HashSet<&'static str>,
    server_number: Option<String>,
}

/// 内存实现, 记录每次调用
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    gate: Mutex<Option<ListGate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server_number(number: &str) -> Self {
        let store = Self::new();
        store.state.lock().unwrap().server_number = Some(number.to_string());
        store
    }

    pub fn fail(&self, call: &'static str) {
        self.state.lock().unwrap().failing.insert(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn stored_bills(&self) -> Vec<Bill> {
        self.state.lock().unwrap().bills.clone()
    }

    /// 按 item_order 排序的明细
    pub fn stored_items(&self, bill_id: Uuid) -> Vec<BillItem> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<BillItem> = state
            .items
            .iter()
            .filter(|i| i.bill_id == bill_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.item_order);
        items
    }

    pub fn all_items(&self) -> Vec<BillItem> {
        self.state.lock().unwrap().items.clone()
    }

    pub fn set_gate(&self, gate: ListGate) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    /// 直接写入一张单据 (不记录调用)
    pub fn seed(&self, number: &str, name: &str, date: (i32, u32, u32), items: &[(&str, &str, &str)]) -> Bill {
        let now = Utc::now();
        let bill_id = Uuid::new_v4();
        let mut total = BigDecimal::from(0);
        let mut state = self.state.lock().unwrap();

        for (idx, (description, quantity, rate)) in items.iter().enumerate() {
            let amount = dec(quantity) * dec(rate);
            total += &amount;
            state.items.push(BillItem {
                id: Uuid::new_v4(),
                bill_id,
                description: description.to_string(),
                quantity: dec(quantity),
                unit: "pcs".to_string(),
                rate: dec(rate),
                amount,
                item_order: idx as i32,
                created_at: now,
            });
        }

        let bill = Bill {
            id: bill_id,
            bill_number: number.to_string(),
            client_name: name.to_string(),
            client_phone: String::new(),
            client_address: String::new(),
            bill_date: chrono::NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            notes: String::new(),
            total_amount: total,
            created_at: now,
            updated_at: now,
        };
        state.bills.push(bill.clone());
        bill
    }

    /// 修改某单据全部明细的单位
    pub fn set_unit(&self, bill_id: Uuid, unit: &str) {
        let mut state = self.state.lock().unwrap();
        for item in state.items.iter_mut().filter(|i| i.bill_id == bill_id) {
            item.unit = unit.to_string();
        }
    }

    fn enter(&self, call: &'static str) -> Result<(), BillError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(call) {
            return Err(BillError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn insert_items(state: &mut State, bill_id: Uuid, items: &[NewBillItem]) {
        let now = Utc::now();
        state.items.extend(items.iter().map(|item| BillItem {
            id: Uuid::new_v4(),
            bill_id,
            description: item.description.clone(),
            quantity: item.quantity.clone(),
            unit: item.unit.clone(),
            rate: item.rate.clone(),
            amount: item.amount.clone(),
            item_order: item.item_order,
            created_at: now,
        }));
    }
}

#[async_trait]
impl BillStore for MemoryStore {
    async fn list_bills(&self) -> Result<Vec<Bill>, BillError> {
        self.enter("list_bills")?;
        let mut bills = self.stored_bills();
        bills.sort_by(|a, b| {
            b.bill_date
                .cmp(&a.bill_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.started.send(());
            let _ = gate.release.await;
        }
        Ok(bills)
    }

    async fn get_bill(&self, bill_id: Uuid) -> Result<Option<Bill>, BillError> {
        self.enter("get_bill")?;
        Ok(self.stored_bills().into_iter().find(|b| b.id == bill_id))
    }

    async fn fetch_items(&self, bill_id: Uuid) -> Result<Vec<BillItem>, BillError> {
        self.enter("fetch_items")?;
        Ok(self.stored_items(bill_id))
    }

    async fn generate_bill_number(&self) -> Result<Option<String>, BillError> {
        self.enter("generate_bill_number")?;
        Ok(self.state.lock().unwrap().server_number.clone())
    }

    async fn create_bill_with_items(
        &self,
        bill_number: &str,
        fields: &BillFields,
        items: &[NewBillItem],
    ) -> Result<Bill, BillError> {
        self.enter("create_bill_with_items")?;
        let now = Utc::now();
        let bill = Bill {
            id: Uuid::new_v4(),
            bill_number: bill_number.to_string(),
            client_name: fields.client_name.clone(),
            client_phone: fields.client_phone.clone(),
            client_address: fields.client_address.clone(),
            bill_date: fields.bill_date,
            notes: fields.notes.clone(),
            total_amount: fields.total_amount.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.lock().unwrap();
        state.bills.push(bill.clone());
        Self::insert_items(&mut state, bill.id, items);
        Ok(bill)
    }

    async fn replace_bill_snapshot(
        &self,
        bill_id: Uuid,
        fields: &BillFields,
        items: &[NewBillItem],
    ) -> Result<Bill, BillError> {
        self.enter("replace_bill_snapshot")?;
        let mut state = self.state.lock().unwrap();

        let bill = state
            .bills
            .iter_mut()
            .find(|b| b.id == bill_id)
            .ok_or(BillError::NotFound(bill_id))?;
        bill.client_name = fields.client_name.clone();
        bill.client_phone = fields.client_phone.clone();
        bill.client_address = fields.client_address.clone();
        bill.bill_date = fields.bill_date;
        bill.notes = fields.notes.clone();
        bill.total_amount = fields.total_amount.clone();
        bill.updated_at = Utc::now();
        let bill = bill.clone();

        state.items.retain(|i| i.bill_id != bill_id);
        Self::insert_items(&mut state, bill_id, items);
        Ok(bill)
    }

    async fn delete_bill(&self, bill_id: Uuid) -> Result<bool, BillError> {
        self.enter("delete_bill")?;
        let mut state = self.state.lock().unwrap();
        let before = state.bills.len();
        state.bills.retain(|b| b.id != bill_id);
        state.items.retain(|i| i.bill_id != bill_id);
        Ok(state.bills.len() < before)
    }
}
