use crate::config::BusinessConfig;
use crate::error::BillError;
use crate::models::{Bill, BillDraft};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Serialize;
use tera::{Context, Tera};

const BILL_TEMPLATE: &str = include_str!("../../templates/bill.html.tera");
const TEMPLATE_NAME: &str = "bill.html";

/// 打印行: 不含单价和金额
#[derive(Debug, Serialize)]
pub struct PrintItem {
    pub serial: usize,
    pub description: String,
    pub quantity: String,
    pub unit: String,
}

/// 打印模板上下文
#[derive(Debug, Serialize)]
pub struct PrintContext {
    pub title_number: String,
    pub business_name: String,
    pub tagline: String,
    pub client_name: String,
    pub client_phone: String,
    pub client_address: String,
    pub bill_number: String,
    pub bill_date: String,
    pub items: Vec<PrintItem>,
    pub notes_lines: Vec<String>,
}

impl PrintContext {
    /// 未保存的单据也可以打印, 单号显示为 DRAFT
    pub fn from_draft(draft: &BillDraft, business: &BusinessConfig) -> Self {
        let items = draft
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| PrintItem {
                serial: idx + 1,
                description: item.description.clone(),
                quantity: item.quantity.normalized().to_string(),
                unit: item.unit.clone(),
            })
            .collect();

        let notes_lines = if draft.notes.is_empty() {
            Vec::new()
        } else {
            draft.notes.lines().map(str::to_string).collect()
        };

        Self {
            title_number: draft.bill_number.clone().unwrap_or_else(|| "New Bill".to_string()),
            business_name: business.name.clone(),
            tagline: business.tagline.clone(),
            client_name: draft.client_name.clone(),
            client_phone: draft.client_phone.clone(),
            client_address: draft.client_address.clone(),
            bill_number: draft.bill_number.clone().unwrap_or_else(|| "DRAFT".to_string()),
            bill_date: print_date(draft.bill_date),
            items,
            notes_lines,
        }
    }
}

/// 渲染可打印的 HTML, 页面加载后唤起浏览器打印
pub fn render_printable(draft: &BillDraft, business: &BusinessConfig) -> Result<String, BillError> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, BILL_TEMPLATE)?;

    let context = Context::from_serialize(PrintContext::from_draft(draft, business))?;
    Ok(tera.render(TEMPLATE_NAME, &context)?)
}

/// 打印日期 d/m/yyyy
pub fn print_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// 列表日期 Mar 05, 2024
pub fn list_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// 卢比金额, 印度分组: ₹12,34,567.50
pub fn format_inr(amount: &BigDecimal) -> String {
    let fixed = amount.round(2).with_scale(2).to_string();
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    format!("{}₹{}.{}", sign, group_indian(int_part), frac_part)
}

fn group_indian(int_part: &str) -> String {
    if int_part.len() <= 3 {
        return int_part.to_string();
    }

    let (head, last3) = int_part.split_at(int_part.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), last3)
}

/// 列表摘要 (附带展示用格式)
#[derive(Debug, Clone, Serialize)]
pub struct BillSummary {
    #[serde(flatten)]
    pub bill: Bill,
    pub total_display: String,
    pub date_display: String,
}

impl From<Bill> for BillSummary {
    fn from(bill: Bill) -> Self {
        Self {
            total_display: format_inr(&bill.total_amount),
            date_display: list_date(bill.bill_date),
            bill,
        }
    }
}
