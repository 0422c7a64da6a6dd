use crate::models::Bill;

/// 按单据号 / 客户名 (不区分大小写) 或电话过滤, 保持输入顺序
pub fn filter_bills(bills: &[Bill], query: &str) -> Vec<Bill> {
    if query.trim().is_empty() {
        return bills.to_vec();
    }

    let query = query.to_lowercase();
    bills
        .iter()
        .filter(|bill| matches_query(bill, &query))
        .cloned()
        .collect()
}

// 电话按原值匹配
fn matches_query(bill: &Bill, lowered: &str) -> bool {
    bill.bill_number.to_lowercase().contains(lowered)
        || bill.client_name.to_lowercase().contains(lowered)
        || bill.client_phone.contains(lowered)
}
