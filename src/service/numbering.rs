use crate::db::BillStore;
use chrono::{DateTime, Datelike, Local, TimeZone};

/// 本地兜底编号: BILL-<年>-<毫秒时间戳>
pub fn fallback_bill_number<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!("BILL-{}-{}", now.year(), now.timestamp_millis())
}

/// 取下一个单据编号, 服务端失败或返回空时使用本地兜底
pub async fn next_bill_number(store: &dyn BillStore) -> String {
    match store.generate_bill_number().await {
        Ok(Some(number)) => number,
        Ok(None) => {
            let number = fallback_bill_number(&Local::now());
            tracing::warn!("generate_bill_number returned nothing, using {}", number);
            number
        }
        Err(e) => {
            let number = fallback_bill_number(&Local::now());
            tracing::warn!("generate_bill_number failed: {}, using {}", e, number);
            number
        }
    }
}
