use crate::models::{Bill, BillFields, BillItem, NewBillItem};
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use std::io::Write;
use uuid::Uuid;

const BILL_COLUMNS: &str = "id, bill_number, client_name, client_phone, client_address, \
                            bill_date, notes, total_amount, created_at, updated_at";

/// 查询全部单据 (开单日期降序)
pub async fn list_bills(pool: &PgPool) -> Result<Vec<Bill>, sqlx::Error> {
    sqlx::query_as::<_, Bill>(&format!(
        "SELECT {BILL_COLUMNS} FROM bills ORDER BY bill_date DESC, created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

/// 查询单据主表
pub async fn get_bill(pool: &PgPool, bill_id: Uuid) -> Result<Option<Bill>, sqlx::Error> {
    sqlx::query_as::<_, Bill>(&format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = $1"))
        .bind(bill_id)
        .fetch_optional(pool)
        .await
}

/// 查询单据明细 (按 item_order)
pub async fn fetch_items(pool: &PgPool, bill_id: Uuid) -> Result<Vec<BillItem>, sqlx::Error> {
    sqlx::query_as::<_, BillItem>(
        r#"
        SELECT id, bill_id, description, quantity, unit, rate, amount, item_order, created_at
        FROM bill_items
        WHERE bill_id = $1
        ORDER BY item_order
        "#,
    )
    .bind(bill_id)
    .fetch_all(pool)
    .await
}

/// 调用服务端编号函数, 返回空值时为 None
pub async fn generate_bill_number(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
    let number = sqlx::query_scalar::<_, Option<String>>("SELECT generate_bill_number()")
        .fetch_one(pool)
        .await?;
    Ok(number.filter(|n| !n.trim().is_empty()))
}

/// 新增单据主表, id 和时间戳由数据库生成
pub async fn create_bill(
    conn: &mut PgConnection,
    bill_number: &str,
    fields: &BillFields,
) -> Result<Bill, sqlx::Error> {
    sqlx::query_as::<_, Bill>(&format!(
        r#"
        INSERT INTO bills (bill_number, client_name, client_phone, client_address,
                           bill_date, notes, total_amount)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {BILL_COLUMNS}
        "#
    ))
    .bind(bill_number)
    .bind(&fields.client_name)
    .bind(&fields.client_phone)
    .bind(&fields.client_address)
    .bind(fields.bill_date)
    .bind(&fields.notes)
    .bind(&fields.total_amount)
    .fetch_one(conn)
    .await
}

/// 更新单据主表, 返回更新后的行 (不存在时为 None)
pub async fn update_bill(
    conn: &mut PgConnection,
    bill_id: Uuid,
    fields: &BillFields,
) -> Result<Option<Bill>, sqlx::Error> {
    sqlx::query_as::<_, Bill>(&format!(
        r#"
        UPDATE bills
        SET client_name = $2, client_phone = $3, client_address = $4,
            bill_date = $5, notes = $6, total_amount = $7, updated_at = $8
        WHERE id = $1
        RETURNING {BILL_COLUMNS}
        "#
    ))
    .bind(bill_id)
    .bind(&fields.client_name)
    .bind(&fields.client_phone)
    .bind(&fields.client_address)
    .bind(fields.bill_date)
    .bind(&fields.notes)
    .bind(&fields.total_amount)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await
}

/// 删除单据全部明细后批量插入新明细
pub async fn replace_items(
    conn: &mut PgConnection,
    bill_id: Uuid,
    items: &[NewBillItem],
) -> Result<(), sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM bill_items WHERE bill_id = $1")
        .bind(bill_id)
        .execute(&mut *conn)
        .await?;
    tracing::debug!("bill {} 删除旧明细 {} 行", bill_id, deleted.rows_affected());

    if items.is_empty() {
        return Ok(());
    }

    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO bill_items (bill_id, description, quantity, unit, rate, amount, item_order) ",
    );

    query_builder.push_values(items, |mut b, item| {
        b.push_bind(bill_id)
            .push_bind(item.description.clone())
            .push_bind(item.quantity.clone())
            .push_bind(item.unit.clone())
            .push_bind(item.rate.clone())
            .push_bind(item.amount.clone())
            .push_bind(item.item_order);
    });

    let result = query_builder.build().execute(&mut *conn).await?;
    tracing::debug!("bill {} 插入明细 {} 行", bill_id, result.rows_affected());
    Ok(())
}

/// 删除单据 (明细由外键级联删除), 返回是否存在
pub async fn delete_bill(pool: &PgPool, bill_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM bills WHERE id = $1")
        .bind(bill_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// 导出单据列表到 CSV
pub fn export_bills_csv<W: Write>(bills: &[Bill], out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record([
        "bill_number",
        "bill_date",
        "client_name",
        "client_phone",
        "client_address",
        "total_amount",
        "notes",
    ])?;

    for bill in bills {
        writer.write_record(&[
            bill.bill_number.clone(),
            bill.bill_date.to_string(),
            bill.client_name.clone(),
            bill.client_phone.clone(),
            bill.client_address.clone(),
            bill.total_amount.with_scale(2).to_string(),
            bill.notes.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
