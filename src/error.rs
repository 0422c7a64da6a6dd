use uuid::Uuid;

/// 保存前校验错误 (不访问数据库)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter client name")]
    MissingClientName,

    #[error("Please fill all item descriptions")]
    MissingItemDescription,

    #[error("Quantity cannot be negative (item {0})")]
    NegativeQuantity(usize),

    #[error("A bill needs at least {0} item(s)")]
    TooFewItems(usize),
}

/// 业务错误
#[derive(Debug, thiserror::Error)]
pub enum BillError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("bill {0} not found")]
    NotFound(Uuid),

    #[error("item index {index} out of range ({len} items)")]
    ItemIndex { index: usize, len: usize },

    #[error("delete of bill {0} was not confirmed")]
    DeleteNotConfirmed(Uuid),

    #[error("render error: {0}")]
    Render(#[from] tera::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl BillError {
    /// 远程调用类错误 (只给用户通用提示)
    pub fn is_remote(&self) -> bool {
        matches!(self, BillError::Database(_))
    }
}
