//! sqlx 错误到 AppError 的映射

use ryze_errors::AppError;

/// 唯一约束冲突
const UNIQUE_VIOLATION: &str = "23505";
/// 外键约束冲突
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// 将 sqlx 错误转换为应用错误
///
/// 唯一约束冲突映射为 409，外键冲突映射为 404，其余均为数据库错误
pub fn map_db_error(err: sqlx::Error, context: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return AppError::conflict(format!("{} already exists", context));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return AppError::not_found(format!("Referenced {} not found", context));
            }
            _ => {}
        }
    }
    AppError::database(format!("{}: {}", context, err))
}

/// 判断是否为唯一约束冲突
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION))
}
