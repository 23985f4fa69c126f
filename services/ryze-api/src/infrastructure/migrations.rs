//! 内嵌的数据库迁移脚本

use ryze_adapter_postgres::Migration;

/// 按版本排列的全部迁移
pub fn all() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "accounts",
            include_str!("../../migrations/0001_accounts.sql"),
        ),
        Migration::new(
            2,
            "requests",
            include_str!("../../migrations/0002_requests.sql"),
        ),
        Migration::new(
            3,
            "engagement",
            include_str!("../../migrations/0003_engagement.sql"),
        ),
        Migration::new(
            4,
            "runbooks",
            include_str!("../../migrations/0004_runbooks.sql"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_strictly_increasing() {
        let migrations = all();
        assert!(
            migrations
                .windows(2)
                .all(|pair| pair[0].version < pair[1].version)
        );
        assert!(migrations.iter().all(|m| !m.up_sql.trim().is_empty()));
    }

    #[test]
    fn test_users_table_created_before_dependents() {
        let migrations = all();
        assert!(migrations[0].up_sql.contains("CREATE TABLE IF NOT EXISTS users"));
        assert!(migrations[1].up_sql.contains("REFERENCES users(id)"));
    }
}
