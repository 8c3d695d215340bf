//! Integration tests for the infrastructure components
//!
//! These tests verify that the SQLite database layer is properly configured
//! and can perform basic operations.

use common::database::{DatabaseConfig, health_check, init_pool};
use sqlx::Row;

/// Test that verifies the database pool can be initialized and queried
#[tokio::test]
async fn test_database_infrastructure() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };

    let pool = init_pool(&config).await?;

    // Verify database connectivity
    assert!(health_check(&pool).await?, "Database health check failed");

    // Perform a simple query to test database connectivity
    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;

    let result: i32 = row.get("result");
    assert_eq!(result, 1, "SQLite simple query test failed");

    Ok(())
}
