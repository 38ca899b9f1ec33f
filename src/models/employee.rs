//! # Employee Model
//!
//! Employees are created lazily the first time a batch save encounters their
//! business employee code, and never updated by the workflow afterwards: a
//! later batch referencing the same code reuses the stored record unchanged.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Maps to the `employees` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub employee_uuid: Uuid,
    /// Business employee code, unique and case-sensitive as typed
    pub employee_code: String,
    pub full_name: String,
    /// Whitelisted branch code (coerced before insert)
    pub branch: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub created_at: NaiveDateTime,
}

/// New employee for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
    pub employee_code: String,
    pub full_name: String,
    pub branch: String,
    pub email: String,
    pub photo_url: Option<String>,
}

impl Employee {
    /// Find an employee by its primary key
    pub async fn find_by_uuid(
        pool: &PgPool,
        employee_uuid: Uuid,
    ) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT employee_uuid, employee_code, full_name, branch, email, photo_url, created_at
            FROM employees
            WHERE employee_uuid = $1
            "#,
        )
        .bind(employee_uuid)
        .fetch_optional(pool)
        .await
    }

    /// Find an employee by business code
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT employee_uuid, employee_code, full_name, branch, email, photo_url, created_at
            FROM employees
            WHERE employee_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(pool)
        .await
    }

    /// Idempotent upsert keyed by employee code.
    ///
    /// Inserts the record on first sight of the code; a concurrent or earlier
    /// insert wins silently and the stored record is returned unchanged.
    /// The boolean reports whether this call created the row.
    pub async fn find_or_create(
        pool: &PgPool,
        new_employee: NewEmployee,
    ) -> Result<(Employee, bool), sqlx::Error> {
        let inserted = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (employee_code, full_name, branch, email, photo_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (employee_code) DO NOTHING
            RETURNING employee_uuid, employee_code, full_name, branch, email, photo_url, created_at
            "#,
        )
        .bind(&new_employee.employee_code)
        .bind(&new_employee.full_name)
        .bind(&new_employee.branch)
        .bind(&new_employee.email)
        .bind(&new_employee.photo_url)
        .fetch_optional(pool)
        .await?;

        if let Some(employee) = inserted {
            return Ok((employee, true));
        }

        let existing = Self::find_by_code(pool, &new_employee.employee_code)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((existing, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_serialization() {
        let employee = Employee {
            employee_uuid: Uuid::new_v4(),
            employee_code: "E100".to_string(),
            full_name: "John Doe".to_string(),
            branch: "HYD".to_string(),
            email: "e100@example.com".to_string(),
            photo_url: None,
            created_at: chrono::Utc::now().naive_utc(),
        };

        let serialized = serde_json::to_string(&employee).unwrap();
        let deserialized: Employee = serde_json::from_str(&serialized).unwrap();

        assert_eq!(employee, deserialized);
    }
}
