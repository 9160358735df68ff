//! Customer profile service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{validate_email, validate_phone, Customer};

/// Customer profile service
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

type CustomerTuple = (
    Uuid,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn customer_from_tuple(row: CustomerTuple) -> Customer {
    Customer {
        id: row.0,
        name: row.1,
        email: row.2,
        phone: row.3,
        address: row.4,
        created_at: row.5,
        updated_at: row.6,
    }
}

/// Input for creating or updating a customer
#[derive(Debug, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

fn validate_customer_input(input: &CustomerInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        });
    }
    if let Some(email) = &input.email {
        validate_email(email).map_err(|e| AppError::Validation {
            field: "email".to_string(),
            message: e.to_string(),
        })?;
    }
    if let Some(phone) = &input.phone {
        validate_phone(phone).map_err(|e| AppError::Validation {
            field: "phone".to_string(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a customer
    pub async fn create_customer(&self, input: CustomerInput) -> AppResult<Customer> {
        validate_customer_input(&input)?;

        let row = sqlx::query_as::<_, CustomerTuple>(
            r#"
            INSERT INTO customers (name, email, phone, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, address, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(customer_from_tuple(row))
    }

    /// Update a customer
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        input: CustomerInput,
    ) -> AppResult<Customer> {
        validate_customer_input(&input)?;

        let row = sqlx::query_as::<_, CustomerTuple>(
            r#"
            UPDATE customers
            SET name = $1, email = $2, phone = $3, address = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING id, name, email, phone, address, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        Ok(customer_from_tuple(row))
    }

    /// Delete a customer; refused while orders reference them
    pub async fn delete_customer(&self, customer_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE customer_id = $1)",
        )
        .bind(customer_id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::Validation {
                field: "customer_id".to_string(),
                message: "Customer has orders on record".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        Ok(())
    }

    /// Get a customer
    pub async fn get_customer(&self, customer_id: Uuid) -> AppResult<Customer> {
        let row = sqlx::query_as::<_, CustomerTuple>(
            "SELECT id, name, email, phone, address, created_at, updated_at FROM customers WHERE id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        Ok(customer_from_tuple(row))
    }

    /// List all customers
    pub async fn list_customers(&self) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerTuple>(
            "SELECT id, name, email, phone, address, created_at, updated_at FROM customers ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(customer_from_tuple).collect())
    }
}
