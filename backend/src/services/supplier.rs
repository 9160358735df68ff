//! Supplier profile service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{validate_email, validate_phone, Supplier};

/// Supplier profile service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

type SupplierTuple = (
    Uuid,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn supplier_from_tuple(row: SupplierTuple) -> Supplier {
    Supplier {
        id: row.0,
        name: row.1,
        email: row.2,
        phone: row.3,
        address: row.4,
        created_at: row.5,
        updated_at: row.6,
    }
}

/// Input for creating or updating a supplier
#[derive(Debug, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

fn validate_supplier_input(input: &SupplierInput) -> AppResult<()> {
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

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a supplier
    pub async fn create_supplier(&self, input: SupplierInput) -> AppResult<Supplier> {
        validate_supplier_input(&input)?;

        let row = sqlx::query_as::<_, SupplierTuple>(
            r#"
            INSERT INTO suppliers (name, email, phone, address)
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

        Ok(supplier_from_tuple(row))
    }

    /// Update a supplier
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: SupplierInput,
    ) -> AppResult<Supplier> {
        validate_supplier_input(&input)?;

        let row = sqlx::query_as::<_, SupplierTuple>(
            r#"
            UPDATE suppliers
            SET name = $1, email = $2, phone = $3, address = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING id, name, email, phone, address, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(supplier_from_tuple(row))
    }

    /// Delete a supplier; refused while purchases reference them
    pub async fn delete_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM purchases WHERE supplier_id = $1)",
        )
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::Validation {
                field: "supplier_id".to_string(),
                message: "Supplier has purchases on record".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        Ok(())
    }

    /// Get a supplier
    pub async fn get_supplier(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierTuple>(
            "SELECT id, name, email, phone, address, created_at, updated_at FROM suppliers WHERE id = $1",
        )
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(supplier_from_tuple(row))
    }

    /// List all suppliers
    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierTuple>(
            "SELECT id, name, email, phone, address, created_at, updated_at FROM suppliers ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(supplier_from_tuple).collect())
    }
}
