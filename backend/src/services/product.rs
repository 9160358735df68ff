//! Product catalog service
//!
//! Routine catalog CRUD. Updates never touch `stock`; that column
//! belongs to the stock ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{validate_unit_cost, Product};

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Database row for a product
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    sku: String,
    name: String,
    category: Option<String>,
    unit: Option<String>,
    buying_price: Decimal,
    selling_price: Decimal,
    stock: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            category: row.category,
            unit: row.unit,
            buying_price: row.buying_price,
            selling_price: row.selling_price,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub buying_price: Decimal,
    pub selling_price: Decimal,
    /// Initial on-hand quantity; defaults to zero
    pub opening_stock: Option<i64>,
}

/// Input for updating a product (stock is deliberately absent)
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub buying_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
            });
        }
        if input.sku.trim().is_empty() {
            return Err(AppError::Validation {
                field: "sku".to_string(),
                message: "SKU is required".to_string(),
            });
        }
        for (field, price) in [
            ("buying_price", input.buying_price),
            ("selling_price", input.selling_price),
        ] {
            validate_unit_cost(price).map_err(|e| AppError::Validation {
                field: field.to_string(),
                message: e.to_string(),
            })?;
        }

        let opening_stock = input.opening_stock.unwrap_or(0);
        if opening_stock < 0 {
            return Err(AppError::Validation {
                field: "opening_stock".to_string(),
                message: "Opening stock cannot be negative".to_string(),
            });
        }

        let sku_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)")
                .bind(&input.sku)
                .fetch_one(&self.db)
                .await?;

        if sku_taken {
            return Err(AppError::DuplicateEntry(format!("SKU '{}'", input.sku)));
        }

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (sku, name, category, unit, buying_price, selling_price, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, sku, name, category, unit, buying_price, selling_price, stock,
                      created_at, updated_at
            "#,
        )
        .bind(&input.sku)
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.unit)
        .bind(input.buying_price)
        .bind(input.selling_price)
        .bind(opening_stock)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a product's catalog fields
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        let existing = self.get_product(product_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let category = input.category.or(existing.category);
        let unit = input.unit.or(existing.unit);
        let buying_price = input.buying_price.unwrap_or(existing.buying_price);
        let selling_price = input.selling_price.unwrap_or(existing.selling_price);

        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
            });
        }
        for (field, price) in [("buying_price", buying_price), ("selling_price", selling_price)] {
            validate_unit_cost(price).map_err(|e| AppError::Validation {
                field: field.to_string(),
                message: e.to_string(),
            })?;
        }

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = $1, category = $2, unit = $3, buying_price = $4, selling_price = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING id, sku, name, category, unit, buying_price, selling_price, stock,
                      created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&category)
        .bind(&unit)
        .bind(buying_price)
        .bind(selling_price)
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a product
    ///
    /// Refused while any order or purchase line references it; those
    /// lines are the ledger's history.
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM order_items WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM purchase_items WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::Validation {
                field: "product_id".to_string(),
                message: "Product is referenced by order or purchase lines".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    /// Get a product
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, sku, name, category, unit, buying_price, selling_price, stock,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// List all products
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, sku, name, category, unit, buying_price, selling_price, stock,
                   created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
