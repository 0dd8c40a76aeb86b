use crate::db::models::{Product, ProductRow};
use sqlx::PgConnection;

const LIST_PRODUCTS: &str =
    "SELECT id, name, description, price, image_url FROM products ORDER BY id";

const LIST_PRODUCTS_PAGED: &str = "SELECT id, name, description, price, image_url FROM products \
     ORDER BY id LIMIT $1 OFFSET $2";

/// Window over the id-ordered product list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// `None` returns every row
    pub limit: Option<i64>,
    /// Only applied together with `limit`
    pub offset: i64,
}

/// List products ordered by ascending id.
///
/// # Arguments
/// * `conn` - Connection checked out for the current request
/// * `page` - Optional LIMIT/OFFSET window
///
/// # Errors
/// Returns error if the query or row decoding fails
pub async fn list_products(conn: &mut PgConnection, page: Page) -> Result<Vec<Product>, sqlx::Error> {
    let rows = match page.limit {
        Some(limit) => {
            sqlx::query_as::<_, ProductRow>(LIST_PRODUCTS_PAGED)
                .bind(limit)
                .bind(page.offset)
                .fetch_all(&mut *conn)
                .await?
        }
        None => {
            sqlx::query_as::<_, ProductRow>(LIST_PRODUCTS)
                .fetch_all(&mut *conn)
                .await?
        }
    };

    Ok(rows.into_iter().map(Product::from).collect())
}

/// Get a single product by primary key.
///
/// The id is bound as int8, so a value too large for the column just
/// matches nothing.
///
/// # Returns
/// Optional Product if found, None otherwise
pub async fn get_product(conn: &mut PgConnection, id: i64) -> Result<Option<Product>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, name, description, price, image_url
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Product::from))
}

/// Search products whose name or description contains `term`, ignoring case.
///
/// `%` and `_` inside the term keep their LIKE meaning, so `a_c` also
/// matches `abc`. Results are ordered by name.
pub async fn search_products(conn: &mut PgConnection, term: &str) -> Result<Vec<Product>, sqlx::Error> {
    let pattern = format!("%{}%", term);

    let rows = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, name, description, price, image_url
        FROM products
        WHERE name ILIKE $1 OR description ILIKE $1
        ORDER BY name
        "#,
    )
    .bind(pattern)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Product::from).collect())
}

/// Liveness check: succeeds when the connection can run a trivial statement
pub async fn ping(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(&mut *conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    // These need a database: DATABASE_URL=postgres://... cargo test -- --ignored

    #[sqlx::test(fixtures(path = "../../tests/fixtures", scripts("products")))]
    #[ignore]
    async fn test_list_products_returns_all_in_id_order(pool: PgPool) -> sqlx::Result<()> {
        let mut conn = pool.acquire().await?;
        let products = list_products(&mut conn, Page::default()).await?;

        let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../tests/fixtures", scripts("products")))]
    #[ignore]
    async fn test_list_products_window(pool: PgPool) -> sqlx::Result<()> {
        let mut conn = pool.acquire().await?;
        let page = Page {
            limit: Some(2),
            offset: 1,
        };
        let products = list_products(&mut conn, page).await?;

        let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../tests/fixtures", scripts("products")))]
    #[ignore]
    async fn test_get_product(pool: PgPool) -> sqlx::Result<()> {
        let mut conn = pool.acquire().await?;

        let product = get_product(&mut conn, 1).await?.unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.name, "Wireless Mouse");
        assert_eq!(product.price, Some(19.99));

        assert!(get_product(&mut conn, 999).await?.is_none());
        assert!(get_product(&mut conn, 99_999_999_999).await?.is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../tests/fixtures", scripts("products")))]
    #[ignore]
    async fn test_search_matches_name_or_description(pool: PgPool) -> sqlx::Result<()> {
        let mut conn = pool.acquire().await?;

        let products = search_products(&mut conn, "WIRELESS").await?;
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Desk Lamp", "Wireless Mouse"]);

        let products = search_products(&mut conn, "no such thing").await?;
        assert!(products.is_empty());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../tests/fixtures", scripts("products")))]
    #[ignore]
    async fn test_search_keeps_like_wildcards(pool: PgPool) -> sqlx::Result<()> {
        let mut conn = pool.acquire().await?;

        let products = search_products(&mut conn, "us_-c").await?;
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["USB-C Hub"]);
        Ok(())
    }

    #[sqlx::test]
    #[ignore]
    async fn test_ping(pool: PgPool) -> sqlx::Result<()> {
        let mut conn = pool.acquire().await?;
        ping(&mut conn).await
    }
}
