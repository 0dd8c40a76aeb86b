use crate::db::models::Product;
use crate::db::repository::{self, Page};
use crate::error::{AppError, Operation};
use crate::routes::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection},
};

/// Raw query string pairs, in request order
type QueryPairs = Vec<(String, String)>;

/// First value given for `key`; later repeats are ignored
fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

/// Query parameters for /api/products
///
/// Kept as raw strings: a value that is not an integer is ignored rather
/// than rejected.
#[derive(Debug, Default)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        ListQuery {
            limit: first_value(pairs, "limit"),
            offset: first_value(pairs, "offset"),
        }
    }

    /// Resolve into a [`Page`]. `limit=0` means no limit, and without a
    /// limit the offset is ignored altogether.
    pub fn page(&self) -> Result<Page, AppError> {
        let limit = match parse_int(self.limit.as_deref()) {
            Some(limit) if limit < 0 => {
                return Err(AppError::InvalidPagination(format!(
                    "limit must not be negative, got {}",
                    limit
                )));
            }
            Some(limit) if limit > 0 => limit,
            _ => return Ok(Page::default()),
        };

        let offset = parse_int(self.offset.as_deref()).unwrap_or(0);
        if offset < 0 {
            return Err(AppError::InvalidPagination(format!(
                "offset must not be negative, got {}",
                offset
            )));
        }

        Ok(Page {
            limit: Some(limit),
            offset,
        })
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse().ok())
}

/// Query parameters for /api/products/search
#[derive(Debug, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        SearchQuery {
            q: first_value(pairs, "q"),
        }
    }
}

/// List products
///
/// # Endpoint
/// GET /api/products?limit=<N>&offset=<M>
///
/// # Returns
/// 200 with a JSON array ordered by id
///
/// # Errors
/// - 400 for a negative limit, or a negative offset alongside a limit
/// - 500 if the database cannot be reached or the query fails
pub async fn list_products(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Vec<Product>>, AppError> {
    let page = ListQuery::from_pairs(&pairs).page()?;

    let mut conn = state
        .db
        .acquire()
        .await
        .map_err(AppError::database(Operation::ListProducts))?;

    let products = repository::list_products(&mut conn, page)
        .await
        .map_err(AppError::database(Operation::ListProducts))?;

    tracing::info!(
        count = products.len(),
        limit = ?page.limit,
        offset = page.offset,
        "Retrieved products from database"
    );

    Ok(Json(products))
}

/// Fetch one product
///
/// # Endpoint
/// GET /api/products/{id}
///
/// A segment that is not an integer does not name a product route and
/// gets the generic 404 envelope. Any integer is looked up, so one outside
/// the column's range is simply a missing product.
///
/// # Errors
/// - 404 if no product has this id
/// - 500 on database failure
pub async fn get_product(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Product>, AppError> {
    let id: i64 = raw_id
        .ok()
        .and_then(|Path(raw)| raw.parse().ok())
        .ok_or(AppError::RouteNotFound)?;

    let mut conn = state
        .db
        .acquire()
        .await
        .map_err(AppError::database(Operation::GetProduct))?;

    let product = repository::get_product(&mut conn, id)
        .await
        .map_err(AppError::database(Operation::GetProduct))?
        .ok_or(AppError::ProductNotFound(id))?;

    tracing::info!(product_id = id, "Retrieved product from database");

    Ok(Json(product))
}

/// Search products by name or description
///
/// # Endpoint
/// GET /api/products/search?q=<TERM>
///
/// # Returns
/// 200 with a JSON array ordered by name; empty when nothing matches
///
/// # Errors
/// - 400 if `q` is missing or blank
/// - 500 on database failure
pub async fn search_products(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Vec<Product>>, AppError> {
    let params = SearchQuery::from_pairs(&pairs);
    let term = params.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(AppError::MissingSearchTerm);
    }

    let mut conn = state
        .db
        .acquire()
        .await
        .map_err(AppError::database(Operation::SearchProducts))?;

    let products = repository::search_products(&mut conn, term)
        .await
        .map_err(AppError::database(Operation::SearchProducts))?;

    tracing::info!(
        search_term = %term,
        count = products.len(),
        "Search returned products"
    );

    Ok(Json(products))
}
