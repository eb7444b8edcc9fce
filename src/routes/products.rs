use actix_web::{get, web, HttpResponse};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;

use crate::models::dto::ProductResponse;
use crate::models::{category, product};

#[derive(Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Recherche insensible à la casse (ILIKE) sur le nom OU la description
fn search_condition(search: &str) -> Condition {
    let pattern = format!("%{}%", search);
    Condition::any()
        .add(Expr::col((product::Entity, product::Column::Name)).ilike(pattern.clone()))
        .add(Expr::col((product::Entity, product::Column::Description)).ilike(pattern))
}

/// GET /api/products?search=&category= - Catalogue avec filtres (PUBLIC)
#[get("")]
pub async fn get_products(
    query: web::Query<ProductQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let mut select = product::Entity::find().find_also_related(category::Entity);

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        select = select.filter(search_condition(search));
    }

    // Filtre par slug de catégorie (les slugs sont en minuscules par
    // construction, on normalise l'entrée une seule fois ici)
    if let Some(cat) = query.category.as_deref().filter(|c| !c.trim().is_empty()) {
        select = select.filter(category::Column::Slug.eq(cat.trim().to_lowercase()));
    }

    let rows = select
        .order_by_desc(product::Column::Id)
        .all(db.get_ref())
        .await;

    match rows {
        Ok(rows) => {
            let response: Vec<ProductResponse> = rows
                .into_iter()
                .map(|(p, c)| ProductResponse::from_model(p, c))
                .collect();
            HttpResponse::Ok().json(response)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// GET /api/products/{id} - Détail d'un produit (PUBLIC)
#[get("/{id}")]
pub async fn get_product(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let product_id = path.into_inner();

    let row = product::Entity::find_by_id(product_id)
        .find_also_related(category::Entity)
        .one(db.get_ref())
        .await;

    match row {
        Ok(Some((p, c))) => HttpResponse::Ok().json(ProductResponse::from_model(p, c)),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Product not found"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

pub fn products_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .service(get_products)
            .service(get_product)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, QueryTrait};

    #[test]
    fn test_recherche_insensible_a_la_casse() {
        // "iphone" doit matcher "iPhone": le filtre est rendu en ILIKE,
        // pas en LIKE sensible à la casse
        let sql = product::Entity::find()
            .filter(search_condition("iPhone"))
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains("ILIKE"), "expected ILIKE in: {}", sql);
        assert!(!sql.contains(" LIKE "), "unexpected LIKE in: {}", sql);
        assert!(sql.contains("%iPhone%"), "expected pattern in: {}", sql);
    }
}
