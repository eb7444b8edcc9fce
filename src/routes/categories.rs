use actix_web::{get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::models::category;

/// GET /api/categories - Toutes les catégories, triées par nom (PUBLIC)
#[get("")]
pub async fn get_categories(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db.get_ref())
        .await;

    match categories {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

pub fn categories_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/categories").service(get_categories));
}
