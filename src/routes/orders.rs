use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::models::dto::OrderResponse;
use crate::services::order_service::OrderService;

// DTO pour passer commande
#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub phone: String,
}

/// POST /api/orders - Convertit le panier en commande (PROTÉGÉE)
/// Transactionnel: commande + lignes + vidage du panier, tout ou rien
#[post("")]
pub async fn create_order(
    auth_user: AuthUser,
    body: web::Json<CreateOrderRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match OrderService::place_order(db.get_ref(), auth_user.user_id, &body.phone).await {
        Ok(order) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Order created successfully",
            "order_id": order.id,
        })),
        Err(e) => e.to_http(),
    }
}

/// GET /api/orders - Historique, la plus récente d'abord (PROTÉGÉE)
#[get("")]
pub async fn get_orders(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match OrderService::list_orders(db.get_ref(), auth_user.user_id).await {
        Ok(orders) => {
            let response: Vec<OrderResponse> = orders
                .into_iter()
                .map(|(order, items)| OrderResponse::from_model(order, &items))
                .collect();
            HttpResponse::Ok().json(response)
        }
        Err(e) => e.to_http(),
    }
}

/// POST /api/orders/{id}/cancel - Annulation, uniquement si "pending" (PROTÉGÉE)
#[post("/{id}/cancel")]
pub async fn cancel_order(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let order_id = path.into_inner();

    match OrderService::cancel_order(db.get_ref(), auth_user.user_id, order_id).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Order cancelled successfully"
        })),
        Err(e) => e.to_http(),
    }
}

pub fn orders_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .service(create_order)
            .service(get_orders)
            .service(cancel_order)
    );
}
