use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::models::dto::CartResponse;
use crate::services::cart_service::CartService;

// DTO pour ajouter un produit au panier
#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub product_id: i32,
    pub quantity: Option<i32>, // défaut: 1
}

// DTO pour changer la quantité d'une ligne
#[derive(Deserialize)]
pub struct UpdateCartItemRequest {
    pub item_id: i32,
    pub quantity: i32,
}

// DTO pour retirer une ligne
#[derive(Deserialize)]
pub struct RemoveCartItemRequest {
    pub item_id: i32,
}

/// GET /api/cart - Panier de l'utilisateur avec total recalculé (PROTÉGÉE)
#[get("")]
pub async fn get_cart(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match CartService::load_cart(db.get_ref(), auth_user.user_id).await {
        Ok((cart, lines, total)) => {
            HttpResponse::Ok().json(CartResponse::from_lines(&cart, &lines, total))
        }
        Err(e) => e.to_http(),
    }
}

/// POST /api/cart/add - Ajouter un produit (incrémente si déjà présent) (PROTÉGÉE)
#[post("/add")]
pub async fn add_to_cart(
    auth_user: AuthUser,
    body: web::Json<AddToCartRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let qty_delta = body.quantity.unwrap_or(1);

    match CartService::add_item(db.get_ref(), auth_user.user_id, body.product_id, qty_delta).await {
        Ok((cart, lines, total)) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Product added to cart",
            "cart": CartResponse::from_lines(&cart, &lines, total),
        })),
        Err(e) => e.to_http(),
    }
}

/// POST /api/cart/update - Fixer la quantité d'une ligne (PROTÉGÉE)
/// Une quantité < 1 supprime la ligne (ce n'est pas une erreur)
#[post("/update")]
pub async fn update_cart_item(
    auth_user: AuthUser,
    body: web::Json<UpdateCartItemRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match CartService::set_quantity(db.get_ref(), auth_user.user_id, body.item_id, body.quantity)
        .await
    {
        Ok(Some(item)) => HttpResponse::Ok().json(item),
        Ok(None) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Item removed"
        })),
        Err(e) => e.to_http(),
    }
}

/// POST /api/cart/remove - Retirer une ligne, idempotent (PROTÉGÉE)
#[post("/remove")]
pub async fn remove_from_cart(
    auth_user: AuthUser,
    body: web::Json<RemoveCartItemRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match CartService::remove_item(db.get_ref(), auth_user.user_id, body.item_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Item removed from cart"
        })),
        Err(e) => e.to_http(),
    }
}

pub fn cart_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .service(get_cart)
            .service(add_to_cart)
            .service(update_cart_item)
            .service(remove_from_cart)
    );
}
