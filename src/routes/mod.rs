pub mod health;
pub mod auth;
pub mod products;
pub mod categories;
pub mod cart;
pub mod orders;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(products::products_routes)
            .configure(categories::categories_routes)
            .configure(cart::cart_routes)
            .configure(orders::orders_routes)
    );
}
