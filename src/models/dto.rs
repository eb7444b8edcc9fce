// Réponses structurées de l'API (le front ne voit jamais les entités brutes)
use serde::Serialize;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{cart, cart_item, category, order, order_item, product};
use crate::models::order::OrderStatus;

/// Produit avec sa catégorie imbriquée
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub category: Option<category::Model>,
}

impl ProductResponse {
    pub fn from_model(p: product::Model, category: Option<category::Model>) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            image_url: p.image_url,
            created_at: p.created_at,
            category,
        }
    }
}

/// Ligne de panier enrichie avec les infos produit (prix courant)
#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_price: Decimal,
    pub product_image: String,
    pub quantity: i32,
    pub subtotal: Decimal,
}

impl CartItemResponse {
    pub fn from_model(item: &cart_item::Model, p: &product::Model) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: p.name.clone(),
            product_price: p.price,
            product_image: p.image_url.clone(),
            quantity: item.quantity,
            subtotal: p.price * Decimal::from(item.quantity),
        }
    }
}

/// Panier complet avec ses lignes et le total recalculé
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: i32,
    pub items: Vec<CartItemResponse>,
    pub total: Decimal,
}

impl CartResponse {
    pub fn from_lines(
        cart: &cart::Model,
        lines: &[(cart_item::Model, product::Model)],
        total: Decimal,
    ) -> Self {
        Self {
            id: cart.id,
            items: lines
                .iter()
                .map(|(item, p)| CartItemResponse::from_model(item, p))
                .collect(),
            total,
        }
    }
}

/// Ligne de commande figée (prix snapshot, pas le prix courant)
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_image: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderItemResponse {
    pub fn from_model(item: &order_item::Model, p: Option<&product::Model>) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            // Produit supprimé depuis la commande: on garde la ligne,
            // seul le nom/l'image sont perdus
            product_name: p.map(|p| p.name.clone()).unwrap_or_default(),
            product_image: p.map(|p| p.image_url.clone()).unwrap_or_default(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Commande avec ses lignes figées
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    pub fn from_model(
        o: order::Model,
        lines: &[(order_item::Model, Option<product::Model>)],
    ) -> Self {
        Self {
            id: o.id,
            created_at: o.created_at,
            total_amount: o.total_amount,
            status: o.status,
            cancelled_at: o.cancelled_at,
            items: lines
                .iter()
                .map(|(item, p)| OrderItemResponse::from_model(item, p.as_ref()))
                .collect(),
        }
    }
}

/// Vue publique d'un compte (jamais le hash de mot de passe)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
}
