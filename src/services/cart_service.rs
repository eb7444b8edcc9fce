use sea_orm::*;
use sea_orm::sea_query::{Expr, ExprTrait, OnConflict};
use rust_decimal::Decimal;
use chrono::Utc;

use crate::errors::ServiceError;
use crate::models::{cart, cart_item, product};

/// Ligne de panier: l'item et son produit (prix courant)
pub type CartLine = (cart_item::Model, product::Model);

pub struct CartService;

impl CartService {
    /// Total du panier: somme des quantité × prix courant du produit.
    /// Fonction pure sur une liste en mémoire, recalculée à chaque lecture
    /// (jamais stockée). Avant la commande, le prix est toujours le prix
    /// courant, pas un snapshot.
    pub fn compute_total(lines: &[CartLine]) -> Decimal {
        lines
            .iter()
            .map(|(item, p)| p.price * Decimal::from(item.quantity))
            .sum()
    }

    /// Retourne le panier unique de l'utilisateur, en le créant vide au
    /// premier accès. Idempotent.
    pub async fn get_or_create_cart(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<cart::Model, ServiceError> {
        let existing = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(db)
            .await?;

        if let Some(cart) = existing {
            return Ok(cart);
        }

        let new_cart = cart::ActiveModel {
            user_id: Set(Some(user_id)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(new_cart.insert(db).await?)
    }

    /// Charge les lignes d'un panier avec leur produit.
    /// Un produit supprimé alors qu'une ligne le référence encore est une
    /// erreur NotFound (le cascade BD rend le cas exceptionnel).
    pub async fn load_lines(
        db: &DatabaseConnection,
        cart_id: i32,
    ) -> Result<Vec<CartLine>, ServiceError> {
        let items = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .order_by_asc(cart_item::Column::Id)
            .all(db)
            .await?;

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let p = product::Entity::find_by_id(item.product_id)
                .one(db)
                .await?
                .ok_or(ServiceError::NotFound("Product"))?;
            lines.push((item, p));
        }

        Ok(lines)
    }

    /// Panier complet de l'utilisateur: panier + lignes + total recalculé
    pub async fn load_cart(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<(cart::Model, Vec<CartLine>, Decimal), ServiceError> {
        let cart = Self::get_or_create_cart(db, user_id).await?;
        let lines = Self::load_lines(db, cart.id).await?;
        let total = Self::compute_total(&lines);
        Ok((cart, lines, total))
    }

    /// Ajoute un produit au panier (ou incrémente la quantité s'il y est déjà).
    ///
    /// L'upsert est atomique: INSERT ... ON CONFLICT (cart_id, product_id)
    /// DO UPDATE SET quantity = quantity + delta. Deux requêtes concurrentes
    /// pour le même produit ne peuvent ni créer un doublon ni perdre un
    /// incrément.
    pub async fn add_item(
        db: &DatabaseConnection,
        user_id: i32,
        product_id: i32,
        qty_delta: i32,
    ) -> Result<(cart::Model, Vec<CartLine>, Decimal), ServiceError> {
        if qty_delta < 1 {
            return Err(ServiceError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }

        // 1. Le produit doit exister
        let p = product::Entity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Product"))?;

        let cart = Self::get_or_create_cart(db, user_id).await?;

        // 2. Upsert atomique de la ligne
        let new_item = cart_item::ActiveModel {
            cart_id: Set(cart.id),
            product_id: Set(p.id),
            quantity: Set(qty_delta),
            ..Default::default()
        };

        let on_conflict = OnConflict::columns([
            cart_item::Column::CartId,
            cart_item::Column::ProductId,
        ])
        .value(
            cart_item::Column::Quantity,
            Expr::col((cart_item::Entity, cart_item::Column::Quantity)).add(qty_delta),
        )
        .to_owned();

        cart_item::Entity::insert(new_item)
            .on_conflict(on_conflict)
            .exec_without_returning(db)
            .await?;

        // 3. Recharger le panier avec le total à jour
        let lines = Self::load_lines(db, cart.id).await?;
        let total = Self::compute_total(&lines);
        Ok((cart, lines, total))
    }

    /// Fixe la quantité d'une ligne. Une quantité < 1 supprime la ligne et
    /// retourne None (c'est une suppression, pas une erreur). NotFound si la
    /// ligne n'appartient pas au panier de l'utilisateur.
    pub async fn set_quantity(
        db: &DatabaseConnection,
        user_id: i32,
        item_id: i32,
        quantity: i32,
    ) -> Result<Option<cart_item::Model>, ServiceError> {
        let cart = Self::get_or_create_cart(db, user_id).await?;

        let item = cart_item::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .filter(|item| item.cart_id == cart.id)
            .ok_or(ServiceError::NotFound("Cart item"))?;

        if quantity < 1 {
            item.delete(db).await?;
            return Ok(None);
        }

        let mut active: cart_item::ActiveModel = item.into();
        active.quantity = Set(quantity);
        Ok(Some(active.update(db).await?))
    }

    /// Supprime une ligne du panier de l'utilisateur. Idempotent: une ligne
    /// absente n'est pas une erreur.
    pub async fn remove_item(
        db: &DatabaseConnection,
        user_id: i32,
        item_id: i32,
    ) -> Result<(), ServiceError> {
        let cart = Self::get_or_create_cart(db, user_id).await?;

        cart_item::Entity::delete_many()
            .filter(cart_item::Column::Id.eq(item_id))
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(db)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn product_model(id: i32, price: Decimal) -> product::Model {
        product::Model {
            id,
            category_id: 1,
            name: format!("Product {}", id),
            description: String::new(),
            price,
            image_url: String::new(),
            created_at: Utc::now(),
        }
    }

    fn cart_model(id: i32, user_id: i32) -> cart::Model {
        cart::Model {
            id,
            user_id: Some(user_id),
            created_at: Utc::now(),
        }
    }

    fn item_model(id: i32, cart_id: i32, product_id: i32, quantity: i32) -> cart_item::Model {
        cart_item::Model {
            id,
            cart_id,
            product_id,
            quantity,
        }
    }

    #[test]
    fn test_total_recalcule_sur_les_prix_courants() {
        let lines = vec![
            (item_model(1, 7, 10, 2), product_model(10, Decimal::new(1999, 2))), // 2 × 19.99
            (item_model(2, 7, 11, 3), product_model(11, Decimal::new(500, 2))),  // 3 × 5.00
        ];

        assert_eq!(CartService::compute_total(&lines), Decimal::new(5498, 2)); // 54.98
    }

    #[test]
    fn test_total_panier_vide() {
        assert_eq!(CartService::compute_total(&[]), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_remove_item_idempotent() {
        // 0 ligne supprimée n'est pas une erreur
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![cart_model(7, 1)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        assert!(CartService::remove_item(&db, 1, 999).await.is_ok());
    }

    #[tokio::test]
    async fn test_add_item_produit_inexistant() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<product::Model>::new()])
            .into_connection();

        let result = CartService::add_item(&db, 1, 999, 1).await;
        assert!(matches!(result, Err(ServiceError::NotFound("Product"))));
    }

    #[tokio::test]
    async fn test_set_quantity_zero_supprime_la_ligne() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![cart_model(7, 1)]])
            .append_query_results([vec![item_model(3, 7, 10, 2)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = CartService::set_quantity(&db, 1, 3, 0).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_set_quantity_ligne_d_un_autre_panier() {
        // La ligne existe mais appartient au panier d'un autre utilisateur
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![cart_model(7, 1)]])
            .append_query_results([vec![item_model(3, 99, 10, 2)]])
            .into_connection();

        let result = CartService::set_quantity(&db, 1, 3, 5).await;
        assert!(matches!(result, Err(ServiceError::NotFound("Cart item"))));
    }
}
