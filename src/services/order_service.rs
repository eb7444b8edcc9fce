use sea_orm::*;
use chrono::Utc;

use crate::errors::ServiceError;
use crate::models::order::OrderStatus;
use crate::models::{cart, cart_item, order, order_item, product};
use crate::services::cart_service::{CartLine, CartService};

/// Commande avec ses lignes figées (et le produit si toujours présent)
pub type OrderWithItems = (order::Model, Vec<(order_item::Model, Option<product::Model>)>);

pub struct OrderService;

impl OrderService {
    /// Le téléphone doit être entièrement numérique et faire au moins
    /// 10 caractères. Validé avant toute mutation.
    fn validate_phone(phone: &str) -> Result<(), ServiceError> {
        if phone.len() < 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(ServiceError::Validation("Invalid phone number".to_string()));
        }
        Ok(())
    }

    /// Copie figée des lignes du panier pour une commande: même produit,
    /// même quantité, prix unitaire capturé au moment de l'appel. Ce sont
    /// exactement les valeurs insérées par place_order.
    fn freeze_lines(order_id: i32, lines: &[CartLine]) -> Vec<order_item::ActiveModel> {
        lines
            .iter()
            .map(|(item, p)| order_item::ActiveModel {
                order_id: Set(order_id),
                product_id: Set(p.id),
                quantity: Set(item.quantity),
                price: Set(p.price), // prix figé, pas une référence au prix courant
                ..Default::default()
            })
            .collect()
    }

    /// Convertit le panier de l'utilisateur en commande immuable.
    ///
    /// Le total et les prix unitaires sont figés au moment de l'appel:
    /// un changement de prix ultérieur ne modifie jamais une commande passée.
    /// L'insertion de la commande, de ses lignes et le vidage du panier se
    /// font dans UNE transaction: tout ou rien.
    pub async fn place_order(
        db: &DatabaseConnection,
        user_id: i32,
        phone: &str,
    ) -> Result<order::Model, ServiceError> {
        // 1. Valider le téléphone
        Self::validate_phone(phone)?;

        // 2. Charger le panier et ses lignes (prix courants)
        let user_cart = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(ServiceError::EmptyCart)?;

        let lines = CartService::load_lines(db, user_cart.id).await?;
        if lines.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        // 3. Moment du snapshot: le total est calculé ici et plus jamais
        let total = CartService::compute_total(&lines);

        // 4-6. Transfert atomique: commande + lignes + vidage du panier.
        // Toute erreur avant le commit fait un rollback complet (la
        // transaction est annulée au drop), le panier reste intact.
        let txn = db.begin().await?;

        let new_order = order::ActiveModel {
            user_id: Set(Some(user_id)),
            created_at: Set(Utc::now()),
            total_amount: Set(total),
            status: Set(OrderStatus::Pending),
            cancelled_at: Set(None),
            ..Default::default()
        };
        let placed = new_order.insert(&txn).await?;

        for order_line in Self::freeze_lines(placed.id, &lines) {
            order_line.insert(&txn).await?;
        }

        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(user_cart.id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(placed)
    }

    /// Historique des commandes de l'utilisateur, la plus récente d'abord,
    /// chacune avec ses lignes figées. Lecture seule.
    pub async fn list_orders(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<OrderWithItems>, ServiceError> {
        let orders = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::Id)
            .all(db)
            .await?;

        let mut result = Vec::with_capacity(orders.len());
        for o in orders {
            let items = order_item::Entity::find()
                .filter(order_item::Column::OrderId.eq(o.id))
                .find_also_related(product::Entity)
                .all(db)
                .await?;
            result.push((o, items));
        }

        Ok(result)
    }

    /// Annule une commande. Seule la transition pending → cancelled est
    /// permise ici; cancelled_at est renseigné en même temps que le statut.
    pub async fn cancel_order(
        db: &DatabaseConnection,
        user_id: i32,
        order_id: i32,
    ) -> Result<order::Model, ServiceError> {
        // 1. La commande doit exister et appartenir à l'utilisateur
        let o = order::Entity::find_by_id(order_id)
            .filter(order::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Order"))?;

        // 2. Statut typé: pas de comparaison de chaînes ici
        if o.status != OrderStatus::Pending {
            return Err(ServiceError::InvalidStateTransition(
                o.status.as_str().to_string(),
            ));
        }

        // 3. Transition + horodatage de l'annulation
        let mut active: order::ActiveModel = o.into();
        active.status = Set(OrderStatus::Cancelled);
        active.cancelled_at = Set(Some(Utc::now()));
        Ok(active.update(db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

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

    fn order_model(id: i32, user_id: i32, status: OrderStatus) -> order::Model {
        order::Model {
            id,
            user_id: Some(user_id),
            created_at: Utc::now(),
            total_amount: Decimal::new(4498, 2),
            status,
            cancelled_at: None,
        }
    }

    fn order_item_model(id: i32, order_id: i32, product_id: i32) -> order_item::Model {
        order_item::Model {
            id,
            order_id,
            product_id,
            quantity: 1,
            price: Decimal::new(1999, 2),
        }
    }

    #[tokio::test]
    async fn test_telephone_trop_court_rejete() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = OrderService::place_order(&db, 1, "12345").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_telephone_non_numerique_rejete() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = OrderService::place_order(&db, 1, "98765abc21").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_telephone_valide_mais_panier_vide() {
        // Le téléphone passe la validation, le panier sans ligne est refusé
        // et aucune commande n'est créée (aucune écriture mockée)
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![cart_model(7, 1)]])
            .append_query_results([Vec::<cart_item::Model>::new()])
            .into_connection();

        let result = OrderService::place_order(&db, 1, "9876543210").await;
        assert!(matches!(result, Err(ServiceError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_aucun_panier_equivaut_a_panier_vide() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<cart::Model>::new()])
            .into_connection();

        let result = OrderService::place_order(&db, 1, "9876543210").await;
        assert!(matches!(result, Err(ServiceError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_place_order_transfert_complet() {
        // 2 lignes de panier → 1 commande + 2 lignes + vidage du panier.
        // Le mock fournit exactement les résultats attendus: toute requête
        // en trop ou manquante ferait échouer le test.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![cart_model(7, 1)]])
            .append_query_results([vec![
                item_model(1, 7, 10, 2),
                item_model(2, 7, 11, 1),
            ]])
            .append_query_results([vec![product_model(10, Decimal::new(1999, 2))]])
            .append_query_results([vec![product_model(11, Decimal::new(500, 2))]])
            .append_query_results([vec![order_model(100, 1, OrderStatus::Pending)]])
            .append_query_results([vec![order_item_model(1000, 100, 10)]])
            .append_query_results([vec![order_item_model(1001, 100, 11)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let placed = OrderService::place_order(&db, 1, "9876543210").await.unwrap();
        assert_eq!(placed.id, 100);
        assert_eq!(placed.status, OrderStatus::Pending);
    }

    #[test]
    fn test_lignes_figees_miroir_du_panier() {
        // Les valeurs insérées sont exactement celles du panier au moment
        // de l'appel: produit, quantité, prix unitaire. Le total inséré
        // (compute_total sur les mêmes lignes) est la somme des lignes figées.
        let lines = vec![
            (item_model(1, 7, 10, 2), product_model(10, Decimal::new(1999, 2))), // 2 × 19.99
            (item_model(2, 7, 11, 1), product_model(11, Decimal::new(500, 2))),  // 1 × 5.00
        ];

        let frozen = OrderService::freeze_lines(100, &lines);
        assert_eq!(frozen.len(), 2);

        assert_eq!(frozen[0].order_id, Set(100));
        assert_eq!(frozen[0].product_id, Set(10));
        assert_eq!(frozen[0].quantity, Set(2));
        assert_eq!(frozen[0].price, Set(Decimal::new(1999, 2)));

        assert_eq!(frozen[1].order_id, Set(100));
        assert_eq!(frozen[1].product_id, Set(11));
        assert_eq!(frozen[1].quantity, Set(1));
        assert_eq!(frozen[1].price, Set(Decimal::new(500, 2)));

        assert_eq!(CartService::compute_total(&lines), Decimal::new(4498, 2)); // 44.98
    }

    #[tokio::test]
    async fn test_place_order_echec_en_cours_de_transfert() {
        // Violation de contrainte pendant l'insertion de la commande:
        // place_order échoue et la transaction non committée est annulée,
        // le panier reste intact (rien n'est committé)
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![cart_model(7, 1)]])
            .append_query_results([vec![item_model(1, 7, 10, 2)]])
            .append_query_results([vec![product_model(10, Decimal::new(1999, 2))]])
            .append_query_errors([DbErr::Custom("constraint violation".to_string())])
            .into_connection();

        let result = OrderService::place_order(&db, 1, "9876543210").await;
        assert!(matches!(result, Err(ServiceError::Db(_))));
    }

    #[tokio::test]
    async fn test_cancel_order_inexistante() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<order::Model>::new()])
            .into_connection();

        let result = OrderService::cancel_order(&db, 1, 42).await;
        assert!(matches!(result, Err(ServiceError::NotFound("Order"))));
    }

    #[tokio::test]
    async fn test_cancel_order_renseigne_cancelled_at() {
        let cancelled = order::Model {
            status: OrderStatus::Cancelled,
            cancelled_at: Some(Utc::now()),
            ..order_model(42, 1, OrderStatus::Cancelled)
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order_model(42, 1, OrderStatus::Pending)]])
            .append_query_results([vec![cancelled]])
            .into_connection();

        let result = OrderService::cancel_order(&db, 1, 42).await.unwrap();
        assert_eq!(result.status, OrderStatus::Cancelled);
        assert!(result.cancelled_at.is_some());
    }

    #[tokio::test]
    async fn test_cancel_order_deja_annulee() {
        // Deuxième annulation: la commande n'est plus "pending"
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order_model(42, 1, OrderStatus::Cancelled)]])
            .into_connection();

        let result = OrderService::cancel_order(&db, 1, 42).await;
        assert!(matches!(result, Err(ServiceError::InvalidStateTransition(_))));
    }

    #[tokio::test]
    async fn test_cancel_order_livree() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order_model(42, 1, OrderStatus::Delivered)]])
            .into_connection();

        let result = OrderService::cancel_order(&db, 1, 42).await;
        match result {
            Err(ServiceError::InvalidStateTransition(status)) => assert_eq!(status, "delivered"),
            other => panic!("expected InvalidStateTransition, got {:?}", other),
        }
    }
}
