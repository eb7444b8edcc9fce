// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Utilisateurs (auth JWT + profil phone/address)
//   - category : Catégories de produits (slug unique dérivé du nom)
//   - product : Produits du catalogue (prix en Decimal)
//   - cart : Panier (un seul panier actif par utilisateur)
//   - cart_item : Lignes du panier (unique sur cart_id + product_id)
//   - order : Commandes (snapshot immuable + statut de cycle de vie)
//   - order_item : Lignes de commande (prix figé au moment de la commande)
//   - dto : Data Transfer Objects pour les réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les montants utilisent rust_decimal (jamais de f64 pour l'argent)
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod health;
pub mod users;
pub mod category;
pub mod product;
pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod dto;
