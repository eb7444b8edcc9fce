use actix_web::HttpResponse;
use sea_orm::DbErr;
use thiserror::Error;

/// Taxonomie d'erreurs des services (panier, commandes, compte).
///
/// Chaque variante a un statut HTTP fixe; les routes se contentent
/// d'appeler `to_http()` au lieu de mapper au cas par cas.
#[derive(Debug, Error)]
pub enum ServiceError {
    // Entrée invalide (téléphone, mots de passe, champ manquant) → 400
    #[error("{0}")]
    Validation(String),

    // Ressource absente ou n'appartenant pas à l'utilisateur → 404
    #[error("{0} not found")]
    NotFound(&'static str),

    // Commande sur panier vide → 400
    #[error("Cart is empty")]
    EmptyCart,

    // Annulation d'une commande qui n'est plus "pending" → 400
    #[error("Order status is {0}, cannot cancel")]
    InvalidStateTransition(String),

    // Tout le reste (BD, contrainte violée) → 500
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

impl ServiceError {
    pub fn to_http(&self) -> HttpResponse {
        let body = serde_json::json!({ "error": self.to_string() });
        match self {
            ServiceError::Validation(_)
            | ServiceError::EmptyCart
            | ServiceError::InvalidStateTransition(_) => HttpResponse::BadRequest().json(body),
            ServiceError::NotFound(_) => HttpResponse::NotFound().json(body),
            ServiceError::Db(e) => {
                tracing::error!("database error: {}", e);
                HttpResponse::InternalServerError().json(body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_mapping_statuts_http() {
        assert_eq!(
            ServiceError::Validation("bad".into()).to_http().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound("Product").to_http().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::EmptyCart.to_http().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidStateTransition("delivered".into())
                .to_http()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
