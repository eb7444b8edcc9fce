use actix_web::{post, get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, Set, ActiveModelTrait, SqlErr};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::users::{Entity as Users, Column as UserColumn, ActiveModel as UserActiveModel};
use crate::models::dto::UserResponse;
use crate::utils::{password, jwt};
use crate::middleware::AuthUser;

// DTO pour l'inscription (avec confirmation du mot de passe)
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub password2: String,
}

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// Réponse après login
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
    pub username: String,
}

// Réponse pour /auth/me
#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: i32,
    pub username: String,
}

/// POST /api/auth/register - Créer un compte (PUBLIC)
/// Le mot de passe n'est jamais stocké en clair, uniquement son hash PBKDF2
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Valider l'entrée (mots de passe identiques, champs requis)
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    // 2. Vérifier que le nom d'utilisateur est libre
    let existing_user = Users::find()
        .filter(UserColumn::Username.eq(&body.username))
        .one(db.get_ref())
        .await;

    match existing_user {
        Ok(Some(_)) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Username already exists"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
        _ => {}
    }

    // 3. Hash du mot de passe
    let password_hash = match password::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to hash password: {}", e)
            }));
        }
    };

    // 4. Créer l'utilisateur
    let new_user = UserActiveModel {
        username: Set(body.username.clone()),
        email: Set(body.email.clone()),
        password_hash: Set(password_hash),
        phone: Set(None),
        address: Set(None),
        ..Default::default()
    };

    let user = match new_user.insert(db.get_ref()).await {
        Ok(user) => user,
        // Inscription concurrente avec le même nom entre la vérification et
        // l'insertion: la contrainte UNIQUE sur username tranche, même
        // réponse que la pré-vérification
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Username already exists"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to create user: {}", e)
            }));
        }
    };

    // 5. Vue publique uniquement (id, username, email)
    HttpResponse::Created().json(serde_json::json!({
        "message": "User created successfully",
        "user": UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    }))
}

/// POST /api/auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Trouver l'utilisateur
    let user = Users::find()
        .filter(UserColumn::Username.eq(&body.username))
        .one(db.get_ref())
        .await;

    let user = match user {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid username or password"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    // 2. Vérifier le mot de passe
    let is_valid = match password::verify_password(&body.password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Password verification error: {}", e)
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid username or password"
        }));
    }

    // 3. Générer le JWT
    let token = match jwt::generate_token(user.id, &user.username) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
        username: user.username,
    })
}

/// GET /api/auth/me - Vérifier le token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        user_id: auth_user.user_id,
        username: auth_user.username,
    })
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(me)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::models::users;

    fn request(password: &str, password2: &str) -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: password.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn test_mots_de_passe_differents_rejetes() {
        assert!(request("secret123", "secret124").validate().is_err());
    }

    #[test]
    fn test_mots_de_passe_identiques_acceptes() {
        assert!(request("secret123", "secret123").validate().is_ok());
    }

    #[test]
    fn test_username_vide_rejete() {
        let mut req = request("secret123", "secret123");
        req.username = String::new();
        assert!(req.validate().is_err());
    }

    #[actix_web::test]
    async fn test_username_deja_pris_renvoie_400() {
        // Nom déjà en base: 400 avec le message attendu, pas un 409 ni un 500
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![users::Model {
                id: 1,
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "pbkdf2:sha256:260000$salt$hash".to_string(),
                phone: None,
                address: None,
            }]])
            .into_connection();

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .service(register),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/register")
            .set_json(serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "secret123",
                "password2": "secret123",
            }))
            .to_request();

        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "Username already exists");
    }
}
