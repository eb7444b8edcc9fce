use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};

use crate::utils::slug::slugify;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    // Slug URL-safe dérivé du nom à la création, jamais recalculé ensuite
    #[sea_orm(unique)]
    pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product::Entity")]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    // Dérive le slug du nom à l'insertion s'il n'est pas fourni.
    // Un renommage ultérieur ne recalcule pas le slug (il est immuable
    // une fois créé, les URLs restent stables).
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            let missing_slug = match &self.slug {
                ActiveValue::Set(s) => s.trim().is_empty(),
                _ => true,
            };
            if missing_slug {
                if let ActiveValue::Set(name) = &self.name {
                    self.slug = Set(slugify(name));
                }
            }
        }
        Ok(self)
    }
}
