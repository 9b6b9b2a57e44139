use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "authn_identity_tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub created_at: DateTimeUtc,

    pub creator_id: Uuid,

    /// Identifier as entered by the creator.
    pub identifier: String,

    /// Lowercased identifier; carries the uniqueness guarantee.
    #[sea_orm(unique)]
    pub identifier_normalized: String,

    pub user_id: Uuid,

    pub note: Option<String>,

    pub suspended: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
