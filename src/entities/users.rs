use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub created_at: DateTimeUtc,

    pub screen_name: String,

    /// Case-folded screen name; lookups and uniqueness go through this.
    #[sea_orm(unique)]
    pub screen_name_normalized: String,

    pub email_address: Option<String>,

    #[sea_orm(unique)]
    pub email_address_normalized: Option<String>,

    /// Set once the account has been confirmed/activated.
    pub initialized: bool,

    pub suspended: bool,

    pub deleted: bool,

    pub locale: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
