use sea_orm::entity::prelude::*;

/// An account's explicit override of a category default. A row exists only
/// when the account has made a choice; absence falls through to the category.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "downloadprefs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub sid3: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub categoryid: i64,
    pub enabled: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
