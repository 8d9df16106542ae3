use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ott_name: String,
    pub package_name: String,
    pub duration: String,
    /// List price.
    pub price: i64,
    /// Standing discounted price, the base for checkout when no flash sale runs.
    pub offer_price: i64,
    pub description: Option<String>,
    pub features: Json,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub average_rating: f64,
    pub review_count: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::flash_sales::Entity")]
    FlashSales,
    #[sea_orm(has_many = "super::wishlists::Entity")]
    Wishlists,
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::flash_sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlashSales.def()
    }
}

impl Related<super::wishlists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wishlists.def()
    }
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
