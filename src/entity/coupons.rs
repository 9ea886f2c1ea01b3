use sea_orm::entity::prelude::*;

use crate::checkout::CouponTerms;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    /// Stored upper-case.
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub description: String,
    pub discount_percent: i32,
    pub for_new_user: bool,
    pub for_member: bool,
    pub is_public: bool,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn terms(&self) -> CouponTerms {
        CouponTerms {
            discount_percent: self.discount_percent,
            for_new_user: self.for_new_user,
            for_member: self.for_member,
            expires_at: self.expires_at.with_timezone(&chrono::Utc),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
