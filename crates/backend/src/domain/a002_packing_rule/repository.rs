use chrono::Utc;
use contracts::domain::a002_packing_rule::aggregate::{PackingRule, PackingRuleId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_packing_rule")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub brand_id: String,
    pub product_type_id: String,
    pub packing_template_id: Option<String>,
    pub is_fragile: bool,
    pub ships_in_own_box: bool,
    pub can_override: bool,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PackingRule {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        PackingRule {
            base: BaseAggregate::with_metadata(
                PackingRuleId(uuid),
                m.code,
                m.description,
                m.comment.clone(),
                metadata,
            ),
            brand_id: m.brand_id,
            product_type_id: m.product_type_id,
            packing_template_id: m.packing_template_id,
            is_fragile: m.is_fragile,
            ships_in_own_box: m.ships_in_own_box,
            can_override: m.can_override,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active_model(aggregate: &PackingRule) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        brand_id: Set(aggregate.brand_id.clone()),
        product_type_id: Set(aggregate.product_type_id.clone()),
        packing_template_id: Set(aggregate.packing_template_id.clone()),
        is_fragile: Set(aggregate.is_fragile),
        ships_in_own_box: Set(aggregate.ships_in_own_box),
        can_override: Set(aggregate.can_override),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all() -> anyhow::Result<Vec<PackingRule>> {
    let mut items: Vec<PackingRule> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    items.sort_by(|a, b| a.brand_id.cmp(&b.brand_id).then(a.product_type_id.cmp(&b.product_type_id)));
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<PackingRule>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

/// Правило для пары (бренд, тип товара)
pub async fn get_by_rule_key(
    brand_id: &str,
    product_type_id: &str,
) -> anyhow::Result<Option<PackingRule>> {
    let result = Entity::find()
        .filter(Column::BrandId.eq(brand_id))
        .filter(Column::ProductTypeId.eq(product_type_id))
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

/// Вставка возвращает DbErr, чтобы сервис различал нарушение
/// уникальности пары (бренд, тип товара)
pub async fn insert(aggregate: &PackingRule) -> Result<Uuid, DbErr> {
    let uuid = aggregate.base.id.value();
    to_active_model(aggregate).insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &PackingRule) -> anyhow::Result<()> {
    let mut active = to_active_model(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}
