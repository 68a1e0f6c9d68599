use chrono::Utc;
use contracts::domain::a001_packing_template::aggregate::{PackingTemplate, PackingTemplateId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_packing_template")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub label: Option<String>,
    pub base_length_cm: f64,
    pub base_width_cm: f64,
    pub base_height_cm: f64,
    pub extra_cm: f64,
    pub is_default: bool,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PackingTemplate {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        PackingTemplate {
            base: BaseAggregate::with_metadata(
                PackingTemplateId(uuid),
                m.code,
                m.description,
                m.comment.clone(),
                metadata,
            ),
            label: m.label,
            base_length_cm: m.base_length_cm,
            base_width_cm: m.base_width_cm,
            base_height_cm: m.base_height_cm,
            extra_cm: m.extra_cm,
            is_default: m.is_default,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active_model(aggregate: &PackingTemplate) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        label: Set(aggregate.label.clone()),
        base_length_cm: Set(aggregate.base_length_cm),
        base_width_cm: Set(aggregate.base_width_cm),
        base_height_cm: Set(aggregate.base_height_cm),
        extra_cm: Set(aggregate.extra_cm),
        is_default: Set(aggregate.is_default),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all() -> anyhow::Result<Vec<PackingTemplate>> {
    let mut items: Vec<PackingTemplate> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    items.sort_by(|a, b| a.base.code.cmp(&b.base.code));
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<PackingTemplate>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

/// Системный шаблон по умолчанию: наименьший по объёму из помеченных default
pub async fn get_default() -> anyhow::Result<Option<PackingTemplate>> {
    let defaults: Vec<PackingTemplate> = Entity::find()
        .filter(Column::IsDefault.eq(true))
        .filter(Column::IsDeleted.eq(false))
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(defaults.into_iter().min_by(|a, b| {
        let va = a.outer_dimensions();
        let vb = b.outer_dimensions();
        let va = va.length_cm * va.width_cm * va.height_cm;
        let vb = vb.length_cm * vb.width_cm * vb.height_cm;
        va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
    }))
}

pub async fn insert(aggregate: &PackingTemplate) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active_model(aggregate).insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &PackingTemplate) -> anyhow::Result<()> {
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
