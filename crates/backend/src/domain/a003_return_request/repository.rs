use chrono::Utc;
use contracts::domain::a003_return_request::aggregate::{ReturnRequest, ReturnRequestId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::enums::{RequestStatus, RequestType, ShipmentKind};
use contracts::shared::packaging::BoxDimensions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_return_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub order_id: String,
    pub order_item_id: String,
    pub user_id: String,
    pub brand_id: String,
    pub product_type_id: String,
    pub item_name: String,
    pub declared_dimensions_json: Option<String>,
    pub weight_grams: i32,
    pub request_type: String,
    pub new_variant_id: Option<String>,
    pub reason: Option<String>,
    pub images_json: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_pincode: String,
    pub original_waybill: Option<String>,
    pub status: String,
    pub waybill_number: Option<String>,
    pub shipment_kind: Option<String>,
    pub fulfilled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub carrier_response_json: Option<String>,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ReturnRequest {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let declared_dimensions: Option<BoxDimensions> = m
            .declared_dimensions_json
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok());
        let images: Vec<String> = serde_json::from_str(&m.images_json).unwrap_or_default();

        ReturnRequest {
            base: BaseAggregate::with_metadata(
                ReturnRequestId(uuid),
                m.code,
                m.description,
                m.comment.clone(),
                metadata,
            ),
            order_id: m.order_id,
            order_item_id: m.order_item_id,
            user_id: m.user_id,
            brand_id: m.brand_id,
            product_type_id: m.product_type_id,
            item_name: m.item_name,
            declared_dimensions,
            weight_grams: m.weight_grams,
            request_type: RequestType::from_code(&m.request_type).unwrap_or(RequestType::Return),
            new_variant_id: m.new_variant_id,
            reason: m.reason,
            images,
            original_waybill: m.original_waybill,
            customer_name: m.customer_name,
            customer_phone: m.customer_phone,
            customer_address: m.customer_address,
            customer_pincode: m.customer_pincode,
            status: RequestStatus::from_code(&m.status).unwrap_or(RequestStatus::Pending),
            waybill_number: m.waybill_number,
            shipment_kind: m.shipment_kind.as_deref().and_then(ShipmentKind::from_code),
            fulfilled_at: m.fulfilled_at,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Параметры запроса списка заявок
#[derive(Debug, Clone, Default)]
pub struct ReturnRequestListQuery {
    pub status: Option<RequestStatus>,
    pub request_type: Option<RequestType>,
    pub user_id: Option<String>,
    pub brand_id: Option<String>,
    pub order_id: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug)]
pub struct ReturnRequestListResult {
    pub items: Vec<ReturnRequest>,
    pub total: usize,
}

/// Серверные итоги по датасету (с учётом фильтра is_deleted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequestTotals {
    pub total_records: usize,
    pub pending_count: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    /// Одобренные без накладной — требуют повторного создания отправления
    pub unfulfilled_count: usize,
}

pub async fn insert(aggregate: &ReturnRequest) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        order_id: Set(aggregate.order_id.clone()),
        order_item_id: Set(aggregate.order_item_id.clone()),
        user_id: Set(aggregate.user_id.clone()),
        brand_id: Set(aggregate.brand_id.clone()),
        product_type_id: Set(aggregate.product_type_id.clone()),
        item_name: Set(aggregate.item_name.clone()),
        declared_dimensions_json: Set(aggregate
            .declared_dimensions
            .as_ref()
            .and_then(|d| serde_json::to_string(d).ok())),
        weight_grams: Set(aggregate.weight_grams),
        request_type: Set(aggregate.request_type.code().to_string()),
        new_variant_id: Set(aggregate.new_variant_id.clone()),
        reason: Set(aggregate.reason.clone()),
        images_json: Set(serde_json::to_string(&aggregate.images).unwrap_or_else(|_| "[]".into())),
        customer_name: Set(aggregate.customer_name.clone()),
        customer_phone: Set(aggregate.customer_phone.clone()),
        customer_address: Set(aggregate.customer_address.clone()),
        customer_pincode: Set(aggregate.customer_pincode.clone()),
        original_waybill: Set(aggregate.original_waybill.clone()),
        status: Set(aggregate.status.code().to_string()),
        waybill_number: Set(aggregate.waybill_number.clone()),
        shipment_kind: Set(aggregate.shipment_kind.map(|k| k.code().to_string())),
        fulfilled_at: Set(aggregate.fulfilled_at),
        carrier_response_json: Set(None),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(conn()).await?;
    Ok(uuid)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<ReturnRequest>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn list_filtered(query: &ReturnRequestListQuery) -> anyhow::Result<ReturnRequestListResult> {
    let mut find = Entity::find().filter(Column::IsDeleted.eq(false));

    if let Some(status) = query.status {
        find = find.filter(Column::Status.eq(status.code()));
    }
    if let Some(request_type) = query.request_type {
        find = find.filter(Column::RequestType.eq(request_type.code()));
    }
    if let Some(ref user_id) = query.user_id {
        find = find.filter(Column::UserId.eq(user_id.clone()));
    }
    if let Some(ref brand_id) = query.brand_id {
        find = find.filter(Column::BrandId.eq(brand_id.clone()));
    }
    if let Some(ref order_id) = query.order_id {
        find = find.filter(Column::OrderId.eq(order_id.clone()));
    }

    let total = find.clone().count(conn()).await? as usize;

    let items: Vec<ReturnRequest> = find
        .order_by_desc(Column::CreatedAt)
        .offset(query.offset as u64)
        .limit(query.limit as u64)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(ReturnRequestListResult { items, total })
}

pub async fn calculate_totals() -> anyhow::Result<ReturnRequestTotals> {
    let base = || Entity::find().filter(Column::IsDeleted.eq(false));

    let total_records = base().count(conn()).await? as usize;
    let pending_count = base()
        .filter(Column::Status.eq(RequestStatus::Pending.code()))
        .count(conn())
        .await? as usize;
    let approved_count = base()
        .filter(Column::Status.eq(RequestStatus::Approved.code()))
        .count(conn())
        .await? as usize;
    let rejected_count = base()
        .filter(Column::Status.eq(RequestStatus::Rejected.code()))
        .count(conn())
        .await? as usize;
    let unfulfilled_count = base()
        .filter(Column::Status.eq(RequestStatus::Approved.code()))
        .filter(Column::WaybillNumber.is_null())
        .count(conn())
        .await? as usize;

    Ok(ReturnRequestTotals {
        total_records,
        pending_count,
        approved_count,
        rejected_count,
        unfulfilled_count,
    })
}

/// Атомарный условный переход статуса (compare-and-set)
///
/// Обновляет запись только если текущий статус равен `from`; из двух
/// конкурентных переходов по одной заявке ровно один вернёт true.
pub async fn transition_status(
    id: Uuid,
    from: RequestStatus,
    to: RequestStatus,
) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::Status, Expr::value(to.code()))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::Status.eq(from.code()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

/// Прикрепить накладную перевозчика к одобренной заявке
pub async fn attach_shipment(
    id: Uuid,
    waybill_number: &str,
    kind: ShipmentKind,
    carrier_response_json: Option<String>,
) -> anyhow::Result<()> {
    use sea_orm::sea_query::Expr;
    Entity::update_many()
        .col_expr(Column::WaybillNumber, Expr::value(waybill_number))
        .col_expr(Column::ShipmentKind, Expr::value(kind.code()))
        .col_expr(Column::FulfilledAt, Expr::value(Utc::now()))
        .col_expr(Column::CarrierResponseJson, Expr::value(carrier_response_json))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(conn())
        .await?;
    Ok(())
}

/// Одобренные заявки без созданного отправления
pub async fn list_approved_unfulfilled() -> anyhow::Result<Vec<ReturnRequest>> {
    let items: Vec<ReturnRequest> = Entity::find()
        .filter(Column::Status.eq(RequestStatus::Approved.code()))
        .filter(Column::WaybillNumber.is_null())
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::UpdatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}
