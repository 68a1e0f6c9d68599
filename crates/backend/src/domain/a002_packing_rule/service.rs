use super::repository;
use contracts::domain::a002_packing_rule::aggregate::{PackingRule, PackingRuleDto};
use contracts::errors::{CoreError, CoreResult};
use sea_orm::SqlErr;
use uuid::Uuid;

use crate::domain::a001_packing_template;

pub async fn create(dto: PackingRuleDto) -> CoreResult<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("PR-{}", Uuid::new_v4()));

    let mut aggregate = PackingRule::new_for_insert(
        code,
        dto.description,
        dto.brand_id,
        dto.product_type_id,
        dto.packing_template_id,
        dto.is_fragile,
        dto.ships_in_own_box,
        dto.can_override,
        dto.comment,
    );

    aggregate.validate().map_err(CoreError::Validation)?;

    ensure_template_exists(aggregate.packing_template_id.as_deref()).await?;

    aggregate.before_write();

    match repository::insert(&aggregate).await {
        Ok(uuid) => Ok(uuid),
        // Дубликат пары (бренд, тип товара) — конфликт, существующее правило не трогаем
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Err(CoreError::state_conflict(format!(
                "Правило упаковки для пары ({}, {}) уже существует",
                aggregate.brand_id, aggregate.product_type_id
            ))),
            _ => Err(CoreError::Internal(e.into())),
        },
    }
}

pub async fn update(dto: PackingRuleDto) -> CoreResult<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| CoreError::validation("Некорректный ID правила"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::data_integrity("Правило упаковки не найдено"))?;

    aggregate.update(&dto);

    aggregate.validate().map_err(CoreError::Validation)?;

    ensure_template_exists(aggregate.packing_template_id.as_deref()).await?;

    aggregate.before_write();

    Ok(repository::update(&aggregate).await?)
}

/// Назначаемый шаблон обязан существовать уже при записи правила
async fn ensure_template_exists(template_id: Option<&str>) -> CoreResult<()> {
    let Some(template_id) = template_id else {
        return Ok(());
    };
    let uuid = Uuid::parse_str(template_id)
        .map_err(|_| CoreError::validation("Некорректный ID шаблона упаковки"))?;
    if a001_packing_template::repository::get_by_id(uuid)
        .await?
        .is_none()
    {
        return Err(CoreError::data_integrity(format!(
            "Шаблон упаковки {} не найден",
            template_id
        )));
    }
    Ok(())
}

pub async fn delete(id: Uuid) -> CoreResult<bool> {
    Ok(repository::soft_delete(id).await?)
}

pub async fn get_by_id(id: Uuid) -> CoreResult<Option<PackingRule>> {
    Ok(repository::get_by_id(id).await?)
}

pub async fn list_all() -> CoreResult<Vec<PackingRule>> {
    Ok(repository::list_all().await?)
}
