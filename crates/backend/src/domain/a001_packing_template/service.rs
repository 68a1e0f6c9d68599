use super::repository;
use contracts::domain::a001_packing_template::aggregate::{PackingTemplate, PackingTemplateDto};
use contracts::errors::{CoreError, CoreResult};
use uuid::Uuid;

pub async fn create(dto: PackingTemplateDto) -> CoreResult<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("PT-{}", Uuid::new_v4()));

    let mut aggregate = PackingTemplate::new_for_insert(
        code,
        dto.description,
        dto.label,
        dto.base_length_cm,
        dto.base_width_cm,
        dto.base_height_cm,
        dto.extra_cm,
        dto.is_default,
        dto.comment,
    );

    aggregate.validate().map_err(CoreError::Validation)?;

    aggregate.before_write();

    Ok(repository::insert(&aggregate).await?)
}

pub async fn update(dto: PackingTemplateDto) -> CoreResult<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| CoreError::validation("Некорректный ID шаблона"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::data_integrity("Шаблон упаковки не найден"))?;

    aggregate.update(&dto);

    aggregate.validate().map_err(CoreError::Validation)?;

    aggregate.before_write();

    Ok(repository::update(&aggregate).await?)
}

pub async fn delete(id: Uuid) -> CoreResult<bool> {
    Ok(repository::soft_delete(id).await?)
}

pub async fn get_by_id(id: Uuid) -> CoreResult<Option<PackingTemplate>> {
    Ok(repository::get_by_id(id).await?)
}

pub async fn list_all() -> CoreResult<Vec<PackingTemplate>> {
    Ok(repository::list_all().await?)
}
