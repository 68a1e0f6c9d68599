pub mod resolver;

use contracts::errors::{CoreError, CoreResult};
use contracts::shared::packaging::{BoxDimensions, PackagingResult};
use uuid::Uuid;

use crate::domain::{a001_packing_template, a002_packing_rule};

/// Подбор упаковки для пары (бренд, тип товара)
///
/// Загружает правило и шаблоны из хранилища и передаёт их чистому
/// резолверу. Отсутствие правила — штатный fallback; битая ссылка на
/// шаблон — ошибка целостности данных.
pub async fn resolve(
    brand_id: &str,
    product_type_id: &str,
    declared: Option<BoxDimensions>,
) -> CoreResult<PackagingResult> {
    let rule =
        a002_packing_rule::repository::get_by_rule_key(brand_id, product_type_id).await?;

    let template = match rule
        .as_ref()
        .filter(|r| !r.ships_in_own_box)
        .and_then(|r| r.packing_template_id.clone())
    {
        Some(template_id) => {
            let uuid = Uuid::parse_str(&template_id).map_err(|_| {
                CoreError::data_integrity(format!(
                    "Некорректный ID шаблона упаковки в правиле: {}",
                    template_id
                ))
            })?;
            a001_packing_template::repository::get_by_id(uuid).await?
        }
        None => None,
    };

    let default_template = if rule.is_none() {
        a001_packing_template::repository::get_default().await?
    } else {
        None
    };

    resolver::resolve_box(
        rule.as_ref(),
        template.as_ref(),
        default_template.as_ref(),
        declared,
    )
}
