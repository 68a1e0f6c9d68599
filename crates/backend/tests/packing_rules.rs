use uuid::Uuid;

use backend::domain::{a001_packing_template, a002_packing_rule};
use backend::shared::data::db;
use backend::shared::packaging;
use contracts::domain::a001_packing_template::aggregate::PackingTemplateDto;
use contracts::domain::a002_packing_rule::aggregate::PackingRuleDto;
use contracts::shared::packaging::BoxDimensions;

fn template_dto(description: &str, l: f64, w: f64, h: f64, extra: f64, is_default: bool) -> PackingTemplateDto {
    PackingTemplateDto {
        description: description.into(),
        base_length_cm: l,
        base_width_cm: w,
        base_height_cm: h,
        extra_cm: extra,
        is_default,
        ..Default::default()
    }
}

fn rule_dto(
    brand_id: &str,
    product_type_id: &str,
    template_id: Option<String>,
    is_fragile: bool,
    ships_in_own_box: bool,
    can_override: bool,
) -> PackingRuleDto {
    PackingRuleDto {
        description: format!("Правило {}/{}", brand_id, product_type_id),
        brand_id: brand_id.into(),
        product_type_id: product_type_id.into(),
        packing_template_id: template_id,
        is_fragile,
        ships_in_own_box,
        can_override,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_packing_rules_and_resolution() -> anyhow::Result<()> {
    let db_path = std::env::temp_dir().join(format!("packing_rules_test_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&db_path);
    db::initialize_database(Some(&db_path.to_string_lossy())).await?;

    // --- каталог: отрицательные размеры отклоняются при записи ---
    let err = a001_packing_template::service::create(template_dto("Кривая", -1.0, 10.0, 10.0, 0.0, false))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation");

    let default_id =
        a001_packing_template::service::create(template_dto("По умолчанию", 20.0, 15.0, 10.0, 1.0, true))
            .await?;
    let box_s_id =
        a001_packing_template::service::create(template_dto("Box-S", 30.0, 20.0, 10.0, 2.0, false))
            .await?;

    // --- правило (brandX, tshirt): Box-S, без переопределения ---
    a002_packing_rule::service::create(rule_dto(
        "brand-x",
        "tshirt",
        Some(box_s_id.to_string()),
        false,
        false,
        false,
    ))
    .await?;

    // дубликат пары — конфликт, исходное правило не изменяется
    let original = a002_packing_rule::repository::get_by_rule_key("brand-x", "tshirt")
        .await?
        .unwrap();
    let err = a002_packing_rule::service::create(rule_dto(
        "brand-x",
        "tshirt",
        None,
        true,
        true,
        true,
    ))
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "state_conflict");
    let untouched = a002_packing_rule::repository::get_by_rule_key("brand-x", "tshirt")
        .await?
        .unwrap();
    assert_eq!(untouched.base.id.value(), original.base.id.value());
    assert_eq!(untouched.packing_template_id, original.packing_template_id);

    // правило со ссылкой на несуществующий шаблон не записывается
    let err = a002_packing_rule::service::create(rule_dto(
        "brand-x",
        "mug",
        Some(Uuid::new_v4().to_string()),
        false,
        false,
        false,
    ))
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "data_integrity");

    // --- подбор: базовый размер плюс припуск по каждой оси ---
    let result = packaging::resolve("brand-x", "tshirt", None).await?;
    assert_eq!(result.dimensions, BoxDimensions::new(32.0, 22.0, 12.0));
    assert!(!result.is_fragile);
    assert!(!result.ships_in_own_box);
    assert_eq!(result.source_template_id, Some(box_s_id.to_string()));

    // запрет переопределения: переданные габариты не меняют коробку
    let result =
        packaging::resolve("brand-x", "tshirt", Some(BoxDimensions::new(90.0, 90.0, 90.0))).await?;
    assert_eq!(result.dimensions, BoxDimensions::new(32.0, 22.0, 12.0));
    assert!(result.ignored_override);

    // --- правило (brandY, vase): без шаблона, хрупкое, переопределение разрешено ---
    a002_packing_rule::service::create(rule_dto("brand-y", "vase", None, true, false, true)).await?;

    let result =
        packaging::resolve("brand-y", "vase", Some(BoxDimensions::new(40.0, 40.0, 40.0))).await?;
    assert_eq!(result.dimensions, BoxDimensions::new(40.0, 40.0, 40.0));
    assert!(result.is_fragile);
    assert_eq!(result.source_template_id, None);

    // --- товар в собственной упаковке ---
    a002_packing_rule::service::create(rule_dto("brand-y", "kettle", None, false, true, false))
        .await?;

    let result =
        packaging::resolve("brand-y", "kettle", Some(BoxDimensions::new(25.0, 25.0, 30.0))).await?;
    assert!(result.ships_in_own_box);
    assert_eq!(result.dimensions, BoxDimensions::new(25.0, 25.0, 30.0));

    // --- нет правила: системный шаблон по умолчанию ---
    let result = packaging::resolve("brand-z", "socks", None).await?;
    assert_eq!(result.dimensions, BoxDimensions::new(21.0, 16.0, 11.0));
    assert!(!result.is_fragile);
    assert_eq!(result.source_template_id, Some(default_id.to_string()));

    // --- правило пережило свой шаблон: ошибка целостности данных ---
    let orphan_template_id =
        a001_packing_template::service::create(template_dto("Времянка", 10.0, 10.0, 10.0, 0.0, false))
            .await?;
    a002_packing_rule::service::create(rule_dto(
        "brand-z",
        "lamp",
        Some(orphan_template_id.to_string()),
        false,
        false,
        false,
    ))
    .await?;
    a001_packing_template::service::delete(orphan_template_id).await?;

    let err = packaging::resolve("brand-z", "lamp", None).await.unwrap_err();
    assert_eq!(err.kind(), "data_integrity");

    // после удаления правила пара снова свободна
    let rule = a002_packing_rule::repository::get_by_rule_key("brand-z", "lamp")
        .await?
        .unwrap();
    a002_packing_rule::service::delete(rule.base.id.value()).await?;
    a002_packing_rule::service::create(rule_dto("brand-z", "lamp", None, false, false, false))
        .await?;

    Ok(())
}
