use contracts::domain::a001_packing_template::aggregate::PackingTemplate;
use contracts::domain::a002_packing_rule::aggregate::PackingRule;
use contracts::errors::{CoreError, CoreResult};
use contracts::shared::packaging::{BoxDimensions, PackagingResult};

/// Подбор коробки по строгому приоритету правил
///
/// Чистая функция над уже загруженными данными:
/// 1. Нет правила — системный шаблон по умолчанию.
/// 2. `ships_in_own_box` — коробка не подбирается, упаковка товара авторитетна.
/// 3. Назначенный шаблон: базовый размер + припуск по каждой оси;
///    шаблон не назначен — заявленные габариты товара без припуска.
/// 4. `can_override` — по каждой оси побеждает больший из двух размеров
///    (товар никогда молча не «урезается» под меньшую коробку);
///    запрет переопределения — переданные габариты игнорируются,
///    но об игнорировании сообщается флагом, а не молча.
///
/// Отсутствие правила подбор не ломает; отсутствие шаблона, на который
/// ссылается правило, — ошибка целостности данных.
pub fn resolve_box(
    rule: Option<&PackingRule>,
    template: Option<&PackingTemplate>,
    default_template: Option<&PackingTemplate>,
    declared: Option<BoxDimensions>,
) -> CoreResult<PackagingResult> {
    let rule = match rule {
        Some(rule) => rule,
        None => return resolve_default(default_template, declared),
    };

    if rule.ships_in_own_box {
        return Ok(PackagingResult::own_box(declared, rule.is_fragile));
    }

    match &rule.packing_template_id {
        Some(template_id) => {
            let template = template.ok_or_else(|| {
                CoreError::data_integrity(format!(
                    "Правило {} ссылается на отсутствующий шаблон упаковки {}",
                    rule.base.code, template_id
                ))
            })?;

            // Шаблон с нулевыми размерами — сигнал "без физической коробки"
            if template.is_no_box() {
                let mut result = PackagingResult::own_box(declared, rule.is_fragile);
                result.source_template_id = Some(template.to_string_id());
                return Ok(result);
            }

            let base_box = template.outer_dimensions();
            let (dimensions, ignored_override) =
                apply_override(base_box, declared, rule.can_override);

            Ok(PackagingResult {
                dimensions,
                is_fragile: rule.is_fragile,
                ships_in_own_box: false,
                source_template_id: Some(template.to_string_id()),
                ignored_override,
            })
        }
        None => {
            // Шаблон не назначен: размер товара и есть размер места,
            // сравнивать переопределение не с чем
            Ok(PackagingResult {
                dimensions: declared.unwrap_or_default(),
                is_fragile: rule.is_fragile,
                ships_in_own_box: false,
                source_template_id: None,
                ignored_override: false,
            })
        }
    }
}

/// Fallback при отсутствии правила: системный шаблон по умолчанию,
/// не хрупкий, не в своей упаковке, переопределение запрещено
fn resolve_default(
    default_template: Option<&PackingTemplate>,
    declared: Option<BoxDimensions>,
) -> CoreResult<PackagingResult> {
    let template = default_template.ok_or_else(|| {
        CoreError::data_integrity("Системный шаблон упаковки по умолчанию не настроен")
    })?;

    if template.is_no_box() {
        let mut result = PackagingResult::own_box(declared, false);
        result.source_template_id = Some(template.to_string_id());
        return Ok(result);
    }

    Ok(PackagingResult {
        dimensions: template.outer_dimensions(),
        is_fragile: false,
        ships_in_own_box: false,
        source_template_id: Some(template.to_string_id()),
        ignored_override: declared.is_some(),
    })
}

fn apply_override(
    base_box: BoxDimensions,
    declared: Option<BoxDimensions>,
    can_override: bool,
) -> (BoxDimensions, bool) {
    match declared {
        Some(declared) if can_override => (base_box.max_per_axis(&declared), false),
        Some(_) => (base_box, true),
        None => (base_box, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(l: f64, w: f64, h: f64, extra: f64, is_default: bool) -> PackingTemplate {
        PackingTemplate::new_for_insert(
            "PT-1".into(),
            "Коробка".into(),
            None,
            l,
            w,
            h,
            extra,
            is_default,
            None,
        )
    }

    fn rule(
        template: Option<&PackingTemplate>,
        is_fragile: bool,
        ships_in_own_box: bool,
        can_override: bool,
    ) -> PackingRule {
        PackingRule::new_for_insert(
            "PR-1".into(),
            "Правило".into(),
            "brand-x".into(),
            "tshirt".into(),
            template.map(|t| t.to_string_id()),
            is_fragile,
            ships_in_own_box,
            can_override,
            None,
        )
    }

    fn dims(l: f64, w: f64, h: f64) -> BoxDimensions {
        BoxDimensions::new(l, w, h)
    }

    #[test]
    fn test_no_rule_falls_back_to_default_template() {
        let default = template(20.0, 15.0, 10.0, 1.0, true);
        let result = resolve_box(None, None, Some(&default), None).unwrap();
        assert_eq!(result.dimensions, dims(21.0, 16.0, 11.0));
        assert!(!result.is_fragile);
        assert!(!result.ships_in_own_box);
        assert_eq!(result.source_template_id, Some(default.to_string_id()));
    }

    #[test]
    fn test_no_rule_and_no_default_is_integrity_error() {
        let err = resolve_box(None, None, None, None).unwrap_err();
        assert_eq!(err.kind(), "data_integrity");
    }

    #[test]
    fn test_no_rule_ignores_declared_override() {
        let default = template(20.0, 15.0, 10.0, 0.0, true);
        let result = resolve_box(None, None, Some(&default), Some(dims(50.0, 50.0, 50.0))).unwrap();
        assert_eq!(result.dimensions, dims(20.0, 15.0, 10.0));
        assert!(result.ignored_override);
    }

    #[test]
    fn test_ships_in_own_box_short_circuits() {
        let t = template(30.0, 20.0, 10.0, 2.0, false);
        let r = rule(Some(&t), true, true, true);
        let result = resolve_box(Some(&r), Some(&t), None, Some(dims(5.0, 5.0, 5.0))).unwrap();
        assert!(result.ships_in_own_box);
        assert!(result.is_fragile);
        assert_eq!(result.dimensions, dims(5.0, 5.0, 5.0));
        assert_eq!(result.source_template_id, None);
    }

    #[test]
    fn test_scenario_a_template_plus_extra() {
        // (brandX, tshirt): Box-S 30x20x10, extra 2, не хрупкий, запрет переопределения
        let t = template(30.0, 20.0, 10.0, 2.0, false);
        let r = rule(Some(&t), false, false, false);
        let result = resolve_box(Some(&r), Some(&t), None, None).unwrap();
        assert_eq!(result.dimensions, dims(32.0, 22.0, 12.0));
        assert!(!result.is_fragile);
        assert!(!result.ships_in_own_box);
        assert!(!result.ignored_override);
    }

    #[test]
    fn test_scenario_b_no_template_declared_stands() {
        // (brandY, vase): шаблон не назначен, хрупкий, переопределение разрешено
        let r = rule(None, true, false, true);
        let result = resolve_box(Some(&r), None, None, Some(dims(40.0, 40.0, 40.0))).unwrap();
        assert_eq!(result.dimensions, dims(40.0, 40.0, 40.0));
        assert!(result.is_fragile);
        assert!(!result.ships_in_own_box);
        assert_eq!(result.source_template_id, None);
    }

    #[test]
    fn test_can_override_takes_max_per_axis() {
        let t = template(30.0, 20.0, 10.0, 0.0, false);
        let r = rule(Some(&t), false, false, true);
        // Товар длиннее и выше коробки, но уже по ширине
        let result = resolve_box(Some(&r), Some(&t), None, Some(dims(35.0, 15.0, 12.0))).unwrap();
        assert_eq!(result.dimensions, dims(35.0, 20.0, 12.0));
        assert!(!result.ignored_override);
    }

    #[test]
    fn test_cannot_override_keeps_rule_box_and_warns() {
        let t = template(30.0, 20.0, 10.0, 0.0, false);
        let r = rule(Some(&t), false, false, false);
        let result = resolve_box(Some(&r), Some(&t), None, Some(dims(90.0, 90.0, 90.0))).unwrap();
        assert_eq!(result.dimensions, dims(30.0, 20.0, 10.0));
        assert!(result.ignored_override);
    }

    #[test]
    fn test_zero_template_treated_as_own_box() {
        let t = template(0.0, 0.0, 0.0, 0.0, false);
        let r = rule(Some(&t), false, false, true);
        let result = resolve_box(Some(&r), Some(&t), None, Some(dims(10.0, 10.0, 10.0))).unwrap();
        assert!(result.ships_in_own_box);
        assert_eq!(result.dimensions, dims(10.0, 10.0, 10.0));
        assert_eq!(result.source_template_id, Some(t.to_string_id()));
    }

    #[test]
    fn test_missing_referenced_template_is_integrity_error() {
        let t = template(30.0, 20.0, 10.0, 0.0, false);
        let r = rule(Some(&t), false, false, false);
        // Шаблон числится в правиле, но загрузить его не удалось
        let err = resolve_box(Some(&r), None, None, None).unwrap_err();
        assert_eq!(err.kind(), "data_integrity");
    }
}
