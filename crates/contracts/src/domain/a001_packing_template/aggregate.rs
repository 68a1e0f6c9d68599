use crate::domain::common::{
    AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, EventStore, Origin,
};
use crate::shared::packaging::BoxDimensions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для шаблона упаковки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackingTemplateId(pub Uuid);

impl PackingTemplateId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for PackingTemplateId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(PackingTemplateId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Шаблон упаковки (агрегат)
///
/// Именованная базовая коробка плюс припуск на амортизацию. Правила
/// упаковки ссылаются на шаблон по ID и никогда не встраивают его.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingTemplate {
    #[serde(flatten)]
    pub base: BaseAggregate<PackingTemplateId>,

    /// Маркировка шаблона (например, ТН ВЭД-подобный тег), опционально
    pub label: Option<String>,

    /// Базовая длина коробки, см (0 — упаковка товара)
    #[serde(rename = "baseLengthCm")]
    pub base_length_cm: f64,

    /// Базовая ширина коробки, см
    #[serde(rename = "baseWidthCm")]
    pub base_width_cm: f64,

    /// Базовая высота коробки, см
    #[serde(rename = "baseHeightCm")]
    pub base_height_cm: f64,

    /// Припуск на амортизацию, добавляется к каждому измерению, см
    #[serde(rename = "extraCm")]
    pub extra_cm: f64,

    /// Системный шаблон по умолчанию (fallback при отсутствии правила)
    #[serde(rename = "isDefault")]
    pub is_default: bool,
}

impl PackingTemplate {
    #[allow(clippy::too_many_arguments)]
    pub fn new_for_insert(
        code: String,
        description: String,
        label: Option<String>,
        base_length_cm: f64,
        base_width_cm: f64,
        base_height_cm: f64,
        extra_cm: f64,
        is_default: bool,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(PackingTemplateId::new_v4(), code, description);
        base.comment = comment;
        Self {
            base,
            label,
            base_length_cm,
            base_width_cm,
            base_height_cm,
            extra_cm,
            is_default,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Базовые габариты без припуска
    pub fn base_dimensions(&self) -> BoxDimensions {
        BoxDimensions::new(self.base_length_cm, self.base_width_cm, self.base_height_cm)
    }

    /// Итоговые габариты: базовый размер плюс припуск по каждой оси
    pub fn outer_dimensions(&self) -> BoxDimensions {
        BoxDimensions::new(
            self.base_length_cm + self.extra_cm,
            self.base_width_cm + self.extra_cm,
            self.base_height_cm + self.extra_cm,
        )
    }

    /// Шаблон "без физической коробки": все размеры и припуск нулевые
    pub fn is_no_box(&self) -> bool {
        self.base_dimensions().is_zero() && self.extra_cm == 0.0
    }

    pub fn touch_updated(&mut self) {
        self.base.touch();
    }

    pub fn update(&mut self, dto: &PackingTemplateDto) {
        self.base.code = dto.code.clone().unwrap_or_default();
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.label = dto.label.clone();
        self.base_length_cm = dto.base_length_cm;
        self.base_width_cm = dto.base_width_cm;
        self.base_height_cm = dto.base_height_cm;
        self.extra_cm = dto.extra_cm;
        self.is_default = dto.is_default;
    }

    /// Вырожденные отрицательные размеры отклоняются при записи,
    /// резолвер упаковки их не обрабатывает
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Описание не может быть пустым".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("Код не может быть пустым".into());
        }
        if self.base_length_cm < 0.0 || self.base_width_cm < 0.0 || self.base_height_cm < 0.0 {
            return Err("Размеры коробки не могут быть отрицательными".into());
        }
        if self.extra_cm < 0.0 {
            return Err("Припуск не может быть отрицательным".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.touch_updated();
    }
}

impl AggregateRoot for PackingTemplate {
    type Id = PackingTemplateId;
    fn id(&self) -> Self::Id {
        self.base.id
    }
    fn code(&self) -> &str {
        &self.base.code
    }
    fn description(&self) -> &str {
        &self.base.description
    }
    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }
    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }
    fn events(&self) -> &EventStore {
        &self.base.events
    }
    fn events_mut(&mut self) -> &mut EventStore {
        &mut self.base.events
    }
    fn aggregate_index() -> &'static str {
        "a001"
    }
    fn collection_name() -> &'static str {
        "packing_template"
    }
    fn element_name() -> &'static str {
        "Шаблон упаковки"
    }
    fn list_name() -> &'static str {
        "Шаблоны упаковки"
    }
    fn origin() -> Origin {
        Origin::Self_
    }
}

// =============================================================================
// DTO
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackingTemplateDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub label: Option<String>,
    #[serde(rename = "baseLengthCm")]
    pub base_length_cm: f64,
    #[serde(rename = "baseWidthCm")]
    pub base_width_cm: f64,
    #[serde(rename = "baseHeightCm")]
    pub base_height_cm: f64,
    #[serde(rename = "extraCm", default)]
    pub extra_cm: f64,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(l: f64, w: f64, h: f64, extra: f64) -> PackingTemplate {
        PackingTemplate::new_for_insert(
            "PT-TEST".into(),
            "Тестовый шаблон".into(),
            None,
            l,
            w,
            h,
            extra,
            false,
            None,
        )
    }

    #[test]
    fn test_outer_dimensions_add_extra_per_axis() {
        let t = template(30.0, 20.0, 10.0, 2.0);
        let outer = t.outer_dimensions();
        assert_eq!(outer.length_cm, 32.0);
        assert_eq!(outer.width_cm, 22.0);
        assert_eq!(outer.height_cm, 12.0);
    }

    #[test]
    fn test_zero_template_is_no_box() {
        assert!(template(0.0, 0.0, 0.0, 0.0).is_no_box());
        assert!(!template(0.0, 0.0, 0.0, 1.0).is_no_box());
        assert!(!template(30.0, 20.0, 10.0, 0.0).is_no_box());
    }

    #[test]
    fn test_validate_rejects_negative_dimensions() {
        assert!(template(-1.0, 20.0, 10.0, 0.0).validate().is_err());
        assert!(template(30.0, 20.0, 10.0, -2.0).validate().is_err());
        assert!(template(30.0, 20.0, 10.0, 2.0).validate().is_ok());
    }
}
