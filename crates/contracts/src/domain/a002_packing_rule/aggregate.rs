use crate::domain::common::{
    AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, EventStore, Origin,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для правила упаковки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackingRuleId(pub Uuid);

impl PackingRuleId {
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

impl AggregateId for PackingRuleId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(PackingRuleId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Правило упаковки для пары (бренд, тип товара) — агрегат
///
/// Инвариант: не более одного правила на пару (brand_id, product_type_id),
/// обеспечивается уникальным индексом в БД. Повторное создание — ошибка,
/// а не перезапись.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingRule {
    #[serde(flatten)]
    pub base: BaseAggregate<PackingRuleId>,

    /// Ссылка на бренд
    #[serde(rename = "brandId")]
    pub brand_id: String,

    /// Ссылка на тип товара
    #[serde(rename = "productTypeId")]
    pub product_type_id: String,

    /// Ссылка на шаблон упаковки (a001_packing_template.id);
    /// null — шаблон не назначен, габариты берутся у самого товара
    #[serde(rename = "packingTemplateId")]
    pub packing_template_id: Option<String>,

    /// Хрупкий товар
    #[serde(rename = "isFragile")]
    pub is_fragile: bool,

    /// Товар отправляется в собственной упаковке, подбор коробки пропускается
    #[serde(rename = "shipsInOwnBox")]
    pub ships_in_own_box: bool,

    /// Оператору разрешено подставить коробку большего размера при отгрузке
    #[serde(rename = "canOverride")]
    pub can_override: bool,
}

impl PackingRule {
    #[allow(clippy::too_many_arguments)]
    pub fn new_for_insert(
        code: String,
        description: String,
        brand_id: String,
        product_type_id: String,
        packing_template_id: Option<String>,
        is_fragile: bool,
        ships_in_own_box: bool,
        can_override: bool,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(PackingRuleId::new_v4(), code, description);
        base.comment = comment;
        Self {
            base,
            brand_id,
            product_type_id,
            packing_template_id,
            is_fragile,
            ships_in_own_box,
            can_override,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Ключ уникальности правила
    pub fn rule_key(&self) -> (&str, &str) {
        (&self.brand_id, &self.product_type_id)
    }

    pub fn touch_updated(&mut self) {
        self.base.touch();
    }

    pub fn update(&mut self, dto: &PackingRuleDto) {
        self.base.code = dto.code.clone().unwrap_or_default();
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.brand_id = dto.brand_id.clone();
        self.product_type_id = dto.product_type_id.clone();
        self.packing_template_id = dto.packing_template_id.clone();
        self.is_fragile = dto.is_fragile;
        self.ships_in_own_box = dto.ships_in_own_box;
        self.can_override = dto.can_override;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Описание не может быть пустым".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("Код не может быть пустым".into());
        }
        if self.brand_id.trim().is_empty() {
            return Err("Бренд обязателен".into());
        }
        if self.product_type_id.trim().is_empty() {
            return Err("Тип товара обязателен".into());
        }
        if let Some(ref template_id) = self.packing_template_id {
            if Uuid::parse_str(template_id).is_err() {
                return Err("Некорректный ID шаблона упаковки".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.touch_updated();
    }
}

impl AggregateRoot for PackingRule {
    type Id = PackingRuleId;
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
        "a002"
    }
    fn collection_name() -> &'static str {
        "packing_rule"
    }
    fn element_name() -> &'static str {
        "Правило упаковки"
    }
    fn list_name() -> &'static str {
        "Правила упаковки"
    }
    fn origin() -> Origin {
        Origin::Self_
    }
}

// =============================================================================
// DTO
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackingRuleDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    #[serde(rename = "brandId")]
    pub brand_id: String,
    #[serde(rename = "productTypeId")]
    pub product_type_id: String,
    #[serde(rename = "packingTemplateId")]
    pub packing_template_id: Option<String>,
    #[serde(rename = "isFragile", default)]
    pub is_fragile: bool,
    #[serde(rename = "shipsInOwnBox", default)]
    pub ships_in_own_box: bool,
    #[serde(rename = "canOverride", default)]
    pub can_override: bool,
    pub comment: Option<String>,
}
