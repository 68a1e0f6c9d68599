use serde::{Deserialize, Serialize};

/// Габариты коробки в сантиметрах
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoxDimensions {
    #[serde(rename = "lengthCm")]
    pub length_cm: f64,
    #[serde(rename = "widthCm")]
    pub width_cm: f64,
    #[serde(rename = "heightCm")]
    pub height_cm: f64,
}

impl BoxDimensions {
    pub fn new(length_cm: f64, width_cm: f64, height_cm: f64) -> Self {
        Self {
            length_cm,
            width_cm,
            height_cm,
        }
    }

    /// Нулевые габариты — признак "без физической коробки"
    pub fn is_zero(&self) -> bool {
        self.length_cm == 0.0 && self.width_cm == 0.0 && self.height_cm == 0.0
    }

    /// Покомпонентный максимум двух коробок
    pub fn max_per_axis(&self, other: &BoxDimensions) -> BoxDimensions {
        BoxDimensions {
            length_cm: self.length_cm.max(other.length_cm),
            width_cm: self.width_cm.max(other.width_cm),
            height_cm: self.height_cm.max(other.height_cm),
        }
    }
}

/// Результат подбора упаковки для пары (бренд, тип товара)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingResult {
    /// Итоговые габариты коробки (нулевые, если товар едет в своей упаковке)
    pub dimensions: BoxDimensions,

    /// Хрупкий товар
    #[serde(rename = "isFragile")]
    pub is_fragile: bool,

    /// Товар отправляется в собственной упаковке, коробка не подбирается
    #[serde(rename = "shipsInOwnBox")]
    pub ships_in_own_box: bool,

    /// ID шаблона, из которого взяты габариты (null — габариты товара)
    #[serde(rename = "sourceTemplateId")]
    pub source_template_id: Option<String>,

    /// Переданные габариты проигнорированы: правило запрещает переопределение
    #[serde(rename = "ignoredOverride")]
    pub ignored_override: bool,
}

impl PackagingResult {
    /// Результат "без коробки" — упаковка товара авторитетна
    pub fn own_box(declared: Option<BoxDimensions>, is_fragile: bool) -> Self {
        Self {
            dimensions: declared.unwrap_or_default(),
            is_fragile,
            ships_in_own_box: true,
            source_template_id: None,
            ignored_override: false,
        }
    }
}

/// Параметры запроса подбора упаковки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingQuery {
    #[serde(rename = "brandId")]
    pub brand_id: String,
    #[serde(rename = "productTypeId")]
    pub product_type_id: String,
    /// Габариты товара, заявленные на момент отгрузки (опционально)
    pub declared: Option<BoxDimensions>,
}
