use serde::{Deserialize, Serialize};

/// Вид отправления, созданного при одобрении заявки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentKind {
    /// Обратная доставка возврата продавцу (Return-to-Origin)
    Rto,
    /// Прямая отправка замены покупателю
    ReplacementOutbound,
}

impl ShipmentKind {
    /// Получить код вида отправления
    pub fn code(&self) -> &'static str {
        match self {
            ShipmentKind::Rto => "rto",
            ShipmentKind::ReplacementOutbound => "replacement_outbound",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            ShipmentKind::Rto => "Возврат продавцу (RTO)",
            ShipmentKind::ReplacementOutbound => "Отправка замены",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "rto" => Some(ShipmentKind::Rto),
            "replacement_outbound" => Some(ShipmentKind::ReplacementOutbound),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
