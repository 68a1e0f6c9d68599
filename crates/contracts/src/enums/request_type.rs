use serde::{Deserialize, Serialize};

/// Тип заявки покупателя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Возврат товара продавцу
    Return,
    /// Замена товара на другой вариант
    Replace,
}

impl RequestType {
    /// Получить код типа заявки
    pub fn code(&self) -> &'static str {
        match self {
            RequestType::Return => "return",
            RequestType::Replace => "replace",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            RequestType::Return => "Возврат",
            RequestType::Replace => "Замена",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "return" => Some(RequestType::Return),
            "replace" => Some(RequestType::Replace),
            _ => None,
        }
    }

    /// Получить все типы заявок
    pub fn all() -> Vec<RequestType> {
        vec![RequestType::Return, RequestType::Replace]
    }
}

impl Default for RequestType {
    fn default() -> Self {
        RequestType::Return
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
