use serde::{Deserialize, Serialize};

/// Статус заявки на возврат/замену
///
/// Переходы: pending -> approved, pending -> rejected. Оба конечные,
/// обратного пути в pending нет.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// На рассмотрении
    Pending,
    /// Одобрена администратором
    Approved,
    /// Отклонена администратором
    Rejected,
}

impl RequestStatus {
    /// Получить код статуса
    pub fn code(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "На рассмотрении",
            RequestStatus::Approved => "Одобрена",
            RequestStatus::Rejected => "Отклонена",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }

    /// Конечный статус (из него нет переходов)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Допустим ли переход в указанный статус
    pub fn can_transition_to(&self, target: RequestStatus) -> bool {
        matches!(
            (self, target),
            (
                RequestStatus::Pending,
                RequestStatus::Approved | RequestStatus::Rejected
            )
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
        ] {
            assert_eq!(RequestStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(RequestStatus::from_code("cancelled"), None);
    }

    #[test]
    fn test_transitions() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Rejected.can_transition_to(RequestStatus::Approved));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Pending));
        assert!(RequestStatus::Approved.is_terminal());
        assert!(!RequestStatus::Pending.is_terminal());
    }
}
