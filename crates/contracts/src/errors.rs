use thiserror::Error;

/// Ошибки ядра обработки заявок и упаковки
///
/// Четыре класса с разной политикой обработки: валидация и конфликт
/// состояния отклоняются синхронно без побочных эффектов, нарушение
/// целостности данных не ретраится, ошибка перевозчика оставляет заявку
/// в состоянии "одобрена без отправления".
#[derive(Debug, Error)]
pub enum CoreError {
    /// Некорректная форма входных данных, запись не создаётся
    #[error("Validation error: {0}")]
    Validation(String),

    /// Операция несовместима с текущим состоянием записи
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// Ссылка на отсутствующие данные (например, удалённый шаблон упаковки)
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Ошибка службы доставки; решение администратора уже сохранено
    #[error("Carrier error: {0}")]
    Carrier(String),

    /// Прочие ошибки инфраструктуры (БД и т.п.)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CoreError {
    /// Машиночитаемый класс ошибки для API-ответов
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::StateConflict(_) => "state_conflict",
            CoreError::DataIntegrity(_) => "data_integrity",
            CoreError::Carrier(_) => "carrier",
            CoreError::Internal(_) => "internal",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn state_conflict(msg: impl Into<String>) -> Self {
        CoreError::StateConflict(msg.into())
    }

    pub fn data_integrity(msg: impl Into<String>) -> Self {
        CoreError::DataIntegrity(msg.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
