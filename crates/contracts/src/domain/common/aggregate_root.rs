use super::{EntityMetadata, EventStore, Origin};

/// Трейт для корня агрегата
///
/// Определяет обязательные методы и метаданные для всех агрегатов системы
pub trait AggregateRoot {
    /// Тип идентификатора агрегата
    type Id;

    // ============================================================================
    // Методы экземпляра (данные конкретной записи)
    // ============================================================================

    /// Получить ID записи
    fn id(&self) -> Self::Id;

    /// Получить бизнес-код записи (например, "RR-2025-001")
    fn code(&self) -> &str;

    /// Получить описание/название записи
    fn description(&self) -> &str;

    /// Получить метаданные жизненного цикла
    fn metadata(&self) -> &EntityMetadata;

    /// Получить изменяемые метаданные
    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    /// Получить хранилище событий
    fn events(&self) -> &EventStore;

    /// Получить изменяемое хранилище событий
    fn events_mut(&mut self) -> &mut EventStore;

    // ============================================================================
    // Метаданные класса агрегата (статические данные)
    // ============================================================================

    /// Индекс агрегата в системе (например, "a001")
    fn aggregate_index() -> &'static str;

    /// Имя коллекции для БД (например, "packing_template")
    fn collection_name() -> &'static str;

    /// Имя элемента для UI (единственное число, например, "Шаблон упаковки")
    fn element_name() -> &'static str;

    /// Имя списка для UI (множественное число, например, "Шаблоны упаковки")
    fn list_name() -> &'static str;

    /// Источник данных агрегата
    fn origin() -> Origin;

    // ============================================================================
    // Методы с реализацией по умолчанию
    // ============================================================================

    /// Полное имя агрегата для системы (например, "a001_packing_template")
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }

    /// Префикс для таблиц БД (например, "a001_packing_template_")
    fn table_prefix() -> String {
        format!("{}_", Self::full_name())
    }
}
