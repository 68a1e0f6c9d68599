use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Инициализация подключения к БД и минимальный бутстрап схемы
///
/// `db_path` = None — путь берётся из config.toml.
pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_url = match db_path {
        Some(path) => build_sqlite_url(path)?,
        None => {
            let config = crate::shared::config::load_config()?;
            let path = crate::shared::config::get_database_path(&config)?;
            build_sqlite_url(&path.to_string_lossy())?
        }
    };

    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Database already initialized"))?;

    tracing::info!("Database initialized: {}", db_url);
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN.get().expect("Database is not initialized")
}

fn build_sqlite_url(db_file: &str) -> anyhow::Result<String> {
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    Ok(format!("sqlite://{}{}?mode=rwc", prefix, normalized))
}

/// Идемпотентное создание таблиц ядра
async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let statements = [
        // Шаблоны упаковки
        r#"
        CREATE TABLE IF NOT EXISTS a001_packing_template (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            label TEXT,
            base_length_cm REAL NOT NULL DEFAULT 0,
            base_width_cm REAL NOT NULL DEFAULT 0,
            base_height_cm REAL NOT NULL DEFAULT 0,
            extra_cm REAL NOT NULL DEFAULT 0,
            is_default INTEGER NOT NULL DEFAULT 0,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
        // Правила упаковки; уникальность пары (бренд, тип товара) —
        // частичный индекс, мягко удалённые правила пару не занимают
        r#"
        CREATE TABLE IF NOT EXISTS a002_packing_rule (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            brand_id TEXT NOT NULL,
            product_type_id TEXT NOT NULL,
            packing_template_id TEXT,
            is_fragile INTEGER NOT NULL DEFAULT 0,
            ships_in_own_box INTEGER NOT NULL DEFAULT 0,
            can_override INTEGER NOT NULL DEFAULT 0,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS ux_a002_packing_rule_key
        ON a002_packing_rule (brand_id, product_type_id)
        WHERE is_deleted = 0;
        "#,
        // Заявки на возврат/замену
        r#"
        CREATE TABLE IF NOT EXISTS a003_return_request (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            comment TEXT,
            order_id TEXT NOT NULL,
            order_item_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            brand_id TEXT NOT NULL,
            product_type_id TEXT NOT NULL,
            item_name TEXT NOT NULL DEFAULT '',
            declared_dimensions_json TEXT,
            weight_grams INTEGER NOT NULL DEFAULT 0,
            request_type TEXT NOT NULL,
            new_variant_id TEXT,
            reason TEXT,
            images_json TEXT NOT NULL DEFAULT '[]',
            customer_name TEXT NOT NULL DEFAULT '',
            customer_phone TEXT NOT NULL DEFAULT '',
            customer_address TEXT NOT NULL DEFAULT '',
            customer_pincode TEXT NOT NULL DEFAULT '',
            original_waybill TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            waybill_number TEXT,
            shipment_kind TEXT,
            fulfilled_at TEXT,
            carrier_response_json TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS ix_a003_return_request_status
        ON a003_return_request (status, is_deleted);
        "#,
    ];

    for sql in statements {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await?;
    }

    Ok(())
}
