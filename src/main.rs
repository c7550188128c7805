// ==========================================
// 商品目录导入 - 命令行入口
// ==========================================
// 用法:
//   catalog-import [db-path] import-csv <file>
//   catalog-import [db-path] import-xlsx <file>
//   catalog-import [db-path] report <id>
// 省略 db-path 时使用 CATALOG_IMPORT_DB_PATH 或用户数据目录
// ==========================================

use catalog_import::api::{ApiError, DefaultImportApi, ImportApi};
use catalog_import::logging;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

/// 默认数据库路径
fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("CATALOG_IMPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./catalog_import.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join(catalog_import::APP_NAME);
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("catalog_import.db");
        }
    }
    path.to_string_lossy().into_owned()
}

fn usage() -> String {
    format!(
        "用法: {} [db-path] <import-csv <file> | import-xlsx <file> | report <id>>",
        catalog_import::APP_NAME
    )
}

async fn run(db_path: &str, command: &str, arg: &str) -> Result<String, ApiError> {
    let api: DefaultImportApi = ImportApi::open(db_path).await?;

    match command {
        "import-csv" | "import-xlsx" => {
            let file = File::open(arg).map_err(|e| ApiError::InvalidFile(format!("{}: {}", arg, e)))?;
            let summary = if command == "import-csv" {
                api.upload_csv(file).await?
            } else {
                api.upload_xlsx(file).await?
            };
            serde_json::to_string_pretty(&summary)
                .map_err(|e| ApiError::InternalError(e.to_string()))
        }
        "report" => Ok(api.download_report(arg).await?.body),
        other => Err(ApiError::InternalError(format!("未知命令: {}\n{}", other, usage()))),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (db_path, command, arg) = match args.as_slice() {
        [db, command, arg] => (db.clone(), command.as_str(), arg.as_str()),
        [command, arg] => (get_default_db_path(), command.as_str(), arg.as_str()),
        _ => {
            eprintln!("{}", usage());
            return ExitCode::from(2);
        }
    };

    tracing::info!(version = catalog_import::VERSION, db_path = %db_path, command, "启动");

    match run(&db_path, command, arg).await {
        Ok(output) => {
            println!("{}", output.trim_end_matches('\n'));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            if e.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
