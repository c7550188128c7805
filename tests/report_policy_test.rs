// ==========================================
// 差异报告写入策略 / 上传限流测试
// ==========================================
// 测试目标:
// - 报告目录不可写时默认仍返回汇总（无报告标识）
// - fail_on_report_error=true 时导入失败
// - 限流配置生效，实例之间互不影响
// ==========================================

mod test_helpers;

use catalog_import::api::ApiError;
use catalog_import::config::config_keys;
use catalog_import::repository::{CatalogRepository, CatalogRepositoryImpl};
use tempfile::NamedTempFile;
use test_helpers::{csv_upload, TestEnv};

const MIXED_CSV: &[&str] = &[
    "Name,Price,Description,Stock",
    "Good,1.00,ok,1",
    "Bad,nope,x,1",
];

/// 把报告目录指向一个普通文件，使目录创建失败
fn break_report_dir(env: &TestEnv) -> NamedTempFile {
    let blocker = NamedTempFile::new().expect("Failed to create temp file");
    env.set_config(config_keys::REPORT_DIR, blocker.path().to_str().unwrap())
        .expect("Failed to set config");
    blocker
}

#[tokio::test]
async fn test_report_write_failure_is_swallowed_by_default() {
    let env = TestEnv::new().expect("Failed to create test env");
    let _blocker = break_report_dir(&env);
    let api = env.api().await;

    let summary = api.upload_csv(csv_upload(MIXED_CSV)).await.expect("Import failed");

    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.error_count, 1);
    assert!(summary.error_report_id.is_none());

    // 已接受的行仍然落库
    let repo = CatalogRepositoryImpl::new(&env.db_path).unwrap();
    assert_eq!(repo.count_products().await.unwrap(), 1);
}

#[tokio::test]
async fn test_report_write_failure_fails_import_when_configured() {
    let env = TestEnv::new().expect("Failed to create test env");
    let _blocker = break_report_dir(&env);
    env.set_config(config_keys::FAIL_ON_REPORT_ERROR, "true").unwrap();
    let api = env.api().await;

    let err = api.upload_csv(csv_upload(MIXED_CSV)).await.unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)), "err: {:?}", err);
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_clean_import_never_touches_report_dir() {
    let env = TestEnv::new().expect("Failed to create test env");
    let _blocker = break_report_dir(&env);
    env.set_config(config_keys::FAIL_ON_REPORT_ERROR, "true").unwrap();
    let api = env.api().await;

    let summary = api
        .upload_csv(csv_upload(&["Name,Price,Description,Stock", "Clean,1,x,1"]))
        .await
        .unwrap();
    assert_eq!(summary.success_count, 1);
}

#[tokio::test]
async fn test_custom_delimiter_from_config() {
    let env = TestEnv::new().expect("Failed to create test env");
    env.set_config(config_keys::CSV_DELIMITER, ";").unwrap();
    let api = env.api().await;

    let summary = api
        .upload_csv(csv_upload(&[
            "Name;Price;Description;Stock",
            "Comma, Inc;2.50;a, b;1",
            "Bad;x;y;1",
        ]))
        .await
        .unwrap();
    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.error_count, 1);

    let body = api
        .download_report(summary.error_report_id.as_deref().unwrap())
        .await
        .unwrap()
        .body;
    assert_eq!(
        body.lines().collect::<Vec<_>>(),
        vec!["Type;Message", "ERROR;Row 3: Bad,x,y,1 | Error: price parse error"]
    );

    let repo = CatalogRepositoryImpl::new(&env.db_path).unwrap();
    let product = repo.find_product_by_name("Comma, Inc").await.unwrap().unwrap();
    assert_eq!(product.description, "a, b");
}

#[tokio::test]
async fn test_upload_rate_limit_per_instance() {
    let env = TestEnv::new().expect("Failed to create test env");
    env.set_config(config_keys::UPLOAD_RATE_LIMIT, "2").unwrap();
    env.set_config(config_keys::UPLOAD_RATE_WINDOW_SECS, "3600").unwrap();

    let api = env.api().await;
    let other = env.api().await;
    let file = csv_upload(&["Name,Price,Description,Stock"]);

    assert!(api.upload_csv(file.clone()).await.is_ok());
    assert!(api.upload_xlsx(file.clone()).await.is_err()); // 无效文件也计数
    let err = api.upload_csv(file.clone()).await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited { limit: 2, window_secs: 3600 }));

    // 另一个实例有独立计数
    assert!(other.upload_csv(file.clone()).await.is_ok());

    // 下载报告不受限流影响
    let err = api
        .download_report("00000000-0000-4000-8000-000000000000")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    api.rate_tracker().reset();
    assert!(api.upload_csv(file).await.is_ok());
}
