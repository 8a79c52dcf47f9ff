use crate::utils::error::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化 CLI 日誌：終端機輸出，若有設定 log 檔則同時附加寫入檔案
pub fn init_cli_logger(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("lunch_order=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lunch_order=info"))
    };

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .with(file_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_unopenable_log_file_fails_before_installing() {
        // 父目錄其實是個檔案，log 檔開不起來
        let mut blocker = NamedTempFile::new().unwrap();
        blocker.write_all(b"not a directory").unwrap();
        let log_file = blocker.path().join("orders.log");

        let err = init_cli_logger(false, Some(&log_file)).unwrap_err();
        assert!(matches!(err, crate::utils::error::OrderError::Io(_)));

        // 全域 subscriber 還沒被設定，仍可改用終端機輸出
        assert!(init_cli_logger(false, None).is_ok());
    }
}
