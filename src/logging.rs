use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// グローバルなtracing subscriberを設定する
///
/// `RUST_LOG` があればそれを優先し、なければ `default_filter`（例: `"talava_jump=info"`）を使う。
/// アプリケーション起動時に一度だけ呼ぶ。二度目以降はエラーを返す。
pub fn init_tracing(default_filter: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
}

/// テスト用（警告以上のみ）
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        let _ = init_tracing("talava_jump=debug");
        assert!(init_tracing("talava_jump=debug").is_err());
    }
}
