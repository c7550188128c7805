// ==========================================
// 商品目录导入 - 上传限流
// ==========================================
// 职责: 固定窗口上传计数（由 ImportApi 实例持有，非进程级单例）
// 规则:
// - limit = 0 表示不限流
// - 窗口到期后计数清零，从首次请求重新计时
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug)]
struct WindowState {
    started_at: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct UploadRateTracker {
    limit: u32,
    window: Duration,
    state: Mutex<Option<WindowState>>,
}

impl UploadRateTracker {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(None),
        }
    }

    /// 不限流
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// 登记一次上传
    ///
    /// # 返回
    /// - Ok(()): 当前窗口仍有额度
    /// - Err(RateLimited): 当前窗口额度已用尽（本次不计数）
    pub fn try_acquire(&self) -> ApiResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut state = self
            .state
            .lock()
            .map_err(|e| ApiError::InternalError(format!("限流状态锁获取失败: {}", e)))?;

        let now = Instant::now();
        // 窗口到期
        if matches!(state.as_ref(), Some(w) if now.duration_since(w.started_at) >= self.window) {
            *state = None;
        }
        let window = state.get_or_insert_with(|| WindowState {
            started_at: now,
            count: 0,
        });

        if window.count >= self.limit {
            warn!(limit = self.limit, window_secs = self.window.as_secs(), "上传被限流");
            return Err(ApiError::RateLimited {
                limit: self.limit,
                window_secs: self.window.as_secs(),
            });
        }

        window.count += 1;
        Ok(())
    }

    /// 当前窗口已登记次数
    pub fn current_count(&self) -> u32 {
        match self.state.lock() {
            Ok(state) => state
                .as_ref()
                .filter(|w| w.started_at.elapsed() < self.window)
                .map(|w| w.count)
                .unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// 清空计数
    pub fn reset(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = None;
        }
    }
}
