// src/utils/error_logger.rs
use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::{error, warn};
use serde::Serialize;

// Maximum number of errors to keep in history
pub const MAX_ERROR_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggedError {
    pub severity: ErrorSeverity,
    pub module: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

// Thread-safe, bounded history of non-fatal problems
#[derive(Debug)]
pub struct ErrorLogger {
    capacity: usize,
    history: Mutex<VecDeque<LoggedError>>,
}

impl Default for ErrorLogger {
    fn default() -> Self {
        Self::new(MAX_ERROR_HISTORY)
    }
}

impl ErrorLogger {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn log_error(&self, severity: ErrorSeverity, module: &str, message: &str) {
        match severity {
            ErrorSeverity::Warning => warn!("[{}] {}", module, message),
            ErrorSeverity::Error => error!("[{}] {}", module, message),
        }

        if let Ok(mut log) = self.history.lock() {
            log.push_back(LoggedError {
                severity,
                module: module.to_string(),
                message: message.to_string(),
                at: Utc::now(),
            });

            // Remove oldest if exceeding capacity
            while log.len() > self.capacity {
                log.pop_front();
            }
        }
    }

    pub fn get_error_history(&self) -> Vec<LoggedError> {
        if let Ok(log) = self.history.lock() {
            return log.iter().cloned().collect();
        }
        Vec::new()
    }

    pub fn len(&self) -> usize {
        self.history.lock().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
