/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_HOST | 0.0.0.0 | Bind address |
/// | HTTP_PORT | 3000 | HTTP port |
/// | TEST_PRINTER_NAME | POS-80 | Queue used by `GET /test` without `?printer=` |
/// | PRINT_TIMEOUT_MS | 0 | Deadline for one printer call, 0 = wait forever |
/// | LOG_LEVEL | info | trace / debug / info / warn / error |
/// | LOG_DIR | (unset) | Write daily rolling log files here instead of stdout |
///
/// # Example
///
/// ```ignore
/// HTTP_PORT=8080 TEST_PRINTER_NAME=EPSON_TM_T82 cargo run -p pos-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    pub test_printer_name: String,
    /// Applied around each blocking printer call, not inside the printer backend
    pub print_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to defaults
    pub fn from_env() -> Self {
        Self {
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            test_printer_name: std::env::var("TEST_PRINTER_NAME")
                .ok()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "POS-80".into()),
            print_timeout_ms: std::env::var("PRINT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn print_timeout(&self) -> Option<std::time::Duration> {
        (self.print_timeout_ms > 0).then(|| std::time::Duration::from_millis(self.print_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(timeout_ms: u64) -> Config {
        Config {
            http_host: "127.0.0.1".into(),
            http_port: 3000,
            test_printer_name: "POS-80".into(),
            print_timeout_ms: timeout_ms,
            log_level: "info".into(),
            log_dir: None,
        }
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(config(0).bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_zero_timeout_means_none() {
        assert_eq!(config(0).print_timeout(), None);
        assert_eq!(
            config(1500).print_timeout(),
            Some(std::time::Duration::from_millis(1500))
        );
    }
}
