use std::time::Duration;

/// Timeouts and buffer sizes of one connection.
///
/// A zero timeout disables that deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    first_request_timeout: Duration,
    request_timeout: Duration,
    keepalive_timeout: Duration,
    read_buffer_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            first_request_timeout: Duration::from_millis(200),
            request_timeout: Duration::from_secs(5),
            keepalive_timeout: Duration::from_secs(3),
            read_buffer_capacity: 8 * 1024,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deadline for the first bytes of a freshly accepted connection.
    pub fn with_first_request_timeout(mut self, timeout: Duration) -> Self {
        self.first_request_timeout = timeout;
        self
    }

    /// Deadline for a request, from its first bytes until its response is written.
    ///
    /// It is lifted while a body streams in without `Expect: 100-continue`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// How long a kept alive connection may stay idle between two requests.
    pub fn with_keepalive_timeout(mut self, timeout: Duration) -> Self {
        self.keepalive_timeout = timeout;
        self
    }

    pub fn with_read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.read_buffer_capacity = capacity;
        self
    }

    pub fn first_request_timeout(&self) -> Duration {
        self.first_request_timeout
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn keepalive_timeout(&self) -> Duration {
        self.keepalive_timeout
    }

    pub fn read_buffer_capacity(&self) -> usize {
        self.read_buffer_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let config = ConnectionConfig::default();
        assert_eq!(config.first_request_timeout(), Duration::from_millis(200));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.keepalive_timeout(), Duration::from_secs(3));
        assert_eq!(config.read_buffer_capacity(), 8 * 1024);

        let config = config.with_keepalive_timeout(Duration::ZERO).with_read_buffer_capacity(512);
        assert_eq!(config.keepalive_timeout(), Duration::ZERO);
        assert_eq!(config.read_buffer_capacity(), 512);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
