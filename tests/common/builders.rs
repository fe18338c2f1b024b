//! Test data builders for creating test objects

use serial_plotter::AppConfig;

/// Builder for creating test configurations
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn port(mut self, port: &str) -> Self {
        self.config.serial.port = port.to_string();
        self
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.config.serial.baud_rate = baud_rate;
        self
    }

    pub fn separator(mut self, separator: &str) -> Self {
        self.config.serial.line_separator = separator.to_string();
        self
    }

    pub fn mirror(mut self, mirror: bool) -> Self {
        self.config.serial.mirror = mirror;
        self
    }

    pub fn name_filter(mut self, filter: &str) -> Self {
        self.config.data.name_filter = filter.to_string();
        self
    }

    pub fn graph_filter(mut self, filter: &str) -> Self {
        self.config.data.graph_filter = filter.to_string();
        self
    }

    pub fn follow_window(mut self, window: usize) -> Self {
        self.config.data.follow_window = window;
        self
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
