use serde::{Deserialize, Serialize};

use vmdeck_types::MetricsSample;

/// Gauges that carry warning thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gauge {
    Cpu,
    Memory,
    Disk,
    Temperature,
}

impl Gauge {
    pub const ALL: [Gauge; 4] = [Gauge::Cpu, Gauge::Memory, Gauge::Disk, Gauge::Temperature];

    /// (warn, danger) thresholds, inclusive
    pub fn thresholds(&self) -> (f64, f64) {
        match self {
            Gauge::Cpu => (70.0, 85.0),
            Gauge::Memory => (60.0, 75.0),
            Gauge::Disk => (50.0, 70.0),
            Gauge::Temperature => (55.0, 65.0),
        }
    }

    pub fn read(&self, sample: &MetricsSample) -> f64 {
        match self {
            Gauge::Cpu => sample.cpu,
            Gauge::Memory => sample.memory,
            Gauge::Disk => sample.disk,
            Gauge::Temperature => sample.temperature,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gauge::Cpu => "CPU Usage",
            Gauge::Memory => "Memory Usage",
            Gauge::Disk => "Disk Usage",
            Gauge::Temperature => "CPU Temperature",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Gauge::Temperature => "°C",
            _ => "%",
        }
    }

    pub fn health(&self, sample: &MetricsSample) -> Health {
        Health::classify(self.read(sample), self.thresholds())
    }
}

/// Severity grade of a gauge reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Normal,
    Warn,
    Danger,
}

impl Health {
    pub fn classify(value: f64, (warn, danger): (f64, f64)) -> Self {
        if value >= danger {
            Health::Danger
        } else if value >= warn {
            Health::Warn
        } else {
            Health::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(Health::classify(69.9, Gauge::Cpu.thresholds()), Health::Normal);
        assert_eq!(Health::classify(70.0, Gauge::Cpu.thresholds()), Health::Warn);
        assert_eq!(Health::classify(85.0, Gauge::Cpu.thresholds()), Health::Danger);
    }

    #[test]
    fn test_baseline_is_healthy() {
        let sample = MetricsSample::baseline();
        for gauge in Gauge::ALL {
            assert_eq!(gauge.health(&sample), Health::Normal, "{}", gauge.label());
        }
    }

    #[test]
    fn test_hot_temperature() {
        let sample = MetricsSample {
            temperature: 65.0,
            ..MetricsSample::baseline()
        };
        assert_eq!(Gauge::Temperature.health(&sample), Health::Danger);
        assert_eq!(Gauge::Temperature.unit(), "°C");
    }
}
