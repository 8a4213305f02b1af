use super::registry::Registry;
use super::types::GpuInfoList;
use crate::error::Result;

/// Outcome of polling one adapter
#[derive(Debug)]
pub struct VendorReport {
    pub vendor: &'static str,
    pub available: bool,
    /// `None` when the adapter was unavailable and not loaded
    pub result: Option<Result<GpuInfoList>>,
}

impl VendorReport {
    pub fn snapshot(&self) -> Option<&GpuInfoList> {
        self.result.as_ref().and_then(|r| r.as_ref().ok())
    }

    pub fn device_count(&self) -> usize {
        self.snapshot().map(GpuInfoList::len).unwrap_or(0)
    }
}

/// Probe every registered adapter and load the available ones
///
/// A failing adapter is reported in its own entry and does not stop the
/// others.
pub fn collect_all(registry: &Registry) -> Vec<VendorReport> {
    registry
        .all()
        .iter()
        .map(|loader| {
            let vendor = loader.vendor();
            let available = loader.available();
            if !available {
                log::debug!("{} loader not available, skipping", vendor);
                return VendorReport {
                    vendor,
                    available,
                    result: None,
                };
            }

            let result = loader.load();
            match &result {
                Ok(list) => log::info!("{} reported {} device(s)", vendor, list.len()),
                Err(e) => log::warn!("{} load failed: {}", vendor, e),
            }
            VendorReport {
                vendor,
                available,
                result: Some(result),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::telemetry::{GpuInfo, GpuInfoLoader};
    use crate::error::GpuError;

    struct Canned {
        vendor: &'static str,
        available: bool,
        fail: bool,
    }

    impl GpuInfoLoader for Canned {
        fn load(&self) -> Result<GpuInfoList> {
            if self.fail {
                Err(GpuError::execution("tool", "exit status: 1"))
            } else {
                Ok(GpuInfoList::new(vec![GpuInfo::with_index(0)]))
            }
        }

        fn available(&self) -> bool {
            self.available
        }

        fn vendor(&self) -> &'static str {
            self.vendor
        }
    }

    #[test]
    fn test_failures_are_independent() {
        let mut registry = Registry::new();
        registry.register(Box::new(Canned {
            vendor: "Broken",
            available: true,
            fail: true,
        }));
        registry.register(Box::new(Canned {
            vendor: "Absent",
            available: false,
            fail: false,
        }));
        registry.register(Box::new(Canned {
            vendor: "Healthy",
            available: true,
            fail: false,
        }));

        let reports = collect_all(&registry);
        assert_eq!(reports.len(), 3);

        assert!(matches!(reports[0].result, Some(Err(_))));
        assert!(reports[1].result.is_none());
        assert!(!reports[1].available);
        assert_eq!(reports[2].device_count(), 1);
    }
}
