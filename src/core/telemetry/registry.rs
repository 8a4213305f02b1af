use super::loader::GpuInfoLoader;

/// Ordered, append-only list of telemetry adapters
///
/// Built once at start-up and then shared read-only. Registering requires
/// `&mut self`, so no adapter can be added while the registry is being read.
#[derive(Default)]
pub struct Registry {
    loaders: Vec<Box<dyn GpuInfoLoader>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an adapter; duplicates of a vendor are kept
    pub fn register(&mut self, loader: Box<dyn GpuInfoLoader>) {
        log::debug!("Registered GPU loader: {}", loader.vendor());
        self.loaders.push(loader);
    }

    /// Every adapter in registration order
    pub fn all(&self) -> &[Box<dyn GpuInfoLoader>] {
        &self.loaders
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    pub fn vendors(&self) -> Vec<&'static str> {
        self.loaders.iter().map(|l| l.vendor()).collect()
    }

    /// First adapter whose vendor matches, ignoring case
    pub fn find(&self, vendor: &str) -> Option<&dyn GpuInfoLoader> {
        self.loaders
            .iter()
            .find(|l| l.vendor().eq_ignore_ascii_case(vendor))
            .map(|l| l.as_ref())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("vendors", &self.vendors())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::telemetry::GpuInfoList;
    use crate::error::Result;

    struct Fixed(&'static str);

    impl GpuInfoLoader for Fixed {
        fn load(&self) -> Result<GpuInfoList> {
            Ok(GpuInfoList::empty())
        }

        fn available(&self) -> bool {
            true
        }

        fn vendor(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.register(Box::new(Fixed("AMD")));
        registry.register(Box::new(Fixed("CPU")));
        registry.register(Box::new(Fixed("NVIDIA")));

        assert_eq!(registry.vendors(), vec!["AMD", "CPU", "NVIDIA"]);
        assert_eq!(registry.all().len(), 3);
    }

    #[test]
    fn test_duplicates_are_allowed() {
        let mut registry = Registry::new();
        registry.register(Box::new(Fixed("CPU")));
        registry.register(Box::new(Fixed("CPU")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("cpu").map(|l| l.vendor()), Some("CPU"));
        assert!(registry.find("Enflame").is_none());
    }
}
