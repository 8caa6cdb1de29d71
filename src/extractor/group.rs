use std::fmt;
use std::sync::Arc;

use crate::extractor::ExtractorFactory;
use crate::mime::ContentType;

/// Ordered, immutable list of extractor factories.
#[derive(Clone, Default)]
pub struct ExtractorGroup {
    factories: Vec<Arc<dyn ExtractorFactory>>,
}

impl ExtractorGroup {
    pub fn new(factories: Vec<Arc<dyn ExtractorFactory>>) -> Self {
        Self { factories }
    }

    pub fn single(factory: Arc<dyn ExtractorFactory>) -> Self {
        Self {
            factories: vec![factory],
        }
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ExtractorFactory>> {
        self.factories.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    /// True when no member restricts content types. Vacuously true when empty.
    pub fn all_support_all_content_types(&self) -> bool {
        self.factories
            .iter()
            .all(|factory| factory.supports_all_content_types())
    }

    /// Members that accept `content_type`, in their original order.
    pub fn filter_by_content_type(&self, content_type: &ContentType) -> Self {
        self.factories
            .iter()
            .filter(|factory| factory.supports(content_type))
            .cloned()
            .collect()
    }
}

impl FromIterator<Arc<dyn ExtractorFactory>> for ExtractorGroup {
    fn from_iter<I: IntoIterator<Item = Arc<dyn ExtractorFactory>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Debug for ExtractorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
